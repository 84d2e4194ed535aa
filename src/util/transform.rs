//! Scale/rotate/translate transforms.
//!
//! Rotations are XYZ euler angles: the matrix is `Rz * Ry * Rx`, so X is
//! applied first.

use cgmath::{Matrix, Matrix3, Matrix4, Rad, SquareMatrix, Vector3, InnerSpace, vec3};
use std::f64;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TRS {
    pub scale: Vector3<f64>,
    /// Euler angles in radians.
    pub rotation: Vector3<f64>,
    pub translation: Vector3<f64>,
}

impl TRS {
    /// Splits an affine matrix into scale, euler rotation, and translation.
    /// Shears are lost. A mirroring shows up as a negative X scale.
    pub fn from_matrix(m: &Matrix4<f64>) -> TRS {
        let translation = m.w.truncate();
        let mut cols = [m.x.truncate(), m.y.truncate(), m.z.truncate()];
        let mut scale = vec3(cols[0].magnitude(), cols[1].magnitude(), cols[2].magnitude());

        let basis = Matrix3::from_cols(cols[0], cols[1], cols[2]);
        if basis.determinant() < 0.0 {
            scale.x = -scale.x;
        }
        for i in 0..3 {
            if scale[i] != 0.0 {
                cols[i] = cols[i] / scale[i];
            }
        }
        let rot = Matrix3::from_cols(cols[0], cols[1], cols[2]);

        TRS { scale, rotation: euler_xyz(&rot), translation }
    }

    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        euler_to_matrix(self.rotation)
    }
}

impl<'a> From<&'a TRS> for Matrix4<f64> {
    fn from(trs: &'a TRS) -> Matrix4<f64> {
        let s = trs.scale;
        Matrix4::from_translation(trs.translation) *
            Matrix4::from(trs.rotation_matrix()) *
            Matrix4::from_nonuniform_scale(s.x, s.y, s.z)
    }
}

pub fn euler_to_matrix(r: Vector3<f64>) -> Matrix3<f64> {
    Matrix3::from_angle_z(Rad(r.z)) *
        Matrix3::from_angle_y(Rad(r.y)) *
        Matrix3::from_angle_x(Rad(r.x))
}

/// Euler angles of a pure rotation matrix.
pub fn euler_xyz(m: &Matrix3<f64>) -> Vector3<f64> {
    let cy = m.x.x.hypot(m.x.y);
    if cy > 16.0 * f64::EPSILON {
        vec3(
            m.y.z.atan2(m.z.z),
            (-m.x.z).atan2(cy),
            m.x.y.atan2(m.x.x),
        )
    } else {
        // Gimbal lock; put everything in X.
        vec3(
            (-m.z.y).atan2(m.y.y),
            (-m.x.z).atan2(cy),
            0.0,
        )
    }
}

/// Matrix for transforming normals by `m`.
pub fn normal_matrix(m: &Matrix4<f64>) -> Matrix3<f64> {
    let m3 = Matrix3::from_cols(m.x.truncate(), m.y.truncate(), m.z.truncate());
    match m3.invert() {
        Some(inv) => inv.transpose(),
        None => m3,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn euler_round_trip() {
        let r = vec3(0.3, -0.5, 1.2);
        let back = euler_xyz(&euler_to_matrix(r));
        assert!(close(back.x, r.x) && close(back.y, r.y) && close(back.z, r.z), "{:?}", back);
    }

    #[test]
    fn x_rotation_is_applied_first() {
        // Rotating +Y by 90deg about X gives +Z; then 90deg about Z leaves it.
        let m = euler_to_matrix(vec3(FRAC_PI_2, 0.0, FRAC_PI_2));
        let v = m * vec3(0.0, 1.0, 0.0);
        assert!(close(v.x, 0.0) && close(v.y, 0.0) && close(v.z, 1.0), "{:?}", v);
    }

    #[test]
    fn decompose_trs() {
        let trs = TRS {
            scale: vec3(2.0, 0.5, 3.0),
            rotation: vec3(0.1, 0.2, -0.7),
            translation: vec3(1.0, -2.0, 5.5),
        };
        let m = Matrix4::from(&trs);
        let back = TRS::from_matrix(&m);
        for i in 0..3 {
            assert!(close(back.scale[i], trs.scale[i]));
            assert!(close(back.rotation[i], trs.rotation[i]));
            assert!(close(back.translation[i], trs.translation[i]));
        }
    }

    #[test]
    fn mirrored_matrix_has_negative_x_scale() {
        let m = Matrix4::from_nonuniform_scale(-1.0, 1.0, 1.0);
        let trs = TRS::from_matrix(&m);
        assert!(close(trs.scale.x, -1.0));
        assert!(close(trs.rotation.x, 0.0) && close(trs.rotation.y, 0.0) && close(trs.rotation.z, 0.0));
    }
}
