//! Raw primitives.
//!
//! Every mesh face becomes a `Primitive` holding its corners already
//! converted to the fixed-point values that will be sent to the GPU. The
//! stripper merges these into strips; the command encoder turns them into
//! vertex commands.

pub mod strip;

use cgmath::{Point3, Vector3, InnerSpace};
use smallvec::SmallVec;
use util::fixed::{fx10, fx32};

/// One corner of a primitive. Two corners that compare equal can be shared
/// between neighboring primitives in a strip.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Vertex {
    /// fx32, arithmetic-right-shifted by the model's pos_scale.
    pub position: [i64; 3],
    /// fx10
    pub normal: [i64; 3],
    /// 5-bit RGB.
    pub color: [u8; 3],
    /// fx32 UV, origin at the bottom-left.
    pub texcoord: [i64; 2],
    /// Vertex group index, -1 for none.
    pub group: i32,
}

impl Vertex {
    pub fn new(
        position: Point3<f64>,
        pos_scale: u32,
        normal: Vector3<f64>,
        color: Option<[f64; 3]>,
        texcoord: Option<[f64; 2]>,
        group: i32,
    ) -> Vertex {
        let n = if normal.magnitude2() > 0.0 { normal.normalize() } else { normal };
        let color = match color {
            Some(c) => [color5(c[0]), color5(c[1]), color5(c[2])],
            None => [0, 0, 0],
        };
        let texcoord = match texcoord {
            Some(uv) => [fx32(uv[0]), fx32(uv[1])],
            None => [0, 0],
        };
        Vertex {
            position: [
                fx32(position.x) >> pos_scale,
                fx32(position.y) >> pos_scale,
                fx32(position.z) >> pos_scale,
            ],
            normal: [fx10(n.x), fx10(n.y), fx10(n.z)],
            color,
            texcoord,
            group,
        }
    }
}

fn color5(c: f64) -> u8 {
    let x = (c * 31.0).round();
    if x < 0.0 { 0 } else if x > 31.0 { 31 } else { x as u8 }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PrimType {
    Triangles,
    Quads,
    TriangleStrip,
    QuadStrip,
}

impl PrimType {
    pub fn name(self) -> &'static str {
        match self {
            PrimType::Triangles => "triangles",
            PrimType::Quads => "quads",
            PrimType::TriangleStrip => "triangle_strip",
            PrimType::QuadStrip => "quad_strip",
        }
    }

    /// Order of primitive types inside an mtx_prim.
    pub fn sort_key(self) -> u8 {
        match self {
            PrimType::QuadStrip => 0,
            PrimType::TriangleStrip => 1,
            PrimType::Quads => 2,
            PrimType::Triangles => 3,
        }
    }

    pub fn is_strip(self) -> bool {
        match self {
            PrimType::TriangleStrip | PrimType::QuadStrip => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub prim_type: PrimType,
    /// Scene material index.
    pub material: usize,
    pub vertices: SmallVec<[Vertex; 4]>,
}

impl Primitive {
    /// A triangle or quad from the corners of a face. `None` for any other
    /// number of corners.
    pub fn from_face(material: usize, corners: &[Vertex]) -> Option<Primitive> {
        let prim_type = match corners.len() {
            3 => PrimType::Triangles,
            4 => PrimType::Quads,
            _ => return None,
        };
        Some(Primitive {
            prim_type,
            material,
            vertices: corners.iter().cloned().collect(),
        })
    }

    pub fn triangle_count(&self) -> usize {
        let n = self.vertices.len();
        match self.prim_type {
            PrimType::Triangles => n / 3,
            PrimType::TriangleStrip => n.saturating_sub(2),
            _ => 0,
        }
    }

    pub fn quad_count(&self) -> usize {
        let n = self.vertices.len();
        match self.prim_type {
            PrimType::Quads => n / 4,
            PrimType::QuadStrip => n.saturating_sub(2) / 2,
            _ => 0,
        }
    }

    /// Expands back into separate triangles and quads, with the winding
    /// each had before stripping.
    pub fn faces(&self) -> Vec<SmallVec<[Vertex; 4]>> {
        let v = &self.vertices;
        let end = v.len();
        let mut faces = vec![];
        let face = |idxs: &[usize]| -> SmallVec<[Vertex; 4]> {
            idxs.iter().map(|&i| v[i]).collect()
        };

        match self.prim_type {
            PrimType::Triangles => {
                // Separate triangles
                //    0      5
                //   / \    / \
                //  1---2  3---4
                let mut i = 0;
                while i + 2 < end {
                    faces.push(face(&[i, i+1, i+2]));
                    i += 3;
                }
            }

            PrimType::Quads => {
                // Separate quads
                //  0---3  6---5
                //  |   |  |   |
                //  1---2  7---4
                let mut i = 0;
                while i + 3 < end {
                    faces.push(face(&[i, i+1, i+2, i+3]));
                    i += 4;
                }
            }

            PrimType::TriangleStrip => {
                // Triangle strip
                //  0---2---4
                //   \ / \ / \
                //    1---3---5
                let mut i = 0;
                let mut odd = false;
                while i + 2 < end {
                    match odd {
                        false => faces.push(face(&[i, i+1, i+2])),
                        true => faces.push(face(&[i, i+2, i+1])),
                    };
                    i += 1;
                    odd = !odd;
                }
            }

            PrimType::QuadStrip => {
                // Quad strip
                //  0---2---4
                //  |   |   |
                //  1---3---5
                let mut i = 0;
                while i + 3 < end {
                    faces.push(face(&[i, i+1, i+3, i+2]));
                    i += 2;
                }
            }
        }

        faces
    }
}

#[cfg(test)]
pub fn vtx(x: i64, y: i64, z: i64) -> Vertex {
    Vertex {
        position: [x, y, z],
        normal: [0, 0, 512],
        color: [0, 0, 0],
        texcoord: [0, 0],
        group: -1,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn quantize_vertex() {
        let v = Vertex::new(
            Point3::new(1.0, -0.5, 8.0),
            1,
            Vector3::new(0.0, 0.0, 2.0),
            Some([1.0, 0.5, 0.0]),
            None,
            3,
        );
        assert_eq!(v.position, [2048, -1024, 16384]);
        assert_eq!(v.normal, [0, 0, 512]);
        assert_eq!(v.color, [31, 16, 0]);
        assert_eq!(v.texcoord, [0, 0]);
        assert_eq!(v.group, 3);
    }

    #[test]
    fn face_types() {
        let tri = [vtx(0, 0, 0), vtx(1, 0, 0), vtx(0, 1, 0)];
        assert_eq!(Primitive::from_face(0, &tri).unwrap().prim_type, PrimType::Triangles);
        assert!(Primitive::from_face(0, &tri[..2]).is_none());
    }

    #[test]
    fn strip_expansion_keeps_winding() {
        let vs: SmallVec<[Vertex; 4]> =
            (0..6).map(|i| vtx(i, 0, 0)).collect();
        let strip = Primitive { prim_type: PrimType::TriangleStrip, material: 0, vertices: vs.clone() };
        assert_eq!(strip.triangle_count(), 4);
        let faces = strip.faces();
        assert_eq!(faces.len(), 4);
        assert_eq!(&faces[1][..], &[vs[1], vs[3], vs[2]]);

        let qstrip = Primitive { prim_type: PrimType::QuadStrip, material: 0, vertices: vs.clone() };
        assert_eq!(qstrip.quad_count(), 2);
        let faces = qstrip.faces();
        assert_eq!(&faces[0][..], &[vs[0], vs[1], vs[3], vs[2]]);
        assert_eq!(&faces[1][..], &[vs[2], vs[3], vs[5], vs[4]]);
    }
}
