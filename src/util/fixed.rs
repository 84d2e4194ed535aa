//! Fixed-point conversions.
//!
//! Positions, texcoords and scales use fx32 (Q19.12, one unit = 1/4096).
//! Normals use fx10 (one unit = 1/512).

pub const FX32_FRAC_BITS: u32 = 12;
pub const FX10_FRAC_BITS: u32 = 9;

/// Largest magnitude of an fx10 component.
pub const FX10_ONE: i64 = 1 << FX10_FRAC_BITS;

/// Converts to fixed point with `frac_bits` fractional bits. Halfway cases
/// round away from zero.
pub fn float_to_fx(v: f64, frac_bits: u32) -> i64 {
    (v * (1u64 << frac_bits) as f64).round() as i64
}

pub fn fx_to_float(x: i64, frac_bits: u32) -> f64 {
    x as f64 / (1u64 << frac_bits) as f64
}

pub fn fx32(v: f64) -> i64 {
    float_to_fx(v, FX32_FRAC_BITS)
}

pub fn fx32_to_float(x: i64) -> f64 {
    fx_to_float(x, FX32_FRAC_BITS)
}

/// Normal component; clamped to [-1, 1].
pub fn fx10(v: f64) -> i64 {
    let x = float_to_fx(v, FX10_FRAC_BITS);
    if x > FX10_ONE {
        FX10_ONE
    } else if x < -FX10_ONE {
        -FX10_ONE
    } else {
        x
    }
}

pub fn fx10_to_float(x: i64) -> f64 {
    fx_to_float(x, FX10_FRAC_BITS)
}

/// Number of right shifts needed before `fx32(max_coord)` fits in a signed
/// 16-bit number.
pub fn pos_scale(max_coord: f64) -> u32 {
    let mut m = fx32(max_coord);
    let mut s = 0;
    while m >= 0x8000 {
        m >>= 1;
        s += 1;
    }
    s
}

/// Whether a shifted fx32 coordinate can be sent to the GPU.
pub fn fits_in_16_bits(x: i64) -> bool {
    x >= -0x8000 && x <= 0x7fff
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip_error_is_below_one_unit() {
        let unit = 1.0 / 4096.0;
        let mut v = -40.0;
        while v < 40.0 {
            let back = fx_to_float(float_to_fx(v, 12), 12);
            assert!((back - v).abs() < unit, "{} came back as {}", v, back);
            v += 0.0137;
        }
    }

    #[test]
    fn halfway_rounds_away_from_zero() {
        // 0.5/4096 and 2.5/4096 are exactly halfway between two units.
        assert_eq!(fx32(0.5 / 4096.0), 1);
        assert_eq!(fx32(2.5 / 4096.0), 3);
        assert_eq!(fx32(-0.5 / 4096.0), -1);
        assert_eq!(fx32(-2.5 / 4096.0), -3);
    }

    #[test]
    fn fx10_clamps() {
        assert_eq!(fx10(1.0), 512);
        assert_eq!(fx10(-1.0), -512);
        assert_eq!(fx10(1.5), 512);
        assert_eq!(fx10(-3.0), -512);
        assert_eq!(fx10(0.5), 256);
        assert_eq!(fx10_to_float(fx10(0.25)), 0.25);
    }

    #[test]
    fn pos_scale_values() {
        assert_eq!(pos_scale(0.0), 0);
        // 7.999 * 4096 = 32764 < 0x8000
        assert_eq!(pos_scale(7.999), 0);
        assert_eq!(pos_scale(8.0), 1);
        assert_eq!(pos_scale(16.0), 2);
        assert_eq!(pos_scale(100.0), 4);
    }

    #[test]
    fn pos_scale_is_monotone() {
        let mut prev = 0;
        let mut v = 0.0;
        while v < 5000.0 {
            let s = pos_scale(v);
            assert!(prev <= s);
            prev = s;
            v += 0.77;
        }
    }

    #[test]
    fn shifted_coordinates_fit() {
        for &max in &[0.3, 8.0, 31.9, 1000.0] {
            let s = pos_scale(max);
            assert!(fits_in_16_bits(fx32(max) >> s));
            assert!(fits_in_16_bits(fx32(-max) >> s));
        }
        assert!(!fits_in_16_bits(0x8000));
        assert!(fits_in_16_bits(-0x8000));
    }
}
