//! Unit conversion utilities.
//!
//! DrawingML stores lengths in EMUs, angles in 60000ths of a degree and
//! percentages in 100000ths. The scene description uses points, degrees and
//! unit fractions.

pub const EMUS_PER_INCH: i64 = 914_400;
pub const EMUS_PER_PT: i64 = 12_700;
pub const POINTS_PER_INCH: f64 = 72.0;
pub const ANGLE_UNITS_PER_DEGREE: i64 = 60_000;
pub const PERCENT_UNITS: i64 = 100_000;
/// Font sizes (`sz`) are stored in hundredths of a point.
pub const FONT_SIZE_UNITS_PER_PT: f64 = 100.0;

/// EMU to points.
#[inline]
pub fn emu_to_pt(emu: i64) -> f64 {
    emu as f64 / EMUS_PER_PT as f64
}

/// Points to EMU, routed through the inch so that `pt * 72⁻¹ * 914400` holds.
#[inline]
pub fn pt_to_emu(pt: f64) -> i64 {
    (pt / POINTS_PER_INCH * EMUS_PER_INCH as f64).round() as i64
}

/// 60000ths of a degree to degrees.
#[inline]
pub fn angle_to_deg(angle: i64) -> f64 {
    angle as f64 / ANGLE_UNITS_PER_DEGREE as f64
}

/// Degrees to 60000ths of a degree.
#[inline]
pub fn deg_to_angle(deg: f64) -> i64 {
    (deg * ANGLE_UNITS_PER_DEGREE as f64).round() as i64
}

/// 100000ths to a unit fraction.
#[inline]
pub fn pct_to_unit(pct: i64) -> f64 {
    pct as f64 / PERCENT_UNITS as f64
}

/// Unit fraction to 100000ths.
#[inline]
pub fn unit_to_pct(unit: f64) -> i64 {
    (unit * PERCENT_UNITS as f64).round() as i64
}

/// Normalize an angle in degrees into `[0, 360)`.
#[inline]
pub fn normalize_degrees(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if d >= 360.0 { 0.0 } else { d }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fixed_divisors() {
        assert_eq!(emu_to_pt(12_700), 1.0);
        assert_eq!(emu_to_pt(1_270_000), 100.0);
        assert_eq!(angle_to_deg(5_400_000), 90.0);
        assert_eq!(pct_to_unit(50_000), 0.5);
    }

    #[test]
    fn test_pt_to_emu_through_inches() {
        assert_eq!(pt_to_emu(72.0), EMUS_PER_INCH);
        assert_eq!(pt_to_emu(1.0), EMUS_PER_PT);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(370.0), 10.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_length_round_trip(emu in -100_000_000i64..100_000_000i64) {
            prop_assert_eq!(pt_to_emu(emu_to_pt(emu)), emu);
        }

        #[test]
        fn prop_normalized_range(deg in -10_000.0f64..10_000.0) {
            let n = normalize_degrees(deg);
            prop_assert!((0.0..360.0).contains(&n));
        }
    }
}
