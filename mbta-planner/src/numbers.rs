//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Round a f64 half away from zero and clamp it to the u32 range, returning 0 for NaN.
#[must_use]
pub fn round_f64_to_u32(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    let max = cast::<u32, f64>(u32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(0.0, max).round();
    cast::<f64, u32>(clamped).unwrap_or(0)
}

/// Floor a f64 and clamp it to the i32 range, returning 0 for non-finite values.
#[must_use]
pub fn floor_f64_to_i32(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).floor();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Map a unit roll in `[0, 1)` onto `0..span`, clamping out-of-range rolls.
#[must_use]
pub fn scale_unit_roll(roll: f64, span: u32) -> u32 {
    if span == 0 || roll.is_nan() {
        return 0;
    }
    let scaled = (roll.clamp(0.0, 1.0) * f64::from(span)).floor();
    cast::<f64, u32>(scaled).unwrap_or(0).min(span - 1)
}

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn u32_to_f64(value: u32) -> f64 {
    f64::from(value)
}

/// Convert a usize index to f64 for percentage math.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_goes_half_away_from_zero() {
        assert_eq!(round_f64_to_u32(2.5), 3);
        assert_eq!(round_f64_to_u32(20.999), 21);
        assert_eq!(round_f64_to_u32(1.49), 1);
        assert_eq!(round_f64_to_u32(-4.0), 0);
        assert_eq!(round_f64_to_u32(f64::NAN), 0);
    }

    #[test]
    fn flooring_handles_negatives_and_non_finite() {
        assert_eq!(floor_f64_to_i32(-0.5), -1);
        assert_eq!(floor_f64_to_i32(4.99), 4);
        assert_eq!(floor_f64_to_i32(f64::INFINITY), 0);
        assert_eq!(floor_f64_to_i32(f64::from(i32::MAX) * 2.0), i32::MAX);
    }

    #[test]
    fn unit_rolls_scale_into_span() {
        assert_eq!(scale_unit_roll(0.0, 10), 0);
        assert_eq!(scale_unit_roll(0.999_999, 10), 9);
        assert_eq!(scale_unit_roll(1.0, 10), 9);
        assert_eq!(scale_unit_roll(0.55, 5), 2);
        assert_eq!(scale_unit_roll(0.5, 0), 0);
    }

    #[test]
    fn widening_helpers_are_lossless_for_small_values() {
        assert!((u32_to_f64(7) - 7.0).abs() < f64::EPSILON);
        assert!((usize_to_f64(12) - 12.0).abs() < f64::EPSILON);
    }
}
