//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Round a f64 and saturate it to the u64 range, returning 0 for non-finite or negative values.
#[must_use]
pub fn round_f64_to_u64(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    cast::<f64, u64>(value.round()).unwrap_or(u64::MAX)
}

/// Convert u64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn u64_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(0.0)
}

/// Convert usize to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Divide a millisecond duration by a positive speed factor, rounding to the nearest ms.
#[must_use]
pub fn scale_ms(duration_ms: u64, speed: f64) -> u64 {
    if !speed.is_finite() || speed <= 0.0 {
        return duration_ms;
    }
    round_f64_to_u64(u64_to_f64(duration_ms) / speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_handles_non_finite_and_negative() {
        assert_eq!(round_f64_to_u64(f64::NAN), 0);
        assert_eq!(round_f64_to_u64(-3.2), 0);
        assert_eq!(round_f64_to_u64(2.5), 3);
        assert_eq!(round_f64_to_u64(f64::INFINITY), 0);
    }

    #[test]
    fn rounding_saturates_huge_values() {
        assert_eq!(round_f64_to_u64(1e30), u64::MAX);
        assert_eq!(round_f64_to_u64(18_446_744_073_709_551_616.0), u64::MAX);
        assert_eq!(scale_ms(u64::MAX, 0.25), u64::MAX);
    }

    #[test]
    fn scale_ms_divides_by_speed() {
        assert_eq!(scale_ms(1_000, 2.0), 500);
        assert_eq!(scale_ms(1_000, 0.25), 4_000);
        assert_eq!(scale_ms(1_000, 0.0), 1_000);
        assert_eq!(scale_ms(300, 50.0), 6);
    }
}
