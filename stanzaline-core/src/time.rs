//! Time and duration conversion utilities.
//!
//! Transcript timestamps arrive as fractional seconds and the playback clock
//! as a [`Duration`]; the timeline works in whole milliseconds. These helpers
//! make the conversions explicit and saturating.

use std::time::Duration;

/// Extension trait for safe Duration conversions.
pub trait DurationExt {
    /// Convert duration to milliseconds as u64, saturating at `u64::MAX`.
    ///
    /// In practice, this is always safe because durations exceeding `u64::MAX`
    /// milliseconds would represent ~584 million years.
    fn as_millis_u64(&self) -> u64;

    /// Convert duration to seconds as u32, saturating at `u32::MAX`.
    fn as_secs_u32(&self) -> u32;
}

impl DurationExt for Duration {
    fn as_millis_u64(&self) -> u64 {
        u64::try_from(self.as_millis()).unwrap_or(u64::MAX)
    }

    fn as_secs_u32(&self) -> u32 {
        u32::try_from(self.as_secs()).unwrap_or(u32::MAX)
    }
}

/// Convert a transcript timestamp in seconds to whole milliseconds.
///
/// Rounds to the nearest millisecond so that values such as `0.29` do not land
/// one millisecond early. Returns `None` for negative or non-finite input.
#[must_use]
pub fn secs_to_millis(secs: f64) -> Option<u64> {
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    let millis = (secs * 1000.0).round();
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let millis = if millis >= u64::MAX as f64 {
        u64::MAX
    } else {
        millis as u64
    };
    Some(millis)
}

/// Convert a clock reading in fractional seconds into a [`Duration`].
///
/// Negative or non-finite readings clamp to zero.
#[must_use]
pub fn clock_secs(secs: f64) -> Duration {
    if !secs.is_finite() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_millis_u64() {
        let duration = Duration::from_millis(1234);
        assert_eq!(duration.as_millis_u64(), 1234);
    }

    #[test]
    fn test_as_millis_u64_zero() {
        assert_eq!(Duration::ZERO.as_millis_u64(), 0);
    }

    #[test]
    fn test_as_secs_u32_large() {
        // Duration larger than u32::MAX seconds
        let duration = Duration::from_secs(u64::from(u32::MAX) + 1);
        assert_eq!(duration.as_secs_u32(), u32::MAX);
    }

    #[test]
    fn test_secs_to_millis_exact() {
        assert_eq!(secs_to_millis(1.5), Some(1500));
        assert_eq!(secs_to_millis(0.0), Some(0));
    }

    #[test]
    fn test_secs_to_millis_rounds_float_noise() {
        // 0.29 * 1000 is not exactly 290 in binary floating point
        assert_eq!(secs_to_millis(0.29), Some(290));
        assert_eq!(secs_to_millis(2.345), Some(2345));
    }

    #[test]
    fn test_secs_to_millis_rejects_invalid() {
        assert_eq!(secs_to_millis(-0.5), None);
        assert_eq!(secs_to_millis(f64::NAN), None);
        assert_eq!(secs_to_millis(f64::INFINITY), None);
    }

    #[test]
    fn test_clock_secs() {
        assert_eq!(clock_secs(2.5), Duration::from_millis(2500));
        assert_eq!(clock_secs(-1.0), Duration::ZERO);
        assert_eq!(clock_secs(f64::NAN), Duration::ZERO);
    }
}
