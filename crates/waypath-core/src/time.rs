//! Validated per-frame elapsed time.

use crate::error::{Error, Result};

/// Elapsed time for one frame, in seconds.
///
/// Always finite, non-negative and no larger than the session's maximum
/// step, so every operation that takes one is total.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct FrameDelta(f32);

impl FrameDelta {
    /// A step in which no time elapses.
    pub const ZERO: Self = Self(0.0);

    /// Validate `seconds` and clamp it to `max_delta`.
    ///
    /// Slow frames are clamped rather than rejected so a hitch cannot make
    /// the integrator jump.
    pub fn new(seconds: f32, max_delta: f32) -> Result<Self> {
        if !seconds.is_finite() {
            return Err(Error::invalid_input(
                "frame delta",
                format!("elapsed time must be finite, got {seconds}"),
            ));
        }
        if seconds < 0.0 {
            return Err(Error::invalid_input(
                "frame delta",
                format!("elapsed time must not be negative, got {seconds}"),
            ));
        }
        Ok(Self(seconds.min(max_delta)))
    }

    /// Elapsed seconds.
    #[must_use]
    pub fn secs(self) -> f32 {
        self.0
    }

    /// Whether no time elapsed.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_clamps_slow_frames() {
        let delta = FrameDelta::new(0.5, 0.05).unwrap();
        assert_eq!(delta.secs(), 0.05);
    }

    #[test]
    fn test_delta_passes_short_frames() {
        let delta = FrameDelta::new(0.016, 0.05).unwrap();
        assert_eq!(delta.secs(), 0.016);
        assert!(FrameDelta::new(0.0, 0.05).unwrap().is_zero());
    }

    #[test]
    fn test_delta_rejects_negative_and_nan() {
        assert!(matches!(
            FrameDelta::new(-0.01, 0.05),
            Err(Error::InvalidInput { .. })
        ));
        assert!(FrameDelta::new(f32::NAN, 0.05).is_err());
        assert!(FrameDelta::new(f32::INFINITY, 0.05).is_err());
    }
}
