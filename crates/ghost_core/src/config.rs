//! Detection thresholds and sampling cadence.

use serde::{Deserialize, Serialize};

use crate::error::{GhostError, Result};

/// Tunables for classification and flagging.
///
/// Every threshold is exclusive: a value must be strictly above it to flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Classify ticks where `tick % sample_every == 0` (1 = every tick).
    pub sample_every: u64,
    /// Max distance in world units for a camera to count as co-located.
    pub position_tolerance: f32,
    /// Per-axis angle difference tolerated before a follow is a mismatch.
    pub angle_tolerance: f32,
    /// Static records with a count above this are reported.
    pub static_min_occurrences: u32,
    /// Follow events whose summed angle delta exceeds this count toward a round flag.
    pub follow_angle_sum_threshold: f32,
    /// Rounds with more flagged follow events than this are reported.
    pub follow_round_min_events: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            sample_every: 1,
            position_tolerance: 1.0,
            angle_tolerance: 1.0,
            static_min_occurrences: 200,
            follow_angle_sum_threshold: 30.0,
            follow_round_min_events: 200,
        }
    }
}

impl DetectionConfig {
    /// Set sampling cadence.
    pub fn with_sample_every(mut self, n: u64) -> Self {
        self.sample_every = n;
        self
    }

    /// Set the static report threshold.
    pub fn with_static_threshold(mut self, occurrences: u32) -> Self {
        self.static_min_occurrences = occurrences;
        self
    }

    /// Set the follow thresholds.
    pub fn with_follow_thresholds(mut self, angle_sum: f32, min_events: u32) -> Self {
        self.follow_angle_sum_threshold = angle_sum;
        self.follow_round_min_events = min_events;
        self
    }

    /// Set matching tolerances.
    pub fn with_tolerances(mut self, position: f32, angle: f32) -> Self {
        self.position_tolerance = position;
        self.angle_tolerance = angle;
        self
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.sample_every == 0 {
            return Err(GhostError::InvalidConfig(
                "sample_every must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("position_tolerance", self.position_tolerance),
            ("angle_tolerance", self.angle_tolerance),
            ("follow_angle_sum_threshold", self.follow_angle_sum_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(GhostError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Whether `tick` falls on the sampling cadence. An unvalidated zero
    /// cadence samples nothing.
    #[must_use]
    pub fn should_sample(&self, tick: u64) -> bool {
        tick.checked_rem(self.sample_every) == Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_defaults() {
        let config = DetectionConfig::default();
        assert_eq!(config.sample_every, 1);
        assert_eq!(config.static_min_occurrences, 200);
        assert_eq!(config.follow_angle_sum_threshold, 30.0);
        assert_eq!(config.follow_round_min_events, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_cadence_rejected() {
        let config = DetectionConfig::default().with_sample_every(0);
        assert!(matches!(
            config.validate(),
            Err(GhostError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let config = DetectionConfig::default().with_tolerances(-1.0, 1.0);
        assert!(config.validate().is_err());

        let config = DetectionConfig::default().with_tolerances(1.0, f32::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_should_sample() {
        let every = DetectionConfig::default();
        assert!(every.should_sample(7));

        let tenth = DetectionConfig::default().with_sample_every(10);
        assert!(tenth.should_sample(0));
        assert!(tenth.should_sample(120));
        assert!(!tenth.should_sample(121));

        let zero = DetectionConfig::default().with_sample_every(0);
        assert!(!zero.should_sample(0));
        assert!(!zero.should_sample(64));
    }
}
