//! Geometry helpers for camera matching.
//!
//! World positions and view angles come straight from the recording as
//! `f32`. Angles are in degrees and wrap independently at 360.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 3D world position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
}

impl Vec3 {
    /// Origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Whether `other` lies within `tolerance` world units (inclusive).
    #[must_use]
    pub fn within(self, other: Self, tolerance: f32) -> bool {
        self.distance_squared(other) <= tolerance * tolerance
    }

    /// True when no coordinate is NaN or infinite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// Camera orientation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewAngles {
    /// Horizontal view angle (yaw).
    pub horizontal: f32,
    /// Vertical view angle (pitch).
    pub vertical: f32,
}

impl ViewAngles {
    /// Create new view angles.
    #[must_use]
    pub const fn new(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// True when both angles are real numbers.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.horizontal.is_finite() && self.vertical.is_finite()
    }

    /// Per-axis circular difference to another orientation.
    #[must_use]
    pub fn delta(self, other: Self) -> AngleDelta {
        AngleDelta {
            horizontal: angle_diff(self.horizontal, other.horizontal),
            vertical: angle_diff(self.vertical, other.vertical),
        }
    }
}

/// Circular difference between two orientations, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AngleDelta {
    /// Horizontal difference in degrees.
    pub horizontal: f32,
    /// Vertical difference in degrees.
    pub vertical: f32,
}

impl AngleDelta {
    /// Whether either axis differs by more than `tolerance`.
    #[must_use]
    pub fn exceeds(self, tolerance: f32) -> bool {
        self.horizontal > tolerance || self.vertical > tolerance
    }

    /// Combined horizontal and vertical difference.
    #[must_use]
    pub fn sum(self) -> f32 {
        self.horizontal + self.vertical
    }
}

/// Circular difference between two angles in degrees.
///
/// For inputs in `[0, 360)` the result is in `[0, 180]`, so 350 and 10 are
/// 20 degrees apart rather than 340.
#[must_use]
pub fn angle_diff(a: f32, b: f32) -> f32 {
    let diff = (a - b).abs();
    if diff > 180.0 {
        (diff - 360.0).abs()
    } else {
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_angle_diff_wraparound() {
        assert_eq!(angle_diff(350.0, 10.0), 20.0);
        assert_eq!(angle_diff(10.0, 350.0), 20.0);
        assert_eq!(angle_diff(0.0, 180.0), 180.0);
        assert_eq!(angle_diff(90.0, 95.0), 5.0);
    }

    #[test]
    fn test_vec3_within_is_inclusive() {
        let a = Vec3::new(100.0, 200.0, 64.0);
        assert!(a.within(Vec3::new(101.0, 200.0, 64.0), 1.0));
        assert!(!a.within(Vec3::new(101.5, 200.0, 64.0), 1.0));
        assert!(a.within(a, 0.0));
    }

    #[test]
    fn test_vec3_finite() {
        assert!(Vec3::ZERO.is_finite());
        assert!(!Vec3::new(f32::NAN, 0.0, 0.0).is_finite());
        assert!(!Vec3::new(0.0, f32::INFINITY, 0.0).is_finite());
    }

    #[test]
    fn test_delta_exceeds_either_axis() {
        let delta = ViewAngles::new(95.0, 0.0).delta(ViewAngles::new(90.0, 0.0));
        assert!(delta.exceeds(1.0));
        assert_eq!(delta.sum(), 5.0);

        let delta = ViewAngles::new(90.5, 10.5).delta(ViewAngles::new(90.0, 10.0));
        assert!(!delta.exceeds(1.0));
    }

    proptest! {
        #[test]
        fn prop_angle_diff_commutative(a in 0.0f32..360.0, b in 0.0f32..360.0) {
            prop_assert_eq!(angle_diff(a, b), angle_diff(b, a));
        }

        #[test]
        fn prop_angle_diff_bounded(a in 0.0f32..360.0, b in 0.0f32..360.0) {
            let d = angle_diff(a, b);
            prop_assert!((0.0..=180.0).contains(&d), "diff {} out of range", d);
        }
    }
}
