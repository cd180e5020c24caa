//! Spatial types: positions, distances and facing checks.
//!
//! The world uses a right-handed layout where `y` is the vertical axis and
//! the ground plane is spanned by `x` and `z`. Rotation is a yaw in radians,
//! with `0.0` facing `+x` and positive values turning towards `+z`.

use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// A point in a zone plus the yaw an entity standing there is facing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate (ground plane)
    pub x: f32,
    /// Y coordinate (vertical)
    pub y: f32,
    /// Z coordinate (ground plane)
    pub z: f32,
    /// Facing yaw in radians
    pub rotation: f32,
}

impl Position {
    /// Creates a position facing `+x`.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            rotation: 0.0,
        }
    }

    /// Sets the facing yaw.
    #[must_use]
    pub fn facing(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Full 3D distance to another point.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Distance on the ground plane, ignoring height.
    #[must_use]
    pub fn horizontal_distance(&self, other: &Self) -> f32 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Absolute height difference.
    #[must_use]
    pub fn vertical_distance(&self, other: &Self) -> f32 {
        (other.y - self.y).abs()
    }

    /// Yaw pointing from this position towards `other`.
    #[must_use]
    pub fn yaw_to(&self, other: &Self) -> f32 {
        (other.z - self.z).atan2(other.x - self.x)
    }

    /// Checks whether `other` lies inside a cone of `cone_degrees` total
    /// width centred on this position's facing.
    #[must_use]
    pub fn is_facing(&self, other: &Self, cone_degrees: f32) -> bool {
        if self.horizontal_distance(other) < f32::EPSILON {
            return true;
        }
        let diff = normalize_angle(self.yaw_to(other) - self.rotation).abs();
        diff <= (cone_degrees * 0.5).to_radians()
    }

    /// Point `offset` units away, at `angle` radians relative to the current
    /// facing. `PI` gives a point directly behind.
    #[must_use]
    pub fn near(&self, offset: f32, angle: f32) -> Self {
        let yaw = self.rotation + angle;
        Self {
            x: self.x + offset * yaw.cos(),
            y: self.y,
            z: self.z + offset * yaw.sin(),
            rotation: self.rotation,
        }
    }
}

/// Wraps an angle into `(-PI, PI]`.
#[must_use]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_facing_straight_ahead() {
        let mob = Position::new(0.0, 0.0, 0.0);
        let ahead = Position::new(10.0, 0.0, 0.0);
        let behind = Position::new(-10.0, 0.0, 0.0);
        assert!(mob.is_facing(&ahead, 40.0));
        assert!(!mob.is_facing(&behind, 40.0));
    }

    #[test]
    fn test_facing_cone_edges() {
        let mob = Position::new(0.0, 0.0, 0.0);
        // 15 degrees off axis is inside a 40 degree cone, 25 is not
        let inside = Position::new(15f32.to_radians().cos(), 0.0, 15f32.to_radians().sin());
        let outside = Position::new(25f32.to_radians().cos(), 0.0, 25f32.to_radians().sin());
        assert!(mob.is_facing(&inside, 40.0));
        assert!(!mob.is_facing(&outside, 40.0));
    }

    #[test]
    fn test_facing_wraps_around() {
        let mob = Position::new(0.0, 0.0, 0.0).facing(PI);
        let target = Position::new(-5.0, 0.0, -0.1);
        assert!(mob.is_facing(&target, 40.0));
    }

    #[test]
    fn test_near_behind() {
        let mob = Position::new(1.0, 2.0, 1.0);
        let behind = mob.near(2.0, PI);
        assert!((behind.x - -1.0).abs() < 0.001);
        assert!((behind.z - 1.0).abs() < 0.001);
        assert!((behind.y - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(2.5 * PI) - 0.5 * PI).abs() < 0.001);
        assert!((normalize_angle(-0.5) - -0.5).abs() < 0.001);
    }

    proptest! {
        #[test]
        fn prop_normalized_angle_in_range(angle in -100.0f32..100.0) {
            let n = normalize_angle(angle);
            prop_assert!(n > -PI - 0.001 && n <= PI + 0.001);
        }

        #[test]
        fn prop_distance_is_symmetric(
            ax in -500.0f32..500.0, az in -500.0f32..500.0,
            bx in -500.0f32..500.0, bz in -500.0f32..500.0,
        ) {
            let a = Position::new(ax, 0.0, az);
            let b = Position::new(bx, 0.0, bz);
            prop_assert!((a.distance(&b) - b.distance(&a)).abs() < 0.001);
        }
    }
}
