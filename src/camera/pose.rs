// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use glam::{Quat, Vec3};

/// World-space camera placement sampled once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl CameraPose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn distance_to(&self, other: &CameraPose) -> f32 {
        self.position.distance(other.position)
    }

    /// Smallest rotation angle in degrees taking one orientation to the other.
    /// `q` and `-q` count as the same orientation.
    pub fn angle_to_degrees(&self, other: &CameraPose) -> f32 {
        // atan2 stays accurate for tiny angles where acos(dot) loses precision.
        let delta = self.rotation.conjugate() * other.rotation;
        let half = delta.xyz().length().atan2(delta.w.abs());
        (half * 2.0).to_degrees()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_between_yaw_rotations() {
        let a = CameraPose::new(Vec3::ZERO, Quat::from_rotation_y(0.0));
        let b = CameraPose::new(Vec3::ZERO, Quat::from_rotation_y(30f32.to_radians()));
        assert!((a.angle_to_degrees(&b) - 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_negated_quaternion_is_same_orientation() {
        let q = Quat::from_rotation_x(0.7);
        let a = CameraPose::new(Vec3::ZERO, q);
        let b = CameraPose::new(Vec3::ZERO, -q);
        assert!(a.angle_to_degrees(&b) < 1e-4);
    }

    #[test]
    fn test_small_angles_are_resolved() {
        let a = CameraPose::new(Vec3::ZERO, Quat::IDENTITY);
        let b = CameraPose::new(Vec3::ZERO, Quat::from_rotation_z(0.12f32.to_radians()));
        let angle = a.angle_to_degrees(&b);
        assert!((angle - 0.12).abs() < 1e-3, "got {angle}");
    }

    #[test]
    fn test_distance() {
        let a = CameraPose::new(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY);
        let b = CameraPose::new(Vec3::new(1.0, 2.0, 6.0), Quat::IDENTITY);
        assert!((a.distance_to(&b) - 3.0).abs() < 1e-6);
    }
}
