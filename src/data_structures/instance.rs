//! Placement of a scene object in the world.

use cgmath::{Deg, One, Quaternion, Rotation3, Vector3};

/// Per-object transformation: position, rotation (as quaternion), and scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instance {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Instance {
    /// Identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            // `Quaternion::one()` is the identity quaternion (no rotation)
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Set the rotation from Euler angles in degrees, applied X, then Y, then Z.
    pub fn set_rotation_deg(&mut self, degrees: Vector3<f32>) {
        self.rotation = Quaternion::from_angle_z(Deg(degrees.z))
            * Quaternion::from_angle_y(Deg(degrees.y))
            * Quaternion::from_angle_x(Deg(degrees.x));
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}
