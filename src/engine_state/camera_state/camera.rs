//! # Camera
//!
//! A free-flying first-person camera. Orientation is stored as yaw and pitch; the
//! forward vector is derived from them on demand.

use std::f32::consts::FRAC_PI_2;

use cgmath::{Angle, InnerSpace, Point3, Rad, Vector3};

/// Safe limit for pitch to prevent gimbal lock
const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

/// Represents a first-person camera in 3D space.
///
/// # Fields
/// - `position`: The camera's position in world space
/// - `yaw`: Horizontal rotation (around Y axis) in radians, `0` looks along +X
/// - `pitch`: Vertical rotation in radians, clamped just short of straight up or down
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    /// The camera's position in world space
    pub position: Point3<f32>,
    /// Horizontal rotation (around Y axis) in radians
    pub yaw: Rad<f32>,
    /// Vertical rotation (around X axis) in radians
    pub pitch: Rad<f32>,
}

impl Camera {
    /// Creates a new camera with the specified position and orientation.
    ///
    /// # Arguments
    /// * `position` - Initial position of the camera in world space. Can be any type that converts to `Point3<f32>`.
    /// * `yaw` - Initial yaw (horizontal rotation around Y axis). Can be any type that converts to `Rad<f32>`.
    /// * `pitch` - Initial pitch (vertical rotation). Can be any type that converts to `Rad<f32>`.
    ///
    /// # Returns
    /// A new `Camera` instance with the specified position and orientation.
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        let mut camera = Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: Rad(0.0),
        };
        camera.set_pitch(pitch);
        camera
    }

    /// Gets the camera's forward direction vector.
    ///
    /// # Returns
    /// A normalized 3D vector representing the camera's forward direction
    pub fn get_view_vec(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.sin_cos();
        Vector3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize()
    }

    pub fn set_pitch<P: Into<Rad<f32>>>(&mut self, pitch: P) {
        self.pitch = Rad(pitch.into().0.clamp(-SAFE_FRAC_PI_2, SAFE_FRAC_PI_2));
    }

    /// Moves the camera along its view direction.
    pub fn move_forward(&mut self, distance: f32) {
        self.position += self.get_view_vec() * distance;
    }

    pub fn translate(&mut self, offset: Vector3<f32>) {
        self.position += offset;
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Deg;

    use super::*;

    #[test]
    fn test_view_vec_follows_yaw() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(90.0), Deg(0.0));
        let forward = camera.get_view_vec();
        assert!((forward - Vector3::unit_z()).magnitude() < 1e-5);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(120.0));
        assert!(camera.pitch.0 < FRAC_PI_2);
        assert!((camera.get_view_vec().magnitude() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_move_forward() {
        let mut camera = Camera::new(Point3::new(1.0, 2.0, 3.0), Deg(0.0), Deg(0.0));
        camera.move_forward(16.0);
        assert!((camera.position.x - 17.0).abs() < 1e-4);
        assert!((camera.position.z - 3.0).abs() < 1e-4);
    }
}
