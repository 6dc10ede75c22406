//! # Camera State Management
//!
//! The world manager only needs two things from whoever is looking at the world: the
//! chunk they are standing in and the direction they are facing. [`Viewer`] is that
//! contract; [`camera::Camera`] is the default implementation.

use cgmath::Vector3;

use super::voxels::position::ChunkPos;

pub mod camera;

pub use camera::Camera;

/// The viewer as seen by the streaming scheduler.
pub trait Viewer {
    /// The chunk containing the viewer.
    fn viewer_chunk(&self) -> ChunkPos;

    /// Normalized view direction.
    fn view_direction(&self) -> Vector3<f32>;
}

impl Viewer for Camera {
    fn viewer_chunk(&self) -> ChunkPos {
        ChunkPos::from_world_position(self.position)
    }

    fn view_direction(&self) -> Vector3<f32> {
        self.get_view_vec()
    }
}
