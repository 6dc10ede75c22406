//! Rendering collaborators for the voxel world.
//!
//! The world manager never talks to a graphics API. It creates one visual per active
//! chunk through a [`ChunkRenderer`], uploads [`MeshData`] into it, and destroys it on
//! eviction. [`RecordingRenderer`] is a headless implementation that keeps the last
//! upload per visual, used by the demo binary and the tests.

use std::collections::HashMap;

use cgmath::Point3;

pub mod atlas;
pub mod meshing;
mod vertex;

// Re-export commonly used types
pub use meshing::{ChunkMesh, MeshBuilder, MeshData};
pub use vertex::Vertex;

/// Opaque handle to a renderer-side chunk visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualHandle(pub u64);

/// The presentation layer as seen by the world manager.
pub trait ChunkRenderer {
    /// Creates an empty visual positioned at a chunk's world origin.
    fn create_chunk_visual(&mut self, world_origin: Point3<f32>) -> VisualHandle;

    fn destroy_chunk_visual(&mut self, handle: VisualHandle);

    /// Replaces the visual's geometry. Vertex positions are relative to its origin.
    fn upload_mesh(&mut self, handle: VisualHandle, mesh: &MeshData);
}

/// What a [`RecordingRenderer`] knows about one live visual.
#[derive(Debug, Clone)]
pub struct RecordedVisual {
    pub origin: Point3<f32>,
    pub mesh: MeshData,
    pub uploads: usize,
}

/// Headless renderer that records visuals and their latest mesh.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    visuals: HashMap<VisualHandle, RecordedVisual>,
    next_handle: u64,
    created: usize,
    destroyed: usize,
    uploads: usize,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visual(&self, handle: VisualHandle) -> Option<&RecordedVisual> {
        self.visuals.get(&handle)
    }

    pub fn live_visuals(&self) -> usize {
        self.visuals.len()
    }

    pub fn created(&self) -> usize {
        self.created
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed
    }

    pub fn uploads(&self) -> usize {
        self.uploads
    }

    /// Faces across every live visual.
    pub fn total_faces(&self) -> usize {
        self.visuals
            .values()
            .map(|visual| visual.mesh.face_count())
            .sum()
    }
}

impl ChunkRenderer for RecordingRenderer {
    fn create_chunk_visual(&mut self, world_origin: Point3<f32>) -> VisualHandle {
        let handle = VisualHandle(self.next_handle);
        self.next_handle += 1;
        self.created += 1;
        self.visuals.insert(
            handle,
            RecordedVisual {
                origin: world_origin,
                mesh: MeshData::default(),
                uploads: 0,
            },
        );
        handle
    }

    fn destroy_chunk_visual(&mut self, handle: VisualHandle) {
        if self.visuals.remove(&handle).is_some() {
            self.destroyed += 1;
        } else {
            log::warn!("Destroying unknown visual {:?}", handle);
        }
    }

    fn upload_mesh(&mut self, handle: VisualHandle, mesh: &MeshData) {
        match self.visuals.get_mut(&handle) {
            Some(visual) => {
                visual.mesh = mesh.clone();
                visual.uploads += 1;
                self.uploads += 1;
            }
            None => log::warn!("Upload to unknown visual {:?}", handle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_renderer_lifecycle() {
        let mut renderer = RecordingRenderer::new();
        let a = renderer.create_chunk_visual(Point3::new(0.0, 0.0, 0.0));
        let b = renderer.create_chunk_visual(Point3::new(16.0, 0.0, 0.0));
        assert_ne!(a, b);

        let mesh = MeshData {
            positions: vec![[0.0; 3]; 4],
            uvs: vec![[0.0; 2]; 4],
            colors: vec![[1.0; 4]; 4],
            indices: vec![0, 1, 2, 0, 2, 3],
        };
        renderer.upload_mesh(b, &mesh);
        assert_eq!(renderer.visual(b).map(|v| v.uploads), Some(1));
        assert_eq!(renderer.total_faces(), 1);

        renderer.destroy_chunk_visual(a);
        renderer.destroy_chunk_visual(a);
        assert_eq!(renderer.live_visuals(), 1);
        assert_eq!(renderer.destroyed(), 1);
        assert_eq!(renderer.created(), 2);
    }
}
