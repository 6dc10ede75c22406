//! Mesh data structures for voxel rendering.
//!
//! A [`ChunkMesh`] is the builder's working form: one [`Face`] per visible voxel side.
//! [`MeshData`] is the flattened form handed to the renderer.

use crate::engine_state::{rendering::Vertex, voxels::block::block_side::BlockSide};

use super::face::Face;

/// Index pattern for one quad, relative to its first vertex.
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Flattened geometry for one chunk: parallel vertex streams plus triangle indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub colors: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn face_count(&self) -> usize {
        self.positions.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Interleaves the streams into one vertex buffer.
    pub fn interleaved(&self) -> Vec<Vertex> {
        self.positions
            .iter()
            .zip(&self.uvs)
            .zip(&self.colors)
            .map(|((position, tex_coords), color)| Vertex {
                position: *position,
                tex_coords: *tex_coords,
                color: *color,
            })
            .collect()
    }
}

/// The visible faces of one chunk.
#[derive(Debug, Clone, Default)]
pub struct ChunkMesh {
    faces: Vec<Face>,
}

impl ChunkMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn push(&mut self, face: Face) {
        self.faces.push(face);
    }

    /// Drops every face on the boundary facing `side`.
    pub fn remove_boundary(&mut self, side: BlockSide) {
        self.faces.retain(|face| !face.faces_boundary(side));
    }

    /// Flattens the faces into renderer buffers.
    ///
    /// # Arguments
    /// * `unit` - Atlas cell size in UV space
    pub fn mesh_data(&self, unit: f32) -> MeshData {
        let count = self.faces.len();
        let mut data = MeshData {
            positions: Vec::with_capacity(count * 4),
            uvs: Vec::with_capacity(count * 4),
            colors: Vec::with_capacity(count * 4),
            indices: Vec::with_capacity(count * 6),
        };

        for face in &self.faces {
            let base = data.positions.len() as u32;
            data.positions
                .extend(face.corners().iter().map(|corner| [corner.x, corner.y, corner.z]));
            data.uvs.extend(face.uvs(unit));
            data.colors.extend([face.tint; 4]);
            data.indices.extend(QUAD_INDICES.iter().map(|index| base + index));
        }

        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        rendering::atlas::{AtlasCell, WHITE},
        voxels::block::block_type::BlockType,
    };

    #[test]
    fn test_mesh_data_layout() {
        let mut mesh = ChunkMesh::new();
        for side in [BlockSide::TOP, BlockSide::LEFT] {
            mesh.push(Face::new(0, 0, 0, BlockType::STONE, side, AtlasCell::default(), WHITE));
        }
        let data = mesh.mesh_data(0.125);
        assert_eq!(data.face_count(), 2);
        assert_eq!(data.uvs.len(), 8);
        assert_eq!(data.colors.len(), 8);
        assert_eq!(data.indices, vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);

        let vertices = data.interleaved();
        assert_eq!(vertices.len(), 8);
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), 8 * std::mem::size_of::<Vertex>());
    }

    #[test]
    fn test_remove_boundary_keeps_interior() {
        let mut mesh = ChunkMesh::new();
        mesh.push(Face::new(15, 3, 3, BlockType::STONE, BlockSide::RIGHT, AtlasCell::default(), WHITE));
        mesh.push(Face::new(14, 3, 3, BlockType::STONE, BlockSide::RIGHT, AtlasCell::default(), WHITE));
        mesh.push(Face::new(15, 3, 3, BlockType::STONE, BlockSide::TOP, AtlasCell::default(), WHITE));
        mesh.remove_boundary(BlockSide::RIGHT);
        assert_eq!(mesh.face_count(), 2);
    }
}
