//! Face-culling mesh generation for voxel chunks.
//!
//! For every solid voxel, each of the six sides whose neighbour is air becomes one quad.
//! Neighbours inside the chunk are read directly. Neighbours across a chunk boundary are
//! resolved through a [`BlockSource`], unless the builder runs in isolate mode, where
//! everything outside the chunk counts as air.
//!
//! # Partial rebuilds
//! When a neighbouring chunk finishes generating after this chunk was meshed, only the
//! faces on the shared boundary can change. [`MeshBuilder::rebuild_boundary`] drops the
//! faces in that slab and re-evaluates just those voxels.

use cgmath::Point3;
use web_time::Instant;

use crate::engine_state::voxels::{
    block::{block_side::BlockSide, block_type::BlockType},
    chunk::{DataChunk, CHUNK_DIMENSION},
    position::BlockPos,
};

use super::atlas::TextureAtlas;

mod mesh;

pub use mesh::*;

const DIMENSION: usize = CHUNK_DIMENSION as usize;

/// Answers "what block is at this position" for voxels outside the chunk being meshed.
pub trait BlockSource {
    fn block_at(&self, pos: BlockPos) -> BlockType;
}

impl<F> BlockSource for F
where
    F: Fn(BlockPos) -> BlockType,
{
    fn block_at(&self, pos: BlockPos) -> BlockType {
        self(pos)
    }
}

/// Builds [`ChunkMesh`]es for chunks.
pub struct MeshBuilder<'a> {
    atlas: &'a dyn TextureAtlas,
    neighbors: &'a dyn BlockSource,
    isolate: bool,
}

impl<'a> MeshBuilder<'a> {
    /// # Arguments
    /// * `atlas` - Texture and tint lookups
    /// * `neighbors` - Source for voxels outside the chunk
    /// * `isolate` - Treat everything outside the chunk as air
    pub fn new(atlas: &'a dyn TextureAtlas, neighbors: &'a dyn BlockSource, isolate: bool) -> Self {
        MeshBuilder {
            atlas,
            neighbors,
            isolate,
        }
    }

    /// Emits a face for every solid voxel side that borders air.
    pub fn build(&self, chunk: &DataChunk) -> ChunkMesh {
        let mut mesh = ChunkMesh::new();
        if chunk.is_empty() {
            return mesh;
        }

        let start = Instant::now();
        for z in 0..DIMENSION {
            for y in 0..DIMENSION {
                for x in 0..DIMENSION {
                    let block_type = chunk.get_local(x, y, z);
                    if block_type.is_air() {
                        continue;
                    }
                    for side in BlockSide::all() {
                        self.emit_if_visible(&mut mesh, chunk, x, y, z, block_type, side);
                    }
                }
            }
        }
        log::trace!(
            "Meshed {} with {} faces in {:?}",
            chunk.pos(),
            mesh.face_count(),
            start.elapsed()
        );
        mesh
    }

    /// Re-evaluates only the faces on the chunk boundary facing `side`.
    pub fn rebuild_boundary(&self, mesh: &mut ChunkMesh, chunk: &DataChunk, side: BlockSide) {
        mesh.remove_boundary(side);
        if chunk.is_empty() {
            return;
        }

        let last = DIMENSION - 1;
        for a in 0..DIMENSION {
            for b in 0..DIMENSION {
                let (x, y, z) = match side {
                    BlockSide::RIGHT => (last, a, b),
                    BlockSide::LEFT => (0, a, b),
                    BlockSide::TOP => (a, last, b),
                    BlockSide::BOTTOM => (a, 0, b),
                    BlockSide::FRONT => (a, b, last),
                    BlockSide::BACK => (a, b, 0),
                };
                let block_type = chunk.get_local(x, y, z);
                if !block_type.is_air() {
                    self.emit_if_visible(mesh, chunk, x, y, z, block_type, side);
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_if_visible(
        &self,
        mesh: &mut ChunkMesh,
        chunk: &DataChunk,
        x: usize,
        y: usize,
        z: usize,
        block_type: BlockType,
        side: BlockSide,
    ) {
        if self.neighbor(chunk, x, y, z, side).is_solid() {
            return;
        }
        mesh.push(Face::new(
            x,
            y,
            z,
            block_type,
            side,
            self.atlas.lookup_face(block_type, side),
            self.atlas.lookup_tint(block_type, side),
        ));
    }

    fn neighbor(&self, chunk: &DataChunk, x: usize, y: usize, z: usize, side: BlockSide) -> BlockType {
        let position = Point3::new(x as u8, y as u8, z as u8);
        if !on_boundary_layer(position, side) {
            let [dx, dy, dz] = side.offset();
            return chunk.get_local(
                (x as i32 + dx) as usize,
                (y as i32 + dy) as usize,
                (z as i32 + dz) as usize,
            );
        }
        if self.isolate {
            return BlockType::AIR;
        }
        let pos = BlockPos::new(chunk.pos(), x as i32, y as i32, z as i32).neighbor(side);
        self.neighbors.block_at(pos)
    }
}
