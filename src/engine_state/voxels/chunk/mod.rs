//! # Chunk Module
//!
//! This module provides the `DataChunk` struct, a 16x16x16 grid of voxel data bound to
//! the column it sits in, and the terrain generator that fills it.
//!
//! ## Memory Optimization
//!
//! A chunk stores one compact `Block` per voxel, or nothing at all when it holds no
//! solid voxels. A density counter tracks the number of non-air voxels; whenever it
//! reaches zero the grid is freed, so chunks high in the sky or deep in a cave cost only
//! their header.
//!
//! ## Lifecycle
//!
//! `Unpopulated -> Generating -> Populated`. Generation is one-shot: once a chunk is
//! populated, `generate_blocks` does nothing.

use std::sync::Arc;

use crate::error::ChunkError;

use super::{
    block::{block_type::BlockType, Block},
    column::DataColumn,
    position::{BlockPos, ChunkPos},
};
use generation::TerrainGenerator;

pub mod generation;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    /// Shell bound to a column, no voxel data yet.
    Unpopulated,
    /// Handed to the worker.
    Generating,
    /// Voxel data is authoritative.
    Populated,
}

/// A 16x16x16 collection of voxel blocks.
#[derive(Debug, Clone)]
pub struct DataChunk {
    pos: ChunkPos,
    column: Arc<DataColumn>,
    /// `None` whenever `density` is zero.
    blocks: Option<Box<[Block]>>,
    density: u32,
    state: ChunkState,
}

#[inline]
fn block_index(x: usize, y: usize, z: usize) -> usize {
    x + CHUNK_DIMENSION as usize * y + CHUNK_PLANE_SIZE as usize * z
}

fn empty_grid() -> Box<[Block]> {
    vec![Block::AIR; CHUNK_SIZE as usize].into_boxed_slice()
}

impl DataChunk {
    /// Creates an unpopulated chunk shell.
    ///
    /// # Arguments
    /// * `pos` - The chunk coordinates
    /// * `column` - The column this chunk's footprint belongs to
    pub fn new(pos: ChunkPos, column: Arc<DataColumn>) -> Self {
        debug_assert_eq!(pos.column(), column.pos());
        DataChunk {
            pos,
            column,
            blocks: None,
            density: 0,
            state: ChunkState::Unpopulated,
        }
    }

    pub fn pos(&self) -> ChunkPos {
        self.pos
    }

    pub fn column(&self) -> &Arc<DataColumn> {
        &self.column
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    /// Number of non-air voxels.
    pub fn density(&self) -> u32 {
        self.density
    }

    pub fn is_populated(&self) -> bool {
        self.state == ChunkState::Populated
    }

    /// `true` when the chunk holds no solid voxels, which skips meshing entirely.
    pub fn is_empty(&self) -> bool {
        self.density == 0
    }

    /// Raw voxel grid, indexed `x + D*y + D²*z`. `None` for an empty chunk.
    pub fn blocks(&self) -> Option<&[Block]> {
        self.blocks.as_deref()
    }

    pub fn mark_generating(&mut self) {
        if self.state == ChunkState::Unpopulated {
            self.state = ChunkState::Generating;
        }
    }

    /// Drops any voxel data and returns the chunk to `Unpopulated` so it can be retried.
    pub fn reset(&mut self) {
        self.blocks = None;
        self.density = 0;
        self.state = ChunkState::Unpopulated;
    }

    /// Fills the voxel grid from the terrain generator. Does nothing once populated.
    pub fn generate_blocks(&mut self, generator: &TerrainGenerator) {
        if self.is_populated() {
            return;
        }

        let origin = self.pos.world_origin();
        let mut grid = empty_grid();
        let mut density = 0;

        for z in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                let surface = self.column.surface_local(x, z);
                for y in 0..CHUNK_DIMENSION {
                    let block_type = generator.generate_block(
                        origin.x + x,
                        origin.y + y,
                        origin.z + z,
                        surface,
                    );
                    if block_type.is_air() {
                        continue;
                    }
                    grid[block_index(x as usize, y as usize, z as usize)] = Block::new(block_type);
                    density += 1;
                }
            }
        }

        self.blocks = if density == 0 { None } else { Some(grid) };
        self.density = density;
        self.state = ChunkState::Populated;
    }

    /// Block type at a local coordinate. The caller guarantees each axis is in range.
    #[inline]
    pub fn get_local(&self, x: usize, y: usize, z: usize) -> BlockType {
        match &self.blocks {
            Some(grid) => grid[block_index(x, y, z)].block_type(),
            None => BlockType::AIR,
        }
    }

    /// Block type at `pos`. Positions belonging to another chunk read as air.
    pub fn get_block(&self, pos: BlockPos) -> BlockType {
        if pos.chunk_pos() != self.pos {
            return BlockType::AIR;
        }
        let (x, y, z) = pos.local();
        self.get_local(x, y, z)
    }

    /// Writes a solid block.
    ///
    /// # Errors
    /// `ChunkError::AirWrite` for `BlockType::AIR` (use [`Self::remove_block`]) and
    /// `ChunkError::ForeignPosition` when `pos` lies in a different chunk.
    pub fn set_block(&mut self, pos: BlockPos, block_type: BlockType) -> Result<(), ChunkError> {
        if block_type.is_air() {
            return Err(ChunkError::AirWrite(pos));
        }
        self.check_owned(pos)?;

        let (x, y, z) = pos.local();
        let grid = self.blocks.get_or_insert_with(empty_grid);
        let cell = &mut grid[block_index(x, y, z)];
        if cell.is_air() {
            self.density += 1;
        }
        *cell = Block::new(block_type);
        Ok(())
    }

    /// Clears a voxel to air, freeing the grid when the last solid voxel goes.
    pub fn remove_block(&mut self, pos: BlockPos) -> Result<(), ChunkError> {
        self.check_owned(pos)?;

        let Some(grid) = self.blocks.as_mut() else {
            return Ok(());
        };
        let (x, y, z) = pos.local();
        let cell = &mut grid[block_index(x, y, z)];
        if cell.is_air() {
            return Ok(());
        }
        *cell = Block::AIR;
        self.density -= 1;
        if self.density == 0 {
            self.blocks = None;
        }
        Ok(())
    }

    fn check_owned(&self, pos: BlockPos) -> Result<(), ChunkError> {
        if pos.chunk_pos() == self.pos {
            Ok(())
        } else {
            Err(ChunkError::ForeignPosition {
                pos,
                chunk: self.pos,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::TerrainConfig, engine_state::voxels::position::ColumnPos};

    fn plain_generator() -> TerrainGenerator {
        TerrainGenerator::new(
            0,
            TerrainConfig {
                cave_threshold: f64::MAX,
                ore_threshold: f64::MAX,
                ..TerrainConfig::default()
            },
        )
    }

    fn count_solid(chunk: &DataChunk) -> u32 {
        let mut count = 0;
        for x in 0..CHUNK_DIMENSION {
            for y in 0..CHUNK_DIMENSION {
                for z in 0..CHUNK_DIMENSION {
                    if !chunk.get_block(BlockPos::new(chunk.pos(), x, y, z)).is_air() {
                        count += 1;
                    }
                }
            }
        }
        count
    }

    #[test]
    fn test_fixed_surface_scenario() {
        let column = Arc::new(DataColumn::flat(ColumnPos::new(0, 0), 5));
        let mut chunk = DataChunk::new(ChunkPos::ZERO, column);
        chunk.generate_blocks(&plain_generator());

        let at = |y| chunk.get_block(BlockPos::new(ChunkPos::ZERO, 0, y, 0));
        assert_eq!(at(5), BlockType::STONE);
        for y in 6..=8 {
            assert_eq!(at(y), BlockType::DIRT);
        }
        assert_eq!(at(9), BlockType::GRASS);
        assert_eq!(at(10), BlockType::AIR);
        assert_eq!(chunk.density(), 10 * 16 * 16);
    }

    #[test]
    fn test_density_matches_enumerated_blocks() {
        let generator = TerrainGenerator::new(21, TerrainConfig::default());
        for pos in [ChunkPos::new(0, 0, 0), ChunkPos::new(-1, 0, 2), ChunkPos::new(3, -1, -3)] {
            let column = Arc::new(DataColumn::generate(pos.column(), &generator));
            let mut chunk = DataChunk::new(pos, column);
            chunk.generate_blocks(&generator);
            assert!(chunk.is_populated());
            assert_eq!(count_solid(&chunk), chunk.density());
            assert_eq!(chunk.is_empty(), chunk.blocks().is_none());
        }
    }

    #[test]
    fn test_sky_chunk_is_empty() {
        let column = Arc::new(DataColumn::flat(ColumnPos::new(0, 0), 5));
        let mut chunk = DataChunk::new(ChunkPos::new(0, 4, 0), column);
        chunk.generate_blocks(&plain_generator());
        assert!(chunk.is_empty());
        assert!(chunk.blocks().is_none());
        assert_eq!(count_solid(&chunk), 0);
    }

    #[test]
    fn test_generate_is_one_shot() {
        let column = Arc::new(DataColumn::flat(ColumnPos::new(0, 0), 5));
        let mut chunk = DataChunk::new(ChunkPos::ZERO, column);
        let generator = plain_generator();
        chunk.generate_blocks(&generator);
        let pos = BlockPos::new(ChunkPos::ZERO, 2, 2, 2);
        chunk.remove_block(pos).unwrap();
        chunk.generate_blocks(&generator);
        assert_eq!(chunk.get_block(pos), BlockType::AIR);
    }

    #[test]
    fn test_set_and_remove_track_density() {
        let column = Arc::new(DataColumn::flat(ColumnPos::new(0, 0), -100));
        let mut chunk = DataChunk::new(ChunkPos::ZERO, column);
        chunk.generate_blocks(&plain_generator());
        assert!(chunk.is_empty());

        let pos = BlockPos::new(ChunkPos::ZERO, 1, 2, 3);
        chunk.set_block(pos, BlockType::LOG).unwrap();
        chunk.set_block(pos, BlockType::LEAVES).unwrap();
        assert_eq!(chunk.density(), 1);
        assert_eq!(chunk.get_block(pos), BlockType::LEAVES);

        chunk.remove_block(pos).unwrap();
        assert_eq!(chunk.density(), 0);
        assert!(chunk.blocks().is_none());
        chunk.remove_block(pos).unwrap();
        assert_eq!(chunk.density(), 0);
    }

    #[test]
    fn test_rejects_air_and_foreign_writes() {
        let column = Arc::new(DataColumn::flat(ColumnPos::new(0, 0), 0));
        let mut chunk = DataChunk::new(ChunkPos::ZERO, column);
        let pos = BlockPos::new(ChunkPos::ZERO, 0, 0, 0);
        assert_eq!(
            chunk.set_block(pos, BlockType::AIR),
            Err(ChunkError::AirWrite(pos))
        );

        let foreign = BlockPos::new(ChunkPos::new(1, 0, 0), 0, 0, 0);
        assert!(matches!(
            chunk.set_block(foreign, BlockType::STONE),
            Err(ChunkError::ForeignPosition { .. })
        ));
        assert!(chunk.remove_block(foreign).is_err());
        assert_eq!(chunk.get_block(foreign), BlockType::AIR);
    }

    #[test]
    fn test_reset_returns_to_unpopulated() {
        let column = Arc::new(DataColumn::flat(ColumnPos::new(0, 0), 5));
        let mut chunk = DataChunk::new(ChunkPos::ZERO, column);
        chunk.mark_generating();
        assert_eq!(chunk.state(), ChunkState::Generating);
        chunk.generate_blocks(&plain_generator());
        chunk.reset();
        assert_eq!(chunk.state(), ChunkState::Unpopulated);
        assert!(chunk.is_empty());
    }
}
