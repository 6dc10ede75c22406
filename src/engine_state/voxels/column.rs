//! # Column Store
//!
//! Every chunk stacked on the same `(x, z)` footprint shares one [`DataColumn`], so the
//! multi-band surface noise is evaluated once per footprint instead of once per chunk.
//! Columns are immutable after construction and handed out as `Arc`s, which lets a
//! generation request carry its column to the worker thread without copying it.

use std::{collections::HashMap, sync::Arc};

use super::{
    chunk::{generation::TerrainGenerator, CHUNK_DIMENSION},
    position::ColumnPos,
};

const DIMENSION: usize = CHUNK_DIMENSION as usize;

/// Cached stone surface heights for one column footprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataColumn {
    pos: ColumnPos,
    /// Indexed `[local_x][local_z]`.
    surface: [[i32; DIMENSION]; DIMENSION],
}

impl DataColumn {
    /// Samples the surface height for every voxel column in the footprint.
    pub fn generate(pos: ColumnPos, generator: &TerrainGenerator) -> Self {
        let (origin_x, origin_z) = pos.world_origin();
        let mut surface = [[0; DIMENSION]; DIMENSION];
        for (lx, row) in surface.iter_mut().enumerate() {
            for (lz, height) in row.iter_mut().enumerate() {
                *height = generator.surface_height(origin_x + lx as i32, origin_z + lz as i32);
            }
        }
        DataColumn { pos, surface }
    }

    /// A column with precomputed heights. Useful for tools and fixed test terrain.
    pub fn from_surface(pos: ColumnPos, surface: [[i32; DIMENSION]; DIMENSION]) -> Self {
        DataColumn { pos, surface }
    }

    /// A column whose surface is the same height everywhere.
    pub fn flat(pos: ColumnPos, height: i32) -> Self {
        Self::from_surface(pos, [[height; DIMENSION]; DIMENSION])
    }

    pub fn pos(&self) -> ColumnPos {
        self.pos
    }

    /// Surface height at a local coordinate, or `0` outside `[0, CHUNK_DIMENSION)`.
    pub fn surface_local(&self, lx: i32, lz: i32) -> i32 {
        if (0..CHUNK_DIMENSION).contains(&lx) && (0..CHUNK_DIMENSION).contains(&lz) {
            self.surface[lx as usize][lz as usize]
        } else {
            0
        }
    }

    /// Surface height at a world coordinate, or `0` outside this column's footprint.
    pub fn surface_at_world(&self, wx: i32, wz: i32) -> i32 {
        let (origin_x, origin_z) = self.pos.world_origin();
        self.surface_local(wx - origin_x, wz - origin_z)
    }
}

/// Lazily built map of every column touched so far.
#[derive(Default)]
pub struct ColumnStore {
    columns: HashMap<ColumnPos, Arc<DataColumn>>,
}

impl ColumnStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the column at `pos`, generating it on first touch.
    pub fn get_or_create(&mut self, pos: ColumnPos, generator: &TerrainGenerator) -> Arc<DataColumn> {
        self.columns
            .entry(pos)
            .or_insert_with(|| {
                log::trace!("Generating {}", pos);
                Arc::new(DataColumn::generate(pos, generator))
            })
            .clone()
    }

    pub fn get(&self, pos: ColumnPos) -> Option<Arc<DataColumn>> {
        self.columns.get(&pos).cloned()
    }

    pub fn contains(&self, pos: ColumnPos) -> bool {
        self.columns.contains_key(&pos)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
