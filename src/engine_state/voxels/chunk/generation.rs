//! # Terrain Generation
//!
//! The block generator: a pure function from absolute voxel coordinates (plus the
//! owning column's cached surface height) to a block type. Every thread that holds a
//! `TerrainGenerator` computes the same answer for the same voxel, which is what lets
//! the mesh builder recompute voxels of chunks that are not loaded yet.

use crate::{
    config::{TerrainConfig, WorldConfig},
    engine_state::voxels::{
        block::block_type::BlockType, column::DataColumn, noise_engine::NoiseEngine,
        position::BlockPos,
    },
};

/// Vertical stretch applied to the first cave band so caverns run wider than tall.
const CAVE_VERTICAL_STRETCH: f64 = 2.0;

/// Plane offset for the stone detail band so it does not mirror the base band.
const STONE_DETAIL_PLANE: f64 = 300.0;

/// Immutable terrain generator shared between the main thread and the worker.
#[derive(Clone)]
pub struct TerrainGenerator {
    noise: NoiseEngine,
    terrain: TerrainConfig,
}

impl TerrainGenerator {
    pub fn new(seed: u32, terrain: TerrainConfig) -> Self {
        TerrainGenerator {
            noise: NoiseEngine::new(seed),
            terrain,
        }
    }

    pub fn from_config(config: &WorldConfig) -> Self {
        Self::new(config.seed, config.terrain.clone())
    }

    pub fn noise(&self) -> &NoiseEngine {
        &self.noise
    }

    pub fn terrain(&self) -> &TerrainConfig {
        &self.terrain
    }

    /// Height of the topmost stone voxel at world column `(wx, wz)`.
    ///
    /// Layers a base band and a detail band, compresses anything above the plateau
    /// threshold, then digs craters wherever the crater band rises above its clamp
    /// floor.
    pub fn surface_height(&self, wx: i32, wz: i32) -> i32 {
        let t = &self.terrain;
        let (x, z) = (wx as f64, wz as f64);

        let mut stone = t.base_height
            + self.noise.sample_band(x, 0.0, z, &t.stone_base)
            + self.noise.sample_band(x, STONE_DETAIL_PLANE, z, &t.stone_detail);

        if stone > t.plateau_threshold {
            stone = t.plateau_threshold + (stone - t.plateau_threshold) * t.plateau_flattening;
        }

        let [crater_min, crater_max] = t.crater_clamp;
        if crater_max > crater_min {
            let crater = self
                .noise
                .sample_band(x, 0.0, z, &t.crater)
                .clamp(crater_min, crater_max);
            stone -= (crater - crater_min) / (crater_max - crater_min) * t.crater_depth;
        }

        stone.floor() as i32
    }

    /// Summed cave bands at a voxel. Above `cave_threshold` the voxel is hollowed out.
    pub fn cave_score(&self, wx: i32, wy: i32, wz: i32) -> f64 {
        let (x, y, z) = (wx as f64, wy as f64, wz as f64);
        let [first, second, third] = &self.terrain.cave_bands;
        self.noise.sample_band(x, y * CAVE_VERTICAL_STRETCH, z, first)
            + self.noise.sample_band(x, y, z, second)
            + self.noise.sample_band(x, y, z, third)
    }

    pub fn ore_score(&self, wx: i32, wy: i32, wz: i32) -> f64 {
        self.noise
            .sample_band(wx as f64, wy as f64, wz as f64, &self.terrain.ore)
    }

    /// Block type at absolute voxel `(wx, wy, wz)` given the stone surface height there.
    ///
    /// # Arguments
    /// * `surface` - Height of the topmost stone voxel for this `(wx, wz)`
    ///
    /// # Returns
    /// Stone, coal or cave air at or below the surface, then `dirt_depth` voxels of
    /// dirt, a single grass voxel, and air above.
    pub fn generate_block(&self, wx: i32, wy: i32, wz: i32, surface: i32) -> BlockType {
        let dirt_top = surface + self.terrain.dirt_depth;

        if wy <= surface {
            if self.cave_score(wx, wy, wz) > self.terrain.cave_threshold {
                BlockType::AIR
            } else if self.ore_score(wx, wy, wz) > self.terrain.ore_threshold {
                BlockType::COAL
            } else {
                BlockType::STONE
            }
        } else if wy <= dirt_top {
            BlockType::DIRT
        } else if wy == dirt_top + 1 {
            BlockType::GRASS
        } else {
            BlockType::AIR
        }
    }

    /// Block type at `pos`, reading the surface height from `column` when the position
    /// lies in its footprint and computing it from noise otherwise.
    pub fn generate_block_at(&self, pos: BlockPos, column: &DataColumn) -> BlockType {
        let (wx, wz) = (pos.world_x(), pos.world_z());
        let surface = if pos.chunk_pos().column() == column.pos() {
            column.surface_at_world(wx, wz)
        } else {
            self.surface_height(wx, wz)
        };
        self.generate_block(wx, pos.world_y(), wz, surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::position::ColumnPos;

    /// Terrain whose cave and ore bands can never trigger.
    fn plain_terrain() -> TerrainConfig {
        TerrainConfig {
            cave_threshold: f64::MAX,
            ore_threshold: f64::MAX,
            ..TerrainConfig::default()
        }
    }

    #[test]
    fn test_layers_above_fixed_surface() {
        let generator = TerrainGenerator::new(0, plain_terrain());
        for y in -4..=5 {
            assert_eq!(generator.generate_block(0, y, 0, 5), BlockType::STONE);
        }
        for y in 6..=8 {
            assert_eq!(generator.generate_block(0, y, 0, 5), BlockType::DIRT);
        }
        assert_eq!(generator.generate_block(0, 9, 0, 5), BlockType::GRASS);
        assert_eq!(generator.generate_block(0, 10, 0, 5), BlockType::AIR);
        assert_eq!(generator.generate_block(0, 40, 0, 5), BlockType::AIR);
    }

    #[test]
    fn test_zero_cave_threshold_hollows_stone() {
        let terrain = TerrainConfig {
            cave_threshold: -1.0,
            ..TerrainConfig::default()
        };
        let generator = TerrainGenerator::new(0, terrain);
        for y in 0..=5 {
            assert_eq!(generator.generate_block(3, y, 7, 5), BlockType::AIR);
        }
        assert_eq!(generator.generate_block(3, 6, 7, 5), BlockType::DIRT);
    }

    #[test]
    fn test_negative_ore_threshold_fills_with_coal() {
        let terrain = TerrainConfig {
            cave_threshold: f64::MAX,
            ore_threshold: -1.0,
            ..TerrainConfig::default()
        };
        let generator = TerrainGenerator::new(0, terrain);
        assert_eq!(generator.generate_block(1, 2, 3, 5), BlockType::COAL);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = TerrainGenerator::new(17, TerrainConfig::default());
        let b = TerrainGenerator::new(17, TerrainConfig::default());
        for x in -20..20 {
            for z in [-9, 0, 13] {
                let surface = a.surface_height(x, z);
                assert_eq!(surface, b.surface_height(x, z));
                for y in (surface - 6)..(surface + 6) {
                    assert_eq!(
                        a.generate_block(x, y, z, surface),
                        b.generate_block(x, y, z, surface)
                    );
                }
            }
        }
    }

    #[test]
    fn test_block_at_reads_column_only_inside_its_footprint() {
        let generator = TerrainGenerator::new(12, TerrainConfig::default());
        let column = DataColumn::flat(ColumnPos::new(0, 0), -50);
        for wx in -20..40 {
            for wy in [-60, -45, -20, 0, 8, 30] {
                let pos = BlockPos::from_world(wx, wy, 5);
                let surface = if (0..16).contains(&wx) {
                    -50
                } else {
                    generator.surface_height(wx, 5)
                };
                assert_eq!(
                    generator.generate_block_at(pos, &column),
                    generator.generate_block(wx, wy, 5, surface),
                    "at {}",
                    pos
                );
            }
        }
        // The column's own surface wins inside the footprint.
        assert_eq!(
            generator.generate_block_at(BlockPos::from_world(3, -20, 5), &column),
            BlockType::AIR
        );
    }

    #[test]
    fn test_plateau_flattening_caps_growth() {
        let flat = TerrainConfig {
            base_height: 40.0,
            plateau_threshold: 15.0,
            plateau_flattening: 0.0,
            crater_depth: 0.0,
            ..TerrainConfig::default()
        };
        let generator = TerrainGenerator::new(3, flat);
        for x in -10..10 {
            assert_eq!(generator.surface_height(x, x * 2), 15);
        }
    }
}
