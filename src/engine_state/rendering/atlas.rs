//! # Texture Atlas
//!
//! Maps a `(block type, face)` pair to a cell of the texture atlas and a per-vertex tint.
//! Most block types have several interchangeable cells; a lookup picks one at random so
//! large flat areas do not tile visibly.
//!
//! The atlas is a square grid of `1 / unit` cells per axis. Cell `(x, y)` spans
//! `[x * unit, (x + 1) * unit]` horizontally and likewise vertically.

use std::cell::RefCell;

use phf::phf_map;

use crate::{
    config::WorldConfig,
    engine_state::voxels::block::{block_side::BlockSide, block_type::BlockType},
};

/// Biome grass colours as 8-bit RGB.
pub static BIOME_TINTS: phf::Map<&'static str, [u8; 3]> = phf_map! {
    "Tropical_1" => [67, 146, 42],
    "Tropical_2" => [51, 112, 32],
    "Tropical_3" => [44, 95, 27],
    "Tropical_4" => [31, 69, 20],
    "Normal_1" => [82, 149, 47],
    "Normal_2" => [64, 116, 37],
    "Normal_3" => [58, 106, 34],
    "Normal_4" => [53, 97, 31],
    "Temperate_1" => [85, 138, 65],
    "Temperate_2" => [77, 126, 60],
    "Temperate_3" => [62, 102, 48],
    "Temperate_4" => [56, 90, 43],
    "Chaparral_1" => [106, 143, 63],
    "Chaparral_2" => [85, 114, 50],
    "Chaparral_3" => [68, 92, 40],
    "Chaparral_4" => [56, 76, 34],
    "Savanna_1" => [123, 121, 60],
    "Savanna_2" => [104, 103, 51],
    "Savanna_3" => [94, 93, 46],
    "Savanna_4" => [74, 73, 36],
    "Tundra_1" => [110, 141, 86],
    "Tundra_2" => [94, 121, 73],
    "Tundra_3" => [78, 100, 61],
    "Tundra_4" => [58, 74, 45],
};

/// Brightening applied to biome tints so they survive the shader's multiply.
const TINT_MULTIPLIER: f32 = 2.0;

pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

const STONE_CELLS: &[AtlasCell] = &[
    AtlasCell::new(0, 0),
    AtlasCell::new(0, 1),
    AtlasCell::new(0, 2),
    AtlasCell::new(0, 3),
];
const DIRT_CELLS: &[AtlasCell] = &[
    AtlasCell::new(1, 0),
    AtlasCell::new(1, 1),
    AtlasCell::new(1, 2),
    AtlasCell::new(1, 3),
];
const GRASS_TOP_CELLS: &[AtlasCell] = &[
    AtlasCell::new(2, 0),
    AtlasCell::new(2, 1),
    AtlasCell::new(2, 2),
];
const GRASS_SIDE_CELLS: &[AtlasCell] = &[AtlasCell::new(2, 3)];
const COAL_CELLS: &[AtlasCell] = &[
    AtlasCell::new(3, 0),
    AtlasCell::new(3, 1),
    AtlasCell::new(3, 2),
];
const LOG_CELLS: &[AtlasCell] = &[AtlasCell::new(4, 0), AtlasCell::new(4, 1)];
const LEAVES_CELLS: &[AtlasCell] = &[AtlasCell::new(3, 3), AtlasCell::new(4, 3)];
const FALLBACK_CELLS: &[AtlasCell] = &[AtlasCell::new(0, 0)];

/// Grid coordinate of one atlas cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AtlasCell {
    pub x: u32,
    pub y: u32,
}

impl AtlasCell {
    pub const fn new(x: u32, y: u32) -> Self {
        AtlasCell { x, y }
    }

    /// UV coordinate of the cell's lower-left corner.
    pub fn uv_origin(&self, unit: f32) -> [f32; 2] {
        [self.x as f32 * unit, self.y as f32 * unit]
    }
}

/// Texture and colour lookups used by the mesh builder.
pub trait TextureAtlas {
    /// Size of one cell in UV space.
    fn unit(&self) -> f32;

    fn lookup_face(&self, block_type: BlockType, side: BlockSide) -> AtlasCell;

    /// RGBA colour multiplier applied to every vertex of the face.
    fn lookup_tint(&self, block_type: BlockType, side: BlockSide) -> [f32; 4];
}

/// RGBA tint for a named biome, brightened for grass tops.
pub fn biome_tint(name: &str) -> Option<[f32; 4]> {
    BIOME_TINTS.get(name).map(|[r, g, b]| {
        [
            *r as f32 / 255.0 * TINT_MULTIPLIER,
            *g as f32 / 255.0 * TINT_MULTIPLIER,
            *b as f32 / 255.0 * TINT_MULTIPLIER,
            1.0,
        ]
    })
}

/// The default block atlas.
pub struct Atlas {
    unit: f32,
    grass_tint: [f32; 4],
    rng: RefCell<fastrand::Rng>,
}

impl Atlas {
    pub fn new(unit: f32, grass_tint: [f32; 4]) -> Self {
        Atlas {
            unit,
            grass_tint,
            rng: RefCell::new(fastrand::Rng::new()),
        }
    }

    /// An atlas whose variant choices repeat for the same seed.
    pub fn with_seed(unit: f32, grass_tint: [f32; 4], seed: u64) -> Self {
        Atlas {
            unit,
            grass_tint,
            rng: RefCell::new(fastrand::Rng::with_seed(seed)),
        }
    }

    pub fn from_config(config: &WorldConfig) -> Self {
        let grass_tint = biome_tint(&config.grass_biome).unwrap_or_else(|| {
            log::warn!("Unknown biome tint '{}', using white", config.grass_biome);
            WHITE
        });
        Self::with_seed(config.atlas_unit, grass_tint, config.seed as u64)
    }

    /// Every cell a `(block type, face)` lookup may return.
    pub fn variants(block_type: BlockType, side: BlockSide) -> &'static [AtlasCell] {
        match block_type {
            BlockType::STONE => STONE_CELLS,
            BlockType::DIRT => DIRT_CELLS,
            BlockType::GRASS => match side {
                BlockSide::TOP => GRASS_TOP_CELLS,
                BlockSide::BOTTOM => DIRT_CELLS,
                _ => GRASS_SIDE_CELLS,
            },
            BlockType::COAL => COAL_CELLS,
            BlockType::LOG => LOG_CELLS,
            BlockType::LEAVES => LEAVES_CELLS,
            BlockType::AIR | BlockType::SOLID => FALLBACK_CELLS,
        }
    }
}

impl TextureAtlas for Atlas {
    fn unit(&self) -> f32 {
        self.unit
    }

    fn lookup_face(&self, block_type: BlockType, side: BlockSide) -> AtlasCell {
        let cells = Self::variants(block_type, side);
        if cells.len() == 1 {
            return cells[0];
        }
        cells[self.rng.borrow_mut().usize(..cells.len())]
    }

    fn lookup_tint(&self, block_type: BlockType, side: BlockSide) -> [f32; 4] {
        if block_type == BlockType::GRASS && side == BlockSide::TOP {
            self.grass_tint
        } else {
            WHITE
        }
    }
}
