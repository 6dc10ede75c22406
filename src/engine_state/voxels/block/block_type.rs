//! # Block Type Module
//!
//! This module defines the different types of blocks that terrain generation can
//! produce, and the conversion between the compact stored id and the enum.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// The discriminant is the id stored in a chunk's voxel grid. `AIR` must stay `0` so
/// that a zeroed grid reads as empty.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Empty space. Never counted towards a chunk's density.
    AIR = 0,

    /// Generic solid filler with no atlas variants of its own.
    SOLID = 1,

    /// Bulk terrain below the surface height.
    STONE = 2,

    /// Single-voxel cover layer above the dirt.
    GRASS = 3,

    /// The layer between stone and grass.
    DIRT = 4,

    /// Ore pocket inside stone.
    COAL = 5,

    LOG = 6,

    LEAVES = 7,
}

impl BlockType {
    /// Converts a stored id back to a `BlockType`.
    ///
    /// # Arguments
    /// * `btype` - The block type as a `BlockTypeSize`
    ///
    /// # Returns
    /// The corresponding `BlockType`, or `BlockType::AIR` for an unknown id.
    pub fn get_block_type_from_int(btype: BlockTypeSize) -> Self {
        num::FromPrimitive::from_u8(btype).unwrap_or(BlockType::AIR)
    }

    pub fn is_air(self) -> bool {
        self == BlockType::AIR
    }

    /// Whether this block hides the faces of its neighbours.
    pub fn is_solid(self) -> bool {
        !self.is_air()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip() {
        for block_type in [
            BlockType::AIR,
            BlockType::SOLID,
            BlockType::STONE,
            BlockType::GRASS,
            BlockType::DIRT,
            BlockType::COAL,
            BlockType::LOG,
            BlockType::LEAVES,
        ] {
            assert_eq!(
                BlockType::get_block_type_from_int(block_type as BlockTypeSize),
                block_type
            );
        }
    }

    #[test]
    fn test_unknown_id_is_air() {
        assert_eq!(BlockType::get_block_type_from_int(200), BlockType::AIR);
    }
}
