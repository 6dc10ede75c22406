//! # Block Module
//!
//! This module provides the block-related types of the voxel world: block type
//! definitions, block faces, and the compact cell stored in a chunk's voxel grid.

use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// A single voxel cell as stored in a chunk.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute and `Pod` derive let a whole voxel grid be viewed as a
/// plain byte slice. A zeroed cell is air.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq, Eq, Default)]
pub struct Block {
    /// The type of this block, encoded as a `BlockTypeSize` for compact storage.
    pub block_type: BlockTypeSize,
}

impl Block {
    pub const AIR: Block = Block { block_type: 0 };

    /// Creates a new block of the specified type.
    ///
    /// # Arguments
    /// * `block_type` - The type of block to create
    ///
    /// # Returns
    /// A new `Block` instance with the specified type.
    pub fn new(block_type: BlockType) -> Self {
        Block {
            block_type: block_type as BlockTypeSize,
        }
    }

    pub fn block_type(&self) -> BlockType {
        BlockType::get_block_type_from_int(self.block_type)
    }

    pub fn is_air(&self) -> bool {
        self.block_type == BlockType::AIR as BlockTypeSize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_block_is_air() {
        let block: Block = bytemuck::Zeroable::zeroed();
        assert!(block.is_air());
        assert_eq!(block, Block::AIR);
        assert_eq!(Block::new(BlockType::COAL).block_type(), BlockType::COAL);
    }
}
