use cgmath::Point3;

use crate::engine_state::{
    rendering::atlas::AtlasCell,
    voxels::{
        block::{block_side::BlockSide, block_type::BlockType},
        chunk::CHUNK_DIMENSION,
    },
};

/// Represents a single visible quad face of a voxel.
///
/// A face remembers the local voxel it belongs to so a boundary slab can be dropped and
/// re-evaluated without rebuilding the rest of the chunk's mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Local voxel coordinate in chunk space
    pub position: Point3<u8>,
    /// Which side of the block this face represents
    pub block_side: BlockSide,
    pub block_type: BlockType,
    /// Atlas cell chosen when the face was emitted
    pub cell: AtlasCell,
    pub tint: [f32; 4],
}

impl Face {
    /// Creates a new face for a voxel at the given coordinates.
    ///
    /// # Arguments
    /// * `i`, `j`, `k` - The coordinates of the voxel in chunk space
    /// * `block_type` - The type of the block, used for texture mapping
    /// * `block_side` - Which side of the block this face represents
    /// * `cell`, `tint` - Atlas lookups for this face
    pub fn new(
        i: usize,
        j: usize,
        k: usize,
        block_type: BlockType,
        block_side: BlockSide,
        cell: AtlasCell,
        tint: [f32; 4],
    ) -> Self {
        Face {
            position: Point3::new(i as u8, j as u8, k as u8),
            block_side,
            block_type,
            cell,
            tint,
        }
    }

    /// The four corners, counter-clockwise when seen from outside the block.
    ///
    /// Triangles are `(0, 1, 2)` and `(0, 2, 3)`.
    pub fn corners(&self) -> [Point3<f32>; 4] {
        let x = self.position.x as f32;
        let y = self.position.y as f32;
        let z = self.position.z as f32;
        let p = Point3::new;
        match self.block_side {
            BlockSide::TOP => [
                p(x, y + 1.0, z),
                p(x, y + 1.0, z + 1.0),
                p(x + 1.0, y + 1.0, z + 1.0),
                p(x + 1.0, y + 1.0, z),
            ],
            BlockSide::BOTTOM => [
                p(x, y, z),
                p(x + 1.0, y, z),
                p(x + 1.0, y, z + 1.0),
                p(x, y, z + 1.0),
            ],
            BlockSide::RIGHT => [
                p(x + 1.0, y, z),
                p(x + 1.0, y + 1.0, z),
                p(x + 1.0, y + 1.0, z + 1.0),
                p(x + 1.0, y, z + 1.0),
            ],
            BlockSide::LEFT => [
                p(x, y, z + 1.0),
                p(x, y + 1.0, z + 1.0),
                p(x, y + 1.0, z),
                p(x, y, z),
            ],
            BlockSide::FRONT => [
                p(x + 1.0, y, z + 1.0),
                p(x + 1.0, y + 1.0, z + 1.0),
                p(x, y + 1.0, z + 1.0),
                p(x, y, z + 1.0),
            ],
            BlockSide::BACK => [
                p(x, y, z),
                p(x, y + 1.0, z),
                p(x + 1.0, y + 1.0, z),
                p(x + 1.0, y, z),
            ],
        }
    }

    /// UVs matching [`Self::corners`], spanning one atlas cell.
    pub fn uvs(&self, unit: f32) -> [[f32; 2]; 4] {
        let [u, v] = self.cell.uv_origin(unit);
        [[u + unit, v], [u + unit, v + unit], [u, v + unit], [u, v]]
    }

    /// Whether this face sits on the chunk boundary facing `side`, i.e. whether its
    /// visibility depends on the neighbour chunk across that side.
    pub fn faces_boundary(&self, side: BlockSide) -> bool {
        self.block_side == side && on_boundary_layer(self.position, side)
    }
}

/// Whether a local voxel lies in the outermost layer of the chunk towards `side`.
pub fn on_boundary_layer(position: Point3<u8>, side: BlockSide) -> bool {
    let last = (CHUNK_DIMENSION - 1) as u8;
    match side {
        BlockSide::FRONT => position.z == last,
        BlockSide::BACK => position.z == 0,
        BlockSide::TOP => position.y == last,
        BlockSide::BOTTOM => position.y == 0,
        BlockSide::RIGHT => position.x == last,
        BlockSide::LEFT => position.x == 0,
    }
}
