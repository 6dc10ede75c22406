//! # Spatial Addressing
//!
//! Value types for the three coordinate spaces of the world:
//!
//! * [`ColumnPos`] - a vertical stack of chunks sharing one `(x, z)` footprint
//! * [`ChunkPos`] - one cubic chunk, in chunk units
//! * [`BlockPos`] - one voxel, stored as its owning chunk plus a local coordinate
//!
//! A `BlockPos` always keeps its local coordinate inside `[0, CHUNK_DIMENSION)`. Any
//! construction or arithmetic that leaves that range is folded back by floor division
//! into the chunk and a Euclidean remainder into the local part, so negative world
//! coordinates address the right chunk.
//!
//! Conversions between the spaces are explicit named methods (`column()`,
//! `chunk_pos()`, `world()`), never `From` impls.

use std::{
    fmt,
    ops::{Add, Sub},
};

use cgmath::Point3;

use super::{block::block_side::BlockSide, chunk::CHUNK_DIMENSION};

/// Grid coordinate of a terrain column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColumnPos {
    pub x: i32,
    pub z: i32,
}

impl ColumnPos {
    pub const fn new(x: i32, z: i32) -> Self {
        ColumnPos { x, z }
    }

    /// World-space `(x, z)` of the column's lowest corner.
    pub fn world_origin(&self) -> (i32, i32) {
        (self.x * CHUNK_DIMENSION, self.z * CHUNK_DIMENSION)
    }
}

impl fmt::Display for ColumnPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Column: ({}, {})", self.x, self.z)
    }
}

/// Grid coordinate of a cubic chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChunkPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const ZERO: ChunkPos = ChunkPos::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        ChunkPos { x, y, z }
    }

    /// Chunk containing a world-space point.
    pub fn from_world_position(position: Point3<f32>) -> Self {
        let dimension = CHUNK_DIMENSION as f32;
        ChunkPos::new(
            (position.x / dimension).floor() as i32,
            (position.y / dimension).floor() as i32,
            (position.z / dimension).floor() as i32,
        )
    }

    /// The column this chunk belongs to (drops `y`).
    pub fn column(&self) -> ColumnPos {
        ColumnPos::new(self.x, self.z)
    }

    /// Chebyshev distance in chunk units.
    pub fn cube_distance(&self, other: &ChunkPos) -> i32 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.z - other.z).abs())
    }

    /// Euclidean distance in chunk units.
    pub fn distance(&self, other: &ChunkPos) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        let dz = (self.z - other.z) as f32;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// World-space voxel coordinate of the chunk's lowest corner.
    pub fn world_origin(&self) -> Point3<i32> {
        Point3::new(
            self.x * CHUNK_DIMENSION,
            self.y * CHUNK_DIMENSION,
            self.z * CHUNK_DIMENSION,
        )
    }

    /// The adjacent chunk across the given face.
    pub fn neighbor(&self, side: BlockSide) -> ChunkPos {
        let [dx, dy, dz] = side.offset();
        ChunkPos::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

impl Add for ChunkPos {
    type Output = ChunkPos;

    fn add(self, rhs: ChunkPos) -> ChunkPos {
        ChunkPos::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for ChunkPos {
    type Output = ChunkPos;

    fn sub(self, rhs: ChunkPos) -> ChunkPos {
        ChunkPos::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chunk: ({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A voxel address: owning chunk plus a local coordinate in `[0, CHUNK_DIMENSION)`.
///
/// Fields are private so the local range invariant cannot be broken from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockPos {
    chunk: ChunkPos,
    x: i32,
    y: i32,
    z: i32,
}

impl BlockPos {
    /// Builds a block position, shifting `chunk` for any local axis outside the chunk.
    pub fn new(chunk: ChunkPos, x: i32, y: i32, z: i32) -> Self {
        BlockPos {
            chunk: ChunkPos::new(
                chunk.x + x.div_euclid(CHUNK_DIMENSION),
                chunk.y + y.div_euclid(CHUNK_DIMENSION),
                chunk.z + z.div_euclid(CHUNK_DIMENSION),
            ),
            x: x.rem_euclid(CHUNK_DIMENSION),
            y: y.rem_euclid(CHUNK_DIMENSION),
            z: z.rem_euclid(CHUNK_DIMENSION),
        }
    }

    /// Block position from absolute voxel coordinates.
    pub fn from_world(x: i32, y: i32, z: i32) -> Self {
        Self::new(ChunkPos::ZERO, x, y, z)
    }

    pub fn chunk_pos(&self) -> ChunkPos {
        self.chunk
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn z(&self) -> i32 {
        self.z
    }

    /// Local coordinate as array indices.
    pub fn local(&self) -> (usize, usize, usize) {
        (self.x as usize, self.y as usize, self.z as usize)
    }

    pub fn world_x(&self) -> i32 {
        self.chunk.x * CHUNK_DIMENSION + self.x
    }

    pub fn world_y(&self) -> i32 {
        self.chunk.y * CHUNK_DIMENSION + self.y
    }

    pub fn world_z(&self) -> i32 {
        self.chunk.z * CHUNK_DIMENSION + self.z
    }

    pub fn world(&self) -> Point3<i32> {
        Point3::new(self.world_x(), self.world_y(), self.world_z())
    }

    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.chunk, self.x + dx, self.y + dy, self.z + dz)
    }

    /// The adjacent voxel across the given face, possibly in another chunk.
    pub fn neighbor(&self, side: BlockSide) -> Self {
        let [dx, dy, dz] = side.offset();
        self.offset(dx, dy, dz)
    }
}

impl Add for BlockPos {
    type Output = BlockPos;

    fn add(self, rhs: BlockPos) -> BlockPos {
        BlockPos::new(
            self.chunk + rhs.chunk,
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
        )
    }
}

impl Sub for BlockPos {
    type Output = BlockPos;

    fn sub(self, rhs: BlockPos) -> BlockPos {
        BlockPos::new(
            self.chunk - rhs.chunk,
            self.x - rhs.x,
            self.y - rhs.y,
            self.z - rhs.z,
        )
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block: ({}, {}, {}) in {}",
            self.x, self.y, self.z, self.chunk
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_shifts_chunk_by_floor() {
        let base = ChunkPos::new(2, -3, 5);
        for v in -70..70 {
            let pos = BlockPos::new(base, v, 3, -v);
            assert!((0..CHUNK_DIMENSION).contains(&pos.x()));
            assert!((0..CHUNK_DIMENSION).contains(&pos.z()));
            assert_eq!(pos.chunk_pos().x, base.x + (v as f64 / 16.0).floor() as i32);
            assert_eq!(pos.chunk_pos().y, base.y);
            assert_eq!(pos.chunk_pos().z, base.z + (-v as f64 / 16.0).floor() as i32);
        }
    }

    #[test]
    fn test_negative_local_coordinate() {
        let pos = BlockPos::new(ChunkPos::ZERO, -1, 0, 16);
        assert_eq!(pos.chunk_pos(), ChunkPos::new(-1, 0, 1));
        assert_eq!((pos.x(), pos.y(), pos.z()), (15, 0, 0));
    }

    #[test]
    fn test_world_round_trip() {
        for (wx, wy, wz) in [(0, 0, 0), (-1, -16, -17), (31, 32, -33), (1000, -999, 7)] {
            let pos = BlockPos::from_world(wx, wy, wz);
            assert_eq!(pos.world(), Point3::new(wx, wy, wz));
        }
    }

    #[test]
    fn test_block_arithmetic_renormalizes() {
        let a = BlockPos::new(ChunkPos::new(1, 1, 1), 15, 0, 8);
        let b = BlockPos::from_world(1, -1, 0);
        let sum = a + b;
        assert_eq!(sum.chunk_pos(), ChunkPos::new(2, 0, 1));
        assert_eq!((sum.x(), sum.y(), sum.z()), (0, 15, 8));
        assert_eq!(sum - b, a);
    }

    #[test]
    fn test_neighbor_crosses_chunk() {
        let pos = BlockPos::new(ChunkPos::ZERO, 0, 15, 0);
        assert_eq!(pos.neighbor(BlockSide::TOP).chunk_pos(), ChunkPos::new(0, 1, 0));
        assert_eq!(pos.neighbor(BlockSide::LEFT).chunk_pos(), ChunkPos::new(-1, 0, 0));
        assert_eq!(pos.neighbor(BlockSide::RIGHT).chunk_pos(), ChunkPos::ZERO);
    }

    #[test]
    fn test_chunk_distances() {
        let a = ChunkPos::new(0, 0, 0);
        let b = ChunkPos::new(3, -4, 1);
        assert_eq!(a.cube_distance(&b), 4);
        assert!((a.distance(&ChunkPos::new(3, 4, 0)) - 5.0).abs() < 1e-6);
        assert_eq!(b - b, ChunkPos::ZERO);
        assert_eq!(a + b, b);
    }

    #[test]
    fn test_chunk_from_world_position_floors() {
        assert_eq!(
            ChunkPos::from_world_position(Point3::new(-0.5, 15.9, 16.0)),
            ChunkPos::new(-1, 0, 1)
        );
    }

    #[test]
    fn test_column_projection() {
        assert_eq!(ChunkPos::new(4, 9, -2).column(), ColumnPos::new(4, -2));
        assert_eq!(ColumnPos::new(-1, 2).world_origin(), (-16, 32));
    }
}
