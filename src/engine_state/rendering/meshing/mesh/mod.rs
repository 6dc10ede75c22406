//! Mesh data structures for voxel rendering.
//!
//! # Architecture
//! - [`ChunkMesh`]: the visible faces of one chunk, kept per face so boundary slabs can
//!   be patched in place
//! - [`Face`]: a single visible side of a voxel with its atlas cell and tint
//! - [`MeshData`]: positions, UVs, colours and indices ready for upload

mod face;
mod mesh;

pub use face::{on_boundary_layer, Face};
pub use mesh::*;
