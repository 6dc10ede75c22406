//! # Voxel Task System
//!
//! Work items handed to the background worker. Generation is the only voxel task:
//! meshing stays on the main thread, where every neighbour can be read safely.

pub mod chunk_generation_task;
