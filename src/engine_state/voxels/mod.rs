//! # Voxel World
//!
//! This module contains everything that describes the voxel world itself: how positions
//! are addressed, how terrain is sampled, and how chunks are generated, kept and evicted.
//!
//! ## Architecture
//!
//! The voxel system is organized into several key components:
//!
//! * **Position**: Column, chunk and block coordinates, always normalised
//! * **Noise Engine**: Seeded 2D/3D gradient noise shared by every generator
//! * **Column**: Per-footprint surface heights, shared by every chunk stacked above it
//! * **Chunk**: 16x16x16 voxel grids and the rules that populate them
//! * **Offload**: Chunks evicted from the view window, kept for cheap restoration
//! * **World**: The streaming scheduler tying the pieces together
//! * **Tasks**: The background generation request
//!
//! ## Data Flow
//!
//! 1. The world notices the viewer entered a new chunk
//! 2. Columns are prefetched and chunk shells are created or restored
//! 3. Shells are generated on the worker in priority order
//! 4. Populated chunks are meshed and handed to the renderer
//!
//! ## Thread Safety
//!
//! Only the world manager mutates chunk storage. The worker receives owned requests
//! and returns owned chunks, and columns are shared read-only through `Arc`.

pub mod block;
pub mod chunk;
pub mod column;
pub mod noise_engine;
pub mod offload;
pub mod position;
pub mod tasks;
pub mod world;
