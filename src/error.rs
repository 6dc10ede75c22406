//! Error types for the streaming world.
//!
//! Most of the world is designed to degrade rather than fail: coordinate overflow is
//! renormalised, missing neighbours are regenerated, and worker failures are logged.
//! The errors here cover the few places where a caller can actually do something wrong.

use thiserror::Error;

use crate::engine_state::voxels::position::{BlockPos, ChunkPos};

/// Errors raised while loading or validating a [`crate::config::WorldConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised by block accessors on a [`crate::engine_state::voxels::chunk::DataChunk`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ChunkError {
    /// Air is never written directly; `remove_block` keeps the density counter honest.
    #[error("cannot write air at {0}, use remove_block instead")]
    AirWrite(BlockPos),

    #[error("{pos} does not belong to {chunk}")]
    ForeignPosition { pos: BlockPos, chunk: ChunkPos },
}
