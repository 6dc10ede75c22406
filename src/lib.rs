#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Streaming
//!
//! A streaming procedural voxel world: terrain is generated from seeded noise in
//! 16x16x16 chunks around a moving viewer, meshed with face culling, and handed to a
//! renderer as plain vertex and index buffers.
//!
//! ## Key Modules
//!
//! * `config` - World configuration, loaded from JSON or built in code
//! * `error` - Error types for configuration and block access
//! * `engine_state` - The world manager, meshing, the worker queue and the camera
//!
//! ## Architecture
//!
//! The crate separates three concerns:
//! * Voxel data (columns, chunks, the offload store), owned by the world manager
//! * Generation, run on one background worker in priority order
//! * Presentation, reached only through the `ChunkRenderer` trait
//!
//! ## Usage
//!
//! ```no_run
//! use voxel_streaming::{Camera, RecordingRenderer, WorldConfig, WorldManager};
//!
//! let mut world = WorldManager::from_config(WorldConfig::default()).unwrap();
//! let camera = Camera::new((0.0, 20.0, 0.0), cgmath::Deg(0.0), cgmath::Deg(0.0));
//! let mut renderer = RecordingRenderer::new();
//! loop {
//!     world.update(&camera, &mut renderer);
//! }
//! ```

use std::time::Duration;

use cgmath::Vector3;
use log::info;
use web_time::Instant;

pub mod config;
pub mod engine_state;
pub mod error;

pub use config::{BoundaryPolicy, TerrainConfig, WorldConfig};
pub use engine_state::{
    camera_state::{Camera, Viewer},
    rendering::{ChunkRenderer, MeshData, RecordingRenderer, VisualHandle},
    voxels::{
        block::{block_side::BlockSide, block_type::BlockType},
        position::{BlockPos, ChunkPos, ColumnPos},
        world::{WorldManager, WorldStats},
    },
    EngineState,
};
pub use error::{ChunkError, ConfigError};

/// Blocks flown per demo step.
const FLIGHT_STEP: f32 = 4.0;
const FLIGHT_STEPS: usize = 32;
const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Headless demo: streams the world around a camera flying along +x and logs what the
/// world manager did.
///
/// The first command line argument, if any, is a JSON configuration file.
pub fn run() -> Result<(), ConfigError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = match std::env::args().nth(1) {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::default(),
    };

    let start = Instant::now();
    let mut engine = EngineState::new(config)?;
    engine.tick();
    if !engine.settle(SETTLE_TIMEOUT) {
        log::warn!("Initial world did not settle within {:?}", SETTLE_TIMEOUT);
    }
    info!(
        "Initial world ready in {:?}: {:?}, {} faces",
        start.elapsed(),
        engine.stats(),
        engine.renderer.total_faces()
    );

    for _ in 0..FLIGHT_STEPS {
        engine.camera.translate(Vector3::new(FLIGHT_STEP, 0.0, 0.0));
        engine.tick();
    }
    engine.settle(SETTLE_TIMEOUT);
    info!(
        "After {} ticks at {}: {:?}, {} visuals, {} uploads, {} faces",
        engine.ticks(),
        engine.camera.viewer_chunk(),
        engine.stats(),
        engine.renderer.live_visuals(),
        engine.renderer.uploads(),
        engine.renderer.total_faces()
    );

    engine.shutdown();
    Ok(())
}
