//! # Engine State Module
//!
//! The core engine module that ties the streaming world to a viewer and a renderer.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `camera_state` - Handles camera positioning and movement
//! * `rendering` - Atlas lookups, meshing and the renderer contract
//! * `task_management` - The priority queue and its background worker
//! * `voxels` - Handles voxel data, chunks, and world generation
//!
//! ## Architecture
//!
//! `EngineState` owns one of each collaborator and drives them from a single
//! `tick`. Everything the world needs from outside is passed in per call, so the
//! same `WorldManager` runs against the headless renderer here or any other
//! `ChunkRenderer`.

use std::time::Duration;

use web_time::Instant;

use camera_state::Camera;
use rendering::RecordingRenderer;
use voxels::world::{WorldManager, WorldStats};

use crate::{config::WorldConfig, error::ConfigError};

pub mod camera_state;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// The main state container for the engine.
pub struct EngineState {
    /// The viewer driving the streaming window
    pub camera: Camera,
    /// Headless renderer receiving chunk visuals
    pub renderer: RecordingRenderer,
    /// The streaming voxel world
    pub world: WorldManager,
    ticks: u64,
}

impl EngineState {
    /// Creates a new engine state with the camera above the world origin.
    ///
    /// # Arguments
    ///
    /// * `config` - World configuration, validated here
    ///
    /// # Returns
    ///
    /// A ready engine, or the configuration error
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        let world = WorldManager::from_config(config)?;
        Ok(Self {
            camera: Camera::new((8.0, 24.0, 8.0), cgmath::Deg(0.0), cgmath::Deg(-20.0)),
            renderer: RecordingRenderer::new(),
            world,
            ticks: 0,
        })
    }

    /// Runs one world update against the current camera.
    pub fn tick(&mut self) {
        self.world.update(&self.camera, &mut self.renderer);
        self.ticks += 1;
    }

    /// Blocks until the world around the camera is fully generated and meshed.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let start = Instant::now();
        let settled = self.world.settle(&self.camera, &mut self.renderer, timeout);
        log::debug!("Settle took {:?} (settled: {})", start.elapsed(), settled);
        settled
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn stats(&self) -> WorldStats {
        self.world.stats()
    }

    /// Releases every visual and stops the worker.
    pub fn shutdown(&mut self) {
        self.world.shutdown(&mut self.renderer);
    }
}
