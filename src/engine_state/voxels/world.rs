//! # World Module
//!
//! This module provides the `WorldManager`, the streaming scheduler that keeps a moving
//! window of chunks populated and meshed around a viewer.
//!
//! ## Architecture
//!
//! The manager is the sole owner of three maps:
//! - the column store, built lazily as the window touches new footprints
//! - the active chunk map, every chunk inside the view window
//! - the offload store, chunks evicted from the window and kept for cheap restoration
//!
//! A chunk position is in at most one of the active map and the offload store.
//!
//! ## Tick
//!
//! [`WorldManager::update`] runs on the main thread:
//! 1. Drain generated chunks from the background worker and install them
//! 2. If the viewer crossed into a new chunk: expand (restore or enqueue everything
//!    newly in range) and contract (evict everything now out of range)
//! 3. Mesh newly populated chunks, and patch boundary slabs of already rendered chunks
//!    whose neighbour just populated
//!
//! ## Generation
//!
//! A single long-lived worker generates chunks in priority order. The worker receives an
//! owned request (position, column, generator) and sends back an owned `DataChunk`, so
//! no chunk is ever written by two threads.

use std::{collections::HashMap, num::NonZeroUsize, sync::Arc, time::Duration};

use cgmath::{InnerSpace, Point3, Vector3};
use web_time::Instant;

use crate::{
    config::{BoundaryPolicy, WorldConfig},
    engine_state::{
        camera_state::Viewer,
        rendering::{
            atlas::{Atlas, TextureAtlas},
            meshing::{BlockSource, ChunkMesh, MeshBuilder},
            ChunkRenderer, VisualHandle,
        },
        task_management::{task::TaskOutcome, TaskManager},
    },
    error::ConfigError,
};

use super::{
    block::{block_side::BlockSide, block_type::BlockType},
    chunk::{generation::TerrainGenerator, ChunkState, DataChunk},
    column::ColumnStore,
    offload::OffloadStore,
    position::{BlockPos, ChunkPos, ColumnPos},
    tasks::chunk_generation_task::ChunkGenerationTask,
};

/// Renderer-facing state of a populated chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// Voxel data is ready but no mesh has been built for the current visual.
    Loaded,
    /// A mesh has been uploaded. Dirty boundary slabs may still be pending.
    Rendered,
}

struct ActiveChunk {
    data: DataChunk,
    visual: VisualHandle,
    render: RenderState,
    mesh: ChunkMesh,
    /// Boundary slabs to re-evaluate, indexed by `BlockSide`.
    dirty: [bool; 6],
}

impl ActiveChunk {
    fn new(data: DataChunk, visual: VisualHandle) -> Self {
        ActiveChunk {
            data,
            visual,
            render: RenderState::Loaded,
            mesh: ChunkMesh::new(),
            dirty: [false; 6],
        }
    }
}

/// Point-in-time counters for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorldStats {
    pub active: usize,
    pub populated: usize,
    pub rendered: usize,
    pub offloaded: usize,
    pub columns: usize,
    pub queued: usize,
    pub in_flight: usize,
}

/// Generation order for a chunk: lower values are generated first.
///
/// Chunks closer than `near_threshold` are ordered by Euclidean distance alone. Farther
/// chunks add the angle (in radians) between the view direction and the direction to
/// the chunk, so chunks in front of the viewer beat chunks behind it at equal distance.
pub fn generation_priority(
    chunk: ChunkPos,
    viewer_chunk: ChunkPos,
    view_direction: Vector3<f32>,
    near_threshold: f32,
) -> f32 {
    let distance = chunk.distance(&viewer_chunk);
    if distance < near_threshold || distance == 0.0 || view_direction.magnitude2() == 0.0 {
        return distance;
    }
    let offset = chunk - viewer_chunk;
    let to_chunk = Vector3::new(offset.x as f32, offset.y as f32, offset.z as f32) / distance;
    let deviation = to_chunk
        .dot(view_direction.normalize())
        .clamp(-1.0, 1.0)
        .acos();
    distance + deviation
}

/// Resolves voxels outside a chunk for the mesh builder.
struct NeighborView<'a> {
    active: &'a HashMap<ChunkPos, ActiveChunk>,
    offload: &'a OffloadStore,
    columns: &'a ColumnStore,
    generator: &'a TerrainGenerator,
    policy: BoundaryPolicy,
}

impl NeighborView<'_> {
    fn regenerate(&self, pos: BlockPos) -> BlockType {
        match self.columns.get(pos.chunk_pos().column()) {
            Some(column) => self.generator.generate_block_at(pos, &column),
            None => {
                let (wx, wz) = (pos.world_x(), pos.world_z());
                let surface = self.generator.surface_height(wx, wz);
                self.generator.generate_block(wx, pos.world_y(), wz, surface)
            }
        }
    }
}

impl BlockSource for NeighborView<'_> {
    fn block_at(&self, pos: BlockPos) -> BlockType {
        let chunk_pos = pos.chunk_pos();
        if let Some(entry) = self.active.get(&chunk_pos) {
            if entry.data.is_populated() {
                return entry.data.get_block(pos);
            }
        } else if let Some(chunk) = self.offload.peek(chunk_pos) {
            return chunk.get_block(pos);
        }
        match self.policy {
            BoundaryPolicy::Solid => BlockType::SOLID,
            BoundaryPolicy::Regenerate => self.regenerate(pos),
        }
    }
}

/// Owns the streaming window and everything in it.
pub struct WorldManager {
    config: WorldConfig,
    generator: Arc<TerrainGenerator>,
    atlas: Box<dyn TextureAtlas>,
    columns: ColumnStore,
    active: HashMap<ChunkPos, ActiveChunk>,
    offload: OffloadStore,
    tasks: TaskManager<ChunkGenerationTask>,
    last_viewer_chunk: Option<ChunkPos>,
    isolate_mesh: bool,
    /// A generation failed and its shell waits to be published again.
    retry_pending: bool,
}

impl WorldManager {
    /// Validates `config`, starts the generation worker and returns an empty world.
    pub fn new(config: WorldConfig, atlas: Box<dyn TextureAtlas>) -> Result<Self, ConfigError> {
        config.validate()?;
        let generator = Arc::new(TerrainGenerator::from_config(&config));
        let offload = OffloadStore::new(config.offload_capacity.and_then(NonZeroUsize::new));
        log::info!(
            "Created world (seed {}, view radius {}/{}, {:?} boundaries)",
            config.seed,
            config.view_radius,
            config.vertical_view_radius,
            config.boundary_policy
        );

        Ok(WorldManager {
            isolate_mesh: config.isolate_mesh,
            config,
            generator,
            atlas,
            columns: ColumnStore::new(),
            active: HashMap::new(),
            offload,
            tasks: TaskManager::new(),
            last_viewer_chunk: None,
            retry_pending: false,
        })
    }

    /// [`Self::new`] with the default atlas built from `config`.
    pub fn from_config(config: WorldConfig) -> Result<Self, ConfigError> {
        let atlas = Box::new(Atlas::from_config(&config));
        Self::new(config, atlas)
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    /// One main-thread tick.
    pub fn update(&mut self, viewer: &dyn Viewer, renderer: &mut dyn ChunkRenderer) {
        let outcomes = self.tasks.process_completed_tasks();
        self.apply_outcomes(outcomes);

        let viewer_chunk = viewer.viewer_chunk();
        if self.last_viewer_chunk != Some(viewer_chunk) {
            self.last_viewer_chunk = Some(viewer_chunk);
            self.stream(viewer_chunk, viewer.view_direction(), renderer);
        }
        if std::mem::take(&mut self.retry_pending) {
            let retried = self.publish_unpopulated(viewer_chunk, viewer.view_direction());
            log::debug!("Re-published {} failed chunks", retried);
        }

        self.rebuild_meshes(renderer);
    }

    /// Runs [`Self::update`] until the worker has nothing left, or until `timeout`.
    ///
    /// # Returns
    /// `true` if the world settled in time.
    pub fn settle(
        &mut self,
        viewer: &dyn Viewer,
        renderer: &mut dyn ChunkRenderer,
        timeout: Duration,
    ) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.update(viewer, renderer);
            if self.tasks.is_idle() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let wait = (deadline - now).min(Duration::from_millis(100));
            let outcomes = self.tasks.wait_for_completed(wait);
            self.apply_outcomes(outcomes);
        }
    }

    /// Block at any position in the world.
    ///
    /// Reads loaded or offloaded chunk data when present and recomputes the voxel from
    /// the generator otherwise.
    pub fn block_at(&self, pos: BlockPos) -> BlockType {
        NeighborView {
            active: &self.active,
            offload: &self.offload,
            columns: &self.columns,
            generator: &self.generator,
            policy: BoundaryPolicy::Regenerate,
        }
        .block_at(pos)
    }

    /// Debug mode treating every cross-chunk neighbour as air. Toggling it rebuilds
    /// every mesh on the next tick.
    pub fn set_isolate_mesh(&mut self, isolate: bool) {
        if self.isolate_mesh == isolate {
            return;
        }
        self.isolate_mesh = isolate;
        for entry in self.active.values_mut() {
            entry.render = RenderState::Loaded;
        }
    }

    pub fn isolate_mesh(&self) -> bool {
        self.isolate_mesh
    }

    /// Active chunk data at `pos`.
    pub fn chunk(&self, pos: ChunkPos) -> Option<&DataChunk> {
        self.active.get(&pos).map(|entry| &entry.data)
    }

    pub fn render_state(&self, pos: ChunkPos) -> Option<RenderState> {
        self.active
            .get(&pos)
            .filter(|entry| entry.data.is_populated())
            .map(|entry| entry.render)
    }

    pub fn visual(&self, pos: ChunkPos) -> Option<VisualHandle> {
        self.active.get(&pos).map(|entry| entry.visual)
    }

    pub fn active_positions(&self) -> impl Iterator<Item = ChunkPos> + '_ {
        self.active.keys().copied()
    }

    pub fn is_active(&self, pos: ChunkPos) -> bool {
        self.active.contains_key(&pos)
    }

    pub fn is_offloaded(&self, pos: ChunkPos) -> bool {
        self.offload.contains(pos)
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn offload_len(&self) -> usize {
        self.offload.len()
    }

    pub fn column_len(&self) -> usize {
        self.columns.len()
    }

    pub fn stats(&self) -> WorldStats {
        WorldStats {
            active: self.active.len(),
            populated: self
                .active
                .values()
                .filter(|entry| entry.data.is_populated())
                .count(),
            rendered: self
                .active
                .values()
                .filter(|entry| entry.data.is_populated() && entry.render == RenderState::Rendered)
                .count(),
            offloaded: self.offload.len(),
            columns: self.columns.len(),
            queued: self.tasks.queued_len(),
            in_flight: self.tasks.in_flight(),
        }
    }

    /// Releases every visual and stops the worker. The world is empty afterwards.
    pub fn shutdown(&mut self, renderer: &mut dyn ChunkRenderer) {
        for (_, entry) in self.active.drain() {
            renderer.destroy_chunk_visual(entry.visual);
        }
        self.tasks.shutdown();
        self.last_viewer_chunk = None;
        log::info!("World shut down");
    }

    fn in_range(&self, pos: ChunkPos, viewer_chunk: ChunkPos) -> bool {
        let offset = pos - viewer_chunk;
        offset.x.abs() <= self.config.view_radius
            && offset.z.abs() <= self.config.view_radius
            && offset.y.abs() <= self.config.vertical_view_radius
    }

    fn apply_outcomes(&mut self, outcomes: Vec<TaskOutcome<ChunkGenerationTask>>) {
        for outcome in outcomes {
            match outcome {
                TaskOutcome::Completed(chunk) => self.install(chunk),
                TaskOutcome::Failed { key, message } => match self.active.get_mut(&key) {
                    Some(entry) => {
                        log::warn!("Generation of {} failed ({}), will retry", key, message);
                        entry.data.reset();
                        self.retry_pending = true;
                    }
                    None => log::warn!("Generation of evicted {} failed: {}", key, message),
                },
            }
        }
    }

    fn install(&mut self, chunk: DataChunk) {
        let pos = chunk.pos();
        let Some(entry) = self.active.get_mut(&pos) else {
            log::debug!("Dropping generated {}, no longer active", pos);
            return;
        };
        if entry.data.is_populated() {
            return;
        }
        entry.data = chunk;
        entry.render = RenderState::Loaded;
        // Cancels a duplicate request left over from an earlier eviction.
        self.tasks.cancel(pos);

        for side in BlockSide::all() {
            if let Some(neighbor) = self.active.get_mut(&pos.neighbor(side)) {
                if neighbor.data.is_populated() && neighbor.render == RenderState::Rendered {
                    neighbor.dirty[side.opposite().index()] = true;
                }
            }
        }
    }

    fn stream(
        &mut self,
        viewer_chunk: ChunkPos,
        view_direction: Vector3<f32>,
        renderer: &mut dyn ChunkRenderer,
    ) {
        let start = Instant::now();
        let (restored, enqueued) = self.expand(viewer_chunk, view_direction, renderer);
        let evicted = self.contract(viewer_chunk, renderer);
        log::debug!(
            "Viewer entered {}: {} restored, {} enqueued, {} evicted in {:?}",
            viewer_chunk,
            restored,
            enqueued,
            evicted,
            start.elapsed()
        );
    }

    fn expand(
        &mut self,
        viewer_chunk: ChunkPos,
        view_direction: Vector3<f32>,
        renderer: &mut dyn ChunkRenderer,
    ) -> (usize, usize) {
        let radius = self.config.view_radius;
        let vertical = self.config.vertical_view_radius;

        // Columns one ring past the window, so boundary lookups have real surface data.
        for dx in -(radius + 1)..=(radius + 1) {
            for dz in -(radius + 1)..=(radius + 1) {
                let column = ColumnPos::new(viewer_chunk.x + dx, viewer_chunk.z + dz);
                self.columns.get_or_create(column, &self.generator);
            }
        }

        let mut restored = 0;
        for dx in -radius..=radius {
            for dy in -vertical..=vertical {
                for dz in -radius..=radius {
                    let pos = viewer_chunk + ChunkPos::new(dx, dy, dz);
                    if self.active.contains_key(&pos) {
                        continue;
                    }
                    let origin = pos.world_origin();
                    let visual = renderer.create_chunk_visual(Point3::new(
                        origin.x as f32,
                        origin.y as f32,
                        origin.z as f32,
                    ));

                    if let Some(chunk) = self.offload.take(pos) {
                        log::trace!("Restoring {}", pos);
                        self.active.insert(pos, ActiveChunk::new(chunk, visual));
                        restored += 1;
                        continue;
                    }

                    let column = self.columns.get_or_create(pos.column(), &self.generator);
                    let chunk = DataChunk::new(pos, column);
                    self.active.insert(pos, ActiveChunk::new(chunk, visual));
                }
            }
        }

        let enqueued = self.publish_unpopulated(viewer_chunk, view_direction);
        (restored, enqueued)
    }

    /// Publishes every shell not yet generating, new or reset after a failure.
    fn publish_unpopulated(&mut self, viewer_chunk: ChunkPos, view_direction: Vector3<f32>) -> usize {
        let mut enqueued = 0;
        let waiting: Vec<ChunkPos> = self
            .active
            .iter()
            .filter(|(_, entry)| entry.data.state() == ChunkState::Unpopulated)
            .map(|(pos, _)| *pos)
            .collect();
        for pos in waiting {
            let Some(entry) = self.active.get_mut(&pos) else {
                continue;
            };
            entry.data.mark_generating();
            let priority = generation_priority(
                pos,
                viewer_chunk,
                view_direction,
                self.config.near_priority_distance,
            );
            let task = ChunkGenerationTask::new(
                pos,
                Arc::clone(entry.data.column()),
                Arc::clone(&self.generator),
            );
            self.tasks.publish_task(priority, task);
            enqueued += 1;
        }
        enqueued
    }

    fn contract(&mut self, viewer_chunk: ChunkPos, renderer: &mut dyn ChunkRenderer) -> usize {
        let leaving: Vec<ChunkPos> = self
            .active
            .keys()
            .copied()
            .filter(|pos| !self.in_range(*pos, viewer_chunk))
            .collect();

        for pos in &leaving {
            let Some(entry) = self.active.remove(pos) else {
                continue;
            };
            renderer.destroy_chunk_visual(entry.visual);
            if entry.data.is_populated() {
                self.offload.insert(entry.data);
            } else {
                self.tasks.cancel(*pos);
                log::trace!("Discarding ungenerated {}", pos);
            }
        }

        leaving.len()
    }

    fn rebuild_meshes(&mut self, renderer: &mut dyn ChunkRenderer) {
        let pending: Vec<(ChunkPos, Option<[bool; 6]>)> = self
            .active
            .iter()
            .filter(|(_, entry)| entry.data.is_populated())
            .filter_map(|(pos, entry)| match entry.render {
                RenderState::Loaded => Some((*pos, None)),
                RenderState::Rendered if entry.dirty.contains(&true) => {
                    Some((*pos, Some(entry.dirty)))
                }
                RenderState::Rendered => None,
            })
            .collect();
        if pending.is_empty() {
            return;
        }

        let start = Instant::now();
        let unit = self.atlas.unit();
        for (pos, dirty) in &pending {
            let Some(entry) = self.active.get_mut(pos) else {
                continue;
            };
            let mut mesh = std::mem::take(&mut entry.mesh);

            let neighbors = NeighborView {
                active: &self.active,
                offload: &self.offload,
                columns: &self.columns,
                generator: &self.generator,
                policy: self.config.boundary_policy,
            };
            let builder = MeshBuilder::new(self.atlas.as_ref(), &neighbors, self.isolate_mesh);
            let Some(entry) = self.active.get(pos) else {
                continue;
            };
            match dirty {
                None => mesh = builder.build(&entry.data),
                Some(dirty) => {
                    for side in BlockSide::all() {
                        if dirty[side.index()] {
                            builder.rebuild_boundary(&mut mesh, &entry.data, side);
                        }
                    }
                }
            }
            let upload = !entry.data.is_empty();

            let Some(entry) = self.active.get_mut(pos) else {
                continue;
            };
            if upload {
                renderer.upload_mesh(entry.visual, &mesh.mesh_data(unit));
            }
            entry.mesh = mesh;
            entry.render = RenderState::Rendered;
            entry.dirty = [false; 6];
        }
        log::debug!("Meshed {} chunks in {:?}", pending.len(), start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Deg;

    use super::*;
    use crate::engine_state::{camera_state::Camera, rendering::RecordingRenderer};

    #[test]
    fn test_near_chunks_ordered_by_distance_only() {
        let viewer = ChunkPos::ZERO;
        let forward = Vector3::new(1.0, 0.0, 0.0);
        let ahead = generation_priority(ChunkPos::new(1, 0, 0), viewer, forward, 2.0);
        let behind = generation_priority(ChunkPos::new(-1, 0, 0), viewer, forward, 2.0);
        assert_eq!(ahead, behind);
        assert_eq!(ahead, 1.0);
        assert_eq!(generation_priority(viewer, viewer, forward, 2.0), 0.0);
    }

    #[test]
    fn test_far_chunks_prefer_view_direction() {
        let viewer = ChunkPos::ZERO;
        let forward = Vector3::new(0.0, 0.0, 1.0);
        let ahead = generation_priority(ChunkPos::new(0, 0, 3), viewer, forward, 2.0);
        let side = generation_priority(ChunkPos::new(3, 0, 0), viewer, forward, 2.0);
        let behind = generation_priority(ChunkPos::new(0, 0, -3), viewer, forward, 2.0);
        assert!((ahead - 3.0).abs() < 1e-5);
        assert!((side - (3.0 + std::f32::consts::FRAC_PI_2)).abs() < 1e-5);
        assert!((behind - (3.0 + std::f32::consts::PI)).abs() < 1e-4);
    }

    #[test]
    fn test_closer_chunk_behind_can_beat_far_chunk_ahead() {
        let viewer = ChunkPos::ZERO;
        let forward = Vector3::new(0.0, 0.0, 1.0);
        let near_behind = generation_priority(ChunkPos::new(0, 0, -2), viewer, forward, 2.0);
        let far_ahead = generation_priority(ChunkPos::new(0, 0, 6), viewer, forward, 2.0);
        assert!(near_behind < far_ahead);
    }

    #[test]
    fn test_failed_chunk_is_retried_without_viewer_movement() {
        let config = WorldConfig {
            view_radius: 0,
            vertical_view_radius: 0,
            ..WorldConfig::default()
        };
        let mut world = WorldManager::from_config(config).unwrap();
        let mut renderer = RecordingRenderer::new();
        let camera = Camera::new(Point3::new(4.0, 4.0, 4.0), Deg(0.0), Deg(0.0));
        assert!(world.settle(&camera, &mut renderer, Duration::from_secs(30)));
        let expected = world.chunk(ChunkPos::ZERO).unwrap().clone();

        world.apply_outcomes(vec![TaskOutcome::Failed {
            key: ChunkPos::ZERO,
            message: String::from("worker panicked"),
        }]);
        assert_eq!(
            world.chunk(ChunkPos::ZERO).map(|chunk| chunk.state()),
            Some(ChunkState::Unpopulated)
        );

        world.update(&camera, &mut renderer);
        assert_ne!(
            world.chunk(ChunkPos::ZERO).map(|chunk| chunk.state()),
            Some(ChunkState::Unpopulated)
        );

        assert!(world.settle(&camera, &mut renderer, Duration::from_secs(30)));
        let chunk = world.chunk(ChunkPos::ZERO).unwrap();
        assert!(chunk.is_populated());
        assert_eq!(chunk.blocks(), expected.blocks());
        assert_eq!(world.render_state(ChunkPos::ZERO), Some(RenderState::Rendered));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = WorldConfig {
            view_radius: -2,
            ..WorldConfig::default()
        };
        assert!(WorldManager::from_config(config).is_err());
    }
}
