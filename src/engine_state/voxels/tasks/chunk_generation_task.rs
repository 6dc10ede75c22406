//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask`, the only work the background worker
//! runs. It carries an owned request (chunk coordinate, its column, the generator) to
//! the worker and returns a fully populated `DataChunk`. The main thread stays the sole
//! owner of the active and offload maps.

use std::sync::Arc;

use web_time::Instant;

use crate::engine_state::{
    task_management::task::Task,
    voxels::{
        chunk::{generation::TerrainGenerator, DataChunk},
        column::DataColumn,
        position::ChunkPos,
    },
};

/// A request to generate the voxel grid of one chunk.
pub struct ChunkGenerationTask {
    /// The position of the chunk to generate (in chunk coordinates)
    position: ChunkPos,
    /// The fully constructed column the chunk sits in
    column: Arc<DataColumn>,
    generator: Arc<TerrainGenerator>,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates where the chunk should be generated
    /// * `column` - The column for `position`, already generated
    /// * `generator` - The world's terrain generator
    ///
    /// # Returns
    /// A new `ChunkGenerationTask` instance
    pub fn new(
        position: ChunkPos,
        column: Arc<DataColumn>,
        generator: Arc<TerrainGenerator>,
    ) -> Self {
        ChunkGenerationTask {
            position,
            column,
            generator,
        }
    }
}

impl Task for ChunkGenerationTask {
    type Key = ChunkPos;
    type Output = DataChunk;

    fn key(&self) -> ChunkPos {
        self.position
    }

    /// Generates the chunk on the worker thread.
    ///
    /// # Returns
    /// A populated `DataChunk` to be installed on the main thread
    fn process(self) -> DataChunk {
        let start = Instant::now();
        let mut chunk = DataChunk::new(self.position, self.column);
        chunk.generate_blocks(&self.generator);
        log::trace!(
            "Generated {} ({} solid) in {:?}",
            self.position,
            chunk.density(),
            start.elapsed()
        );
        chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TerrainConfig;

    #[test]
    fn test_process_matches_direct_generation() {
        let generator = Arc::new(TerrainGenerator::new(8, TerrainConfig::default()));
        let pos = ChunkPos::new(1, 0, -1);
        let column = Arc::new(DataColumn::generate(pos.column(), &generator));

        let from_task =
            ChunkGenerationTask::new(pos, Arc::clone(&column), Arc::clone(&generator)).process();

        let mut direct = DataChunk::new(pos, column);
        direct.generate_blocks(&generator);

        assert!(from_task.is_populated());
        assert_eq!(from_task.density(), direct.density());
        assert_eq!(from_task.blocks(), direct.blocks());
    }
}
