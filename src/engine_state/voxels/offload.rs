//! # Offload Store
//!
//! Cold storage for chunks evicted from the active window. Restoring a chunk from here
//! is a map move, so a viewer doubling back never waits on regeneration.
//!
//! The store is unbounded unless a capacity is configured. With a capacity, the least
//! recently offloaded chunk is dropped to make room; it is regenerated from noise the
//! next time it comes into view.

use std::num::NonZeroUsize;

use lru::LruCache;

use super::{chunk::DataChunk, position::ChunkPos};

pub struct OffloadStore {
    chunks: LruCache<ChunkPos, DataChunk>,
}

impl OffloadStore {
    /// Creates a store holding at most `capacity` chunks, or unbounded for `None`.
    pub fn new(capacity: Option<NonZeroUsize>) -> Self {
        let chunks = match capacity {
            Some(capacity) => LruCache::new(capacity),
            None => LruCache::unbounded(),
        };
        OffloadStore { chunks }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn insert(&mut self, chunk: DataChunk) {
        let pos = chunk.pos();
        if let Some((dropped, _)) = self.chunks.push(pos, chunk) {
            if dropped != pos {
                log::debug!("Offload store full, dropped {}", dropped);
            }
        }
    }

    /// Removes and returns the chunk at `pos`.
    pub fn take(&mut self, pos: ChunkPos) -> Option<DataChunk> {
        self.chunks.pop(&pos)
    }

    pub fn peek(&self, pos: ChunkPos) -> Option<&DataChunk> {
        self.chunks.peek(&pos)
    }

    pub fn contains(&self, pos: ChunkPos) -> bool {
        self.chunks.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine_state::voxels::column::DataColumn;

    fn shell(x: i32) -> DataChunk {
        let pos = ChunkPos::new(x, 0, 0);
        DataChunk::new(pos, Arc::new(DataColumn::flat(pos.column(), 0)))
    }

    #[test]
    fn test_take_removes_entry() {
        let mut store = OffloadStore::unbounded();
        store.insert(shell(1));
        assert!(store.contains(ChunkPos::new(1, 0, 0)));
        assert!(store.peek(ChunkPos::new(1, 0, 0)).is_some());
        assert!(store.take(ChunkPos::new(1, 0, 0)).is_some());
        assert!(store.take(ChunkPos::new(1, 0, 0)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut store = OffloadStore::new(NonZeroUsize::new(2));
        store.insert(shell(0));
        store.insert(shell(1));
        store.insert(shell(2));
        assert_eq!(store.len(), 2);
        assert!(!store.contains(ChunkPos::new(0, 0, 0)));
        assert!(store.contains(ChunkPos::new(2, 0, 0)));
    }

    #[test]
    fn test_unbounded_keeps_everything() {
        let mut store = OffloadStore::unbounded();
        for x in 0..100 {
            store.insert(shell(x));
        }
        assert_eq!(store.len(), 100);
    }
}
