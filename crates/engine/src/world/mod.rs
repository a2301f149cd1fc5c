pub mod block;
pub mod chunk;
pub mod position;

use chunk::RawChunk;
use dashmap::DashMap;
use position::ChunkCoord;

/// Supplies decoded chunks. `None` means the chunk does not exist (world edge
/// or never generated), which filters treat as "no data".
pub trait ChunkSource: Sync {
    fn load(&self, coord: ChunkCoord) -> Option<RawChunk>;
}

/// In-memory chunk source. Thread-safe, lock-sharded by chunk.
///
/// Loaders that decode a save format insert here; the batch runner reads back
/// through [`ChunkSource`].
pub struct ChunkStore {
    chunks: DashMap<ChunkCoord, RawChunk>,
}

impl ChunkStore {
    pub fn new() -> Self {
        Self {
            chunks: DashMap::new(),
        }
    }

    /// Insert a chunk under its own coordinate, replacing any previous one.
    pub fn insert(&self, chunk: RawChunk) {
        self.chunks.insert(chunk.coord(), chunk);
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

impl ChunkSource for ChunkStore {
    fn load(&self, coord: ChunkCoord) -> Option<RawChunk> {
        self.chunks.get(&coord).map(|entry| entry.value().clone())
    }
}

impl Default for ChunkStore {
    fn default() -> Self {
        Self::new()
    }
}
