use super::{BlockFilter, FilterError};
use crate::world::block::BlockId;
use crate::world::chunk::{CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH, FULL_SKY_LIGHT, RawChunk};

/// Per-column allow mask. Disallowed columns are emptied to air and fully sky-lit.
#[derive(Debug, Clone)]
pub struct ArrayBlockFilter {
    columns: [[bool; CHUNK_DEPTH]; CHUNK_WIDTH],
}

impl ArrayBlockFilter {
    /// Every column starts disallowed.
    pub fn new() -> Self {
        Self {
            columns: [[false; CHUNK_DEPTH]; CHUNK_WIDTH],
        }
    }

    pub fn set(&mut self, x: usize, z: usize, allow: bool) {
        self.columns[x][z] = allow;
    }

    pub fn allows(&self, x: usize, z: usize) -> bool {
        self.columns[x][z]
    }

    pub fn allowed_count(&self) -> usize {
        self.columns.iter().flatten().filter(|&&a| a).count()
    }
}

impl Default for ArrayBlockFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockFilter for ArrayBlockFilter {
    fn filter(&self, chunk: &mut RawChunk) -> Result<(), FilterError> {
        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_DEPTH {
                if self.columns[x][z] {
                    continue;
                }
                for y in 0..CHUNK_HEIGHT {
                    chunk.set_block(x, y, z, BlockId::AIR);
                    chunk.set_sky_light(x, y, z, FULL_SKY_LIGHT);
                }
            }
        }
        Ok(())
    }
}
