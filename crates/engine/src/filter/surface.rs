use crate::world::block::is_above_surface;
use crate::world::chunk::{CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH, RawChunk};

/// Per-column surface height, indexed `[x][z]`.
pub type ColumnHeights = [[usize; CHUNK_DEPTH]; CHUNK_WIDTH];

/// Estimates where the terrain surface is in each column of a chunk.
pub trait SurfaceHeightEstimator: Send + Sync {
    fn surface_heights(&self, chunk: &RawChunk) -> ColumnHeights;
}

/// Casts a ray down each column until it has gone "deep enough" into solid
/// ground, then takes the minimum over the four cardinal neighbor columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmoothedSurfaceHeights;

/// Solid blocks in a row (net of decay) that count as being underground.
const PENETRATION_DEPTH: i32 = 5;

impl SmoothedSurfaceHeights {
    fn column_height(chunk: &RawChunk, x: usize, z: usize) -> usize {
        let mut penetration = 0;
        let mut y = CHUNK_HEIGHT as i32 - 1;
        while y >= 0 {
            if is_above_surface(chunk.block(x, y as usize, z)) {
                penetration = (penetration - 2).max(0);
            } else {
                penetration += 1;
            }
            if penetration >= PENETRATION_DEPTH {
                break;
            }
            y -= 1;
        }
        (y - 2).max(0) as usize
    }

    fn clamped(heights: &ColumnHeights, x: isize, z: isize) -> usize {
        let x = x.clamp(0, CHUNK_WIDTH as isize - 1) as usize;
        let z = z.clamp(0, CHUNK_DEPTH as isize - 1) as usize;
        heights[x][z]
    }
}

impl SurfaceHeightEstimator for SmoothedSurfaceHeights {
    fn surface_heights(&self, chunk: &RawChunk) -> ColumnHeights {
        let mut raw = [[0usize; CHUNK_DEPTH]; CHUNK_WIDTH];
        for (x, column) in raw.iter_mut().enumerate() {
            for (z, height) in column.iter_mut().enumerate() {
                *height = Self::column_height(chunk, x, z);
            }
        }

        let mut smoothed = [[0usize; CHUNK_DEPTH]; CHUNK_WIDTH];
        for (x, column) in smoothed.iter_mut().enumerate() {
            for (z, height) in column.iter_mut().enumerate() {
                let (x, z) = (x as isize, z as isize);
                *height = Self::clamped(&raw, x - 1, z)
                    .min(Self::clamped(&raw, x + 1, z))
                    .min(Self::clamped(&raw, x, z - 1))
                    .min(Self::clamped(&raw, x, z + 1));
            }
        }
        smoothed
    }
}
