use std::path::Path;

use super::region::{CircularRegions, RegionIterator};
use super::{SaveFormat, WorldSubset};
use crate::filter::{ArrayBlockFilter, BlockFilter};
use crate::world::chunk::{CHUNK_DEPTH, CHUNK_WIDTH};
use crate::world::position::{ChunkCoord, WorldPos};

/// Slack added to the radius for chunk-level containment, so chunks with
/// in-range columns but an out-of-range center are still visited.
pub const CHUNK_BUFFER: i64 = (CHUNK_WIDTH + CHUNK_DEPTH + CHUNK_WIDTH) as i64;

/// Everything within `radius` blocks of `origin` (horizontal distance).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircularWorldSubset {
    origin: WorldPos,
    radius: i64,
}

impl CircularWorldSubset {
    pub fn new(origin: WorldPos, radius: i64) -> Self {
        Self { origin, radius }
    }

    pub fn origin(&self) -> WorldPos {
        self.origin
    }

    pub fn radius(&self) -> i64 {
        self.radius
    }

    /// Whether world column `(cx*W + x, cz*D + z)` lies within the radius,
    /// using the truncated-distance rule `floor(sqrt(d2)) <= radius`.
    pub fn column_in_range(&self, coord: ChunkCoord, x: usize, z: usize) -> bool {
        if self.radius < 0 {
            return false;
        }
        let origin = coord.block_origin();
        let dx = (origin.x + x as i64 - self.origin.x) as i128;
        let dz = (origin.z + z as i64 - self.origin.z) as i128;
        let limit = self.radius as i128 + 1;
        dx * dx + dz * dz < limit * limit
    }
}

impl WorldSubset for CircularWorldSubset {
    fn description(&self) -> String {
        format!(
            "CircularWorldSubset ({}, {}) {}",
            self.origin.x, self.origin.z, self.radius
        )
    }

    fn create_region_iterator(&self, format: SaveFormat, dimension_dir: &Path) -> RegionIterator {
        RegionIterator::Circular(CircularRegions::new(
            dimension_dir,
            format,
            self.origin,
            self.radius,
        ))
    }

    fn contains(&self, coord: ChunkCoord) -> bool {
        if self.radius < 0 {
            return false;
        }
        let corner = coord.block_origin();
        let center = WorldPos::new(
            corner.x + CHUNK_WIDTH as i64 / 2,
            corner.z + CHUNK_DEPTH as i64 / 2,
        );
        center.separation(&self.origin) <= self.radius.saturating_add(CHUNK_BUFFER)
    }

    fn contains_block(&self, x: f64, z: f64) -> bool {
        if self.radius < 0 {
            return false;
        }
        let dx = x - self.origin.x as f64;
        let dz = z - self.origin.z as f64;
        let r = self.radius as f64;
        dx * dx + dz * dz < r * r
    }

    fn block_filter(&self, coord: ChunkCoord) -> Box<dyn BlockFilter> {
        let mut filter = ArrayBlockFilter::new();
        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_DEPTH {
                filter.set(x, z, self.column_in_range(coord, x, z));
            }
        }
        Box::new(filter)
    }
}
