use std::path::Path;

use super::region::{AllRegions, RegionIterator};
use super::{SaveFormat, WorldSubset};
use crate::filter::{BlockFilter, NullBlockFilter};
use crate::world::position::ChunkCoord;

/// The whole world, uncropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullWorldSubset;

impl WorldSubset for FullWorldSubset {
    fn description(&self) -> String {
        "FullWorldSubset".into()
    }

    fn create_region_iterator(&self, format: SaveFormat, dimension_dir: &Path) -> RegionIterator {
        RegionIterator::All(AllRegions::new(dimension_dir, format))
    }

    fn contains(&self, _coord: ChunkCoord) -> bool {
        true
    }

    fn contains_block(&self, _x: f64, _z: f64) -> bool {
        true
    }

    fn block_filter(&self, _coord: ChunkCoord) -> Box<dyn BlockFilter> {
        Box::new(NullBlockFilter)
    }
}
