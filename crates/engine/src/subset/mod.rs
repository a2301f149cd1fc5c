pub mod circular;
pub mod full;
pub mod region;

use std::path::Path;

use crate::filter::BlockFilter;
use crate::world::position::ChunkCoord;

pub use circular::CircularWorldSubset;
pub use full::FullWorldSubset;
pub use region::{RegionFile, RegionIterator};

/// On-disk region container format, told apart by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveFormat {
    McRegion,
    Anvil,
}

impl SaveFormat {
    pub const fn extension(&self) -> &'static str {
        match self {
            SaveFormat::McRegion => "mcr",
            SaveFormat::Anvil => "mca",
        }
    }
}

/// Which part of the world gets rendered.
///
/// Region iteration and [`contains`](WorldSubset::contains) are coarse and may
/// include chunks that are only partly inside; the per-chunk
/// [`block_filter`](WorldSubset::block_filter) does the exact cropping.
pub trait WorldSubset: Send + Sync {
    fn description(&self) -> String;

    /// Region files under `dimension_dir/region` that may hold in-scope chunks.
    fn create_region_iterator(&self, format: SaveFormat, dimension_dir: &Path) -> RegionIterator;

    fn contains(&self, coord: ChunkCoord) -> bool;

    /// Exact test for a single world-space point.
    fn contains_block(&self, x: f64, z: f64) -> bool;

    fn block_filter(&self, coord: ChunkCoord) -> Box<dyn BlockFilter>;
}
