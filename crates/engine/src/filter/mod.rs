pub mod array;
pub mod cave;
pub mod nether;
pub mod surface;

use crate::world::chunk::RawChunk;
use crate::world::position::{ChunkCoord, Direction};

pub use array::ArrayBlockFilter;
pub use cave::ExploredCaveFilter;
pub use nether::NetherRoofFilter;
pub use surface::{SmoothedSurfaceHeights, SurfaceHeightEstimator};

/// Errors raised by a filter pass. Scoped to one chunk; the batch runner
/// reports them per chunk and carries on with the rest.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// A cross-chunk pass found a chunk whose single-chunk pass never ran.
    #[error("chunk ({}, {}) has no non-natural block mask; its single-chunk pass has not run", chunk.x, chunk.z)]
    MissingNonNaturalMask { chunk: ChunkCoord },
}

/// The four cardinal neighbors of a chunk during the cross-chunk pass.
/// `None` means no data (world edge, ungenerated, or failed earlier).
#[derive(Clone, Copy, Default)]
pub struct Neighbors<'a> {
    pub north: Option<&'a RawChunk>,
    pub south: Option<&'a RawChunk>,
    pub east: Option<&'a RawChunk>,
    pub west: Option<&'a RawChunk>,
}

impl<'a> Neighbors<'a> {
    pub fn none() -> Self {
        Self::default()
    }

    /// Look up each neighbor of `center` through `lookup`.
    pub fn gather(center: ChunkCoord, lookup: impl Fn(ChunkCoord) -> Option<&'a RawChunk>) -> Self {
        let mut neighbors = Self::none();
        for dir in Direction::ALL {
            *neighbors.slot(dir) = lookup(center.neighbor(dir));
        }
        neighbors
    }

    pub fn get(&self, dir: Direction) -> Option<&'a RawChunk> {
        match dir {
            Direction::North => self.north,
            Direction::South => self.south,
            Direction::East => self.east,
            Direction::West => self.west,
        }
    }

    fn slot(&mut self, dir: Direction) -> &mut Option<&'a RawChunk> {
        match dir {
            Direction::North => &mut self.north,
            Direction::South => &mut self.south,
            Direction::East => &mut self.east,
            Direction::West => &mut self.west,
        }
    }
}

/// A per-chunk block transform.
///
/// `filter` runs on every chunk of a batch before `pre_geometry_filter` runs on
/// any of them, so the cross-chunk pass may read whatever the single-chunk pass
/// attached to a neighbor.
pub trait BlockFilter: Send + Sync {
    /// Single-chunk pass. Must not look at any other chunk.
    fn filter(&self, chunk: &mut RawChunk) -> Result<(), FilterError>;

    /// Cross-chunk pass, run right before geometry is built for `center`.
    fn pre_geometry_filter(
        &self,
        _center: &mut RawChunk,
        _neighbors: Neighbors<'_>,
    ) -> Result<(), FilterError> {
        Ok(())
    }
}

/// Leaves every chunk untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBlockFilter;

impl BlockFilter for NullBlockFilter {
    fn filter(&self, _chunk: &mut RawChunk) -> Result<(), FilterError> {
        Ok(())
    }
}

/// An ordered chain of filters. Both passes visit children in registration
/// order, so later filters observe the mutations and attachments of earlier
/// ones. The first child error stops the chain.
pub struct CompositeBlockFilter {
    filters: Vec<Box<dyn BlockFilter>>,
}

impl CompositeBlockFilter {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    pub fn add(&mut self, filter: Box<dyn BlockFilter>) {
        self.filters.push(filter);
    }

    /// Builder form of [`add`](Self::add).
    pub fn with(mut self, filter: impl BlockFilter + 'static) -> Self {
        self.add(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Default for CompositeBlockFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockFilter for CompositeBlockFilter {
    fn filter(&self, chunk: &mut RawChunk) -> Result<(), FilterError> {
        for f in &self.filters {
            f.filter(chunk)?;
        }
        Ok(())
    }

    fn pre_geometry_filter(
        &self,
        center: &mut RawChunk,
        neighbors: Neighbors<'_>,
    ) -> Result<(), FilterError> {
        for f in &self.filters {
            f.pre_geometry_filter(center, neighbors)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::block::{BlockId, ids};

    /// Replaces one block id with another everywhere.
    struct Swap(BlockId, BlockId);

    impl BlockFilter for Swap {
        fn filter(&self, chunk: &mut RawChunk) -> Result<(), FilterError> {
            for y in 0..4 {
                for z in 0..16 {
                    for x in 0..16 {
                        if chunk.block(x, y, z) == self.0 {
                            chunk.set_block(x, y, z, self.1);
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn composite_applies_in_registration_order() {
        let mut chunk = RawChunk::new(ChunkCoord::new(0, 0));
        chunk.set_block(0, 0, 0, ids::STONE);

        // STONE -> TORCH -> BED
        let forward = CompositeBlockFilter::new()
            .with(Swap(ids::STONE, ids::TORCH))
            .with(Swap(ids::TORCH, ids::BED));
        let mut a = chunk.clone();
        forward.filter(&mut a).unwrap();
        assert_eq!(a.block(0, 0, 0), ids::BED);

        // TORCH -> BED first finds nothing, then STONE -> TORCH.
        let reversed = CompositeBlockFilter::new()
            .with(Swap(ids::TORCH, ids::BED))
            .with(Swap(ids::STONE, ids::TORCH));
        let mut b = chunk.clone();
        reversed.filter(&mut b).unwrap();
        assert_eq!(b.block(0, 0, 0), ids::TORCH);
    }

    #[test]
    fn empty_composite_is_a_no_op() {
        let composite = CompositeBlockFilter::default();
        assert!(composite.is_empty());
        let mut chunk = RawChunk::new_filled(ChunkCoord::new(2, 2), ids::STONE);
        let before = chunk.clone();
        composite.filter(&mut chunk).unwrap();
        composite
            .pre_geometry_filter(&mut chunk, Neighbors::none())
            .unwrap();
        assert!(chunk.same_voxels(&before));
    }

    #[test]
    fn gather_uses_axis_convention() {
        let north = RawChunk::new(ChunkCoord::new(-1, 0));
        let west = RawChunk::new(ChunkCoord::new(0, 1));
        let neighbors = Neighbors::gather(ChunkCoord::new(0, 0), |c| {
            [&north, &west].into_iter().find(|chunk| chunk.coord() == c)
        });
        assert_eq!(neighbors.north.map(|c| c.coord()), Some(ChunkCoord::new(-1, 0)));
        assert_eq!(neighbors.west.map(|c| c.coord()), Some(ChunkCoord::new(0, 1)));
        assert!(neighbors.south.is_none());
        assert!(neighbors.east.is_none());
        for dir in Direction::ALL {
            let expected = [&north, &west]
                .into_iter()
                .find(|chunk| chunk.coord() == ChunkCoord::new(0, 0).neighbor(dir));
            assert_eq!(neighbors.get(dir).map(|c| c.coord()), expected.map(|c| c.coord()));
        }
    }

    #[test]
    fn boxed_filters_can_be_added_at_runtime() {
        let mut composite = CompositeBlockFilter::new();
        let chosen: Vec<Box<dyn BlockFilter>> = vec![
            Box::new(Swap(ids::STONE, ids::MINECART_TRACKS)),
            Box::new(NullBlockFilter),
        ];
        for filter in chosen {
            composite.add(filter);
        }
        assert_eq!(composite.len(), 2);

        let mut chunk = RawChunk::new_filled(ChunkCoord::new(0, 0), ids::STONE);
        composite.filter(&mut chunk).unwrap();
        assert_eq!(chunk.block(3, 2, 1), ids::MINECART_TRACKS);
        assert_eq!(chunk.block(3, 4, 1), ids::STONE);
    }
}
