//! Hides caves nobody has visited.
//!
//! Torches, beds, rails and redstone wire only exist where a player has been.
//! Each of those blocks seeds a distance field that is diffused across the
//! chunk and its four cardinal neighbors; underground voxels the field does
//! not reach strongly enough are filled with stone.

use super::surface::{SmoothedSurfaceHeights, SurfaceHeightEstimator};
use super::{BlockFilter, FilterError, Neighbors};
use crate::world::block::{ids, is_non_natural};
use crate::world::chunk::{CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH, RawChunk, VoxelMask};
use crate::world::position::Direction;

/// Value written at every non-natural block before diffusion.
pub const SEED_VALUE: u8 = 16;
/// Diffusion rounds per chunk.
pub const DIFFUSION_ROUNDS: usize = 8;
/// Voxels whose diffused value is below this are considered unexplored.
pub const EXPLORED_THRESHOLD: u8 = 10;

const GRID_X: usize = CHUNK_WIDTH * 3;
const GRID_Y: usize = CHUNK_HEIGHT;
const GRID_Z: usize = CHUNK_DEPTH * 3;

/// Distance field over a 3x3 chunk neighborhood (full height).
///
/// The center chunk sits at offset `(CHUNK_WIDTH, CHUNK_DEPTH)`. Diagonal
/// neighbors are never filled and stay zero.
#[derive(Clone)]
pub struct DistanceGrid {
    cells: Vec<u8>,
    /// Next round's values while diffusing.
    scratch: Vec<u8>,
}

impl DistanceGrid {
    pub fn new() -> Self {
        Self {
            cells: vec![0; GRID_X * GRID_Y * GRID_Z],
            scratch: vec![0; GRID_X * GRID_Y * GRID_Z],
        }
    }

    /// Where a neighbor chunk sits in the grid.
    const fn offset_of(dir: Direction) -> (usize, usize) {
        match dir {
            Direction::North => (0, CHUNK_DEPTH),
            Direction::South => (CHUNK_WIDTH * 2, CHUNK_DEPTH),
            Direction::East => (CHUNK_WIDTH, 0),
            Direction::West => (CHUNK_WIDTH, CHUNK_DEPTH * 2),
        }
    }

    #[inline]
    const fn index(x: usize, y: usize, z: usize) -> usize {
        (y * GRID_Z + z) * GRID_X + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> u8 {
        self.cells[Self::index(x, y, z)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, value: u8) {
        self.cells[Self::index(x, y, z)] = value;
    }

    /// Seed the chunk-sized block at `(x_offset, z_offset)` from a mask.
    pub fn seed(&mut self, mask: &VoxelMask, x_offset: usize, z_offset: usize) {
        for y in 0..CHUNK_HEIGHT {
            for z in 0..CHUNK_DEPTH {
                for x in 0..CHUNK_WIDTH {
                    let value = if mask.get(x, y, z) { SEED_VALUE } else { 0 };
                    self.set(x + x_offset, y, z + z_offset, value);
                }
            }
        }
    }

    /// One diffusion round over the interior cells.
    ///
    /// Every cell reads its six neighbors as they were at the start of the
    /// round, so a value travels exactly one cell per round. The outer faces,
    /// including the top and bottom layers, are never written.
    pub fn diffuse(&mut self) {
        let prev = &self.cells;
        let next = &mut self.scratch;
        next.copy_from_slice(prev);
        let at = |x: usize, y: usize, z: usize| prev[Self::index(x, y, z)];

        for y in 1..GRID_Y - 1 {
            for z in 1..GRID_Z - 1 {
                for x in 1..GRID_X - 1 {
                    let adjacent = at(x - 1, y, z)
                        .max(at(x + 1, y, z))
                        .max(at(x, y, z - 1))
                        .max(at(x, y, z + 1))
                        .max(at(x, y + 1, z))
                        .max(at(x, y - 1, z))
                        .saturating_sub(1);

                    let i = Self::index(x, y, z);
                    if adjacent > next[i] {
                        next[i] = adjacent;
                    }
                }
            }
        }
        std::mem::swap(&mut self.cells, &mut self.scratch);
    }
}

impl Default for DistanceGrid {
    fn default() -> Self {
        Self::new()
    }
}

/// See the module docs.
pub struct ExploredCaveFilter<S = SmoothedSurfaceHeights> {
    surface: S,
}

impl ExploredCaveFilter {
    pub fn new() -> Self {
        Self {
            surface: SmoothedSurfaceHeights,
        }
    }
}

impl Default for ExploredCaveFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SurfaceHeightEstimator> ExploredCaveFilter<S> {
    pub fn with_estimator(surface: S) -> Self {
        Self { surface }
    }

    fn mask_of(chunk: &RawChunk) -> Result<&VoxelMask, FilterError> {
        chunk
            .non_natural_mask()
            .ok_or(FilterError::MissingNonNaturalMask {
                chunk: chunk.coord(),
            })
    }
}

impl<S: SurfaceHeightEstimator> BlockFilter for ExploredCaveFilter<S> {
    fn filter(&self, chunk: &mut RawChunk) -> Result<(), FilterError> {
        let mut mask = VoxelMask::new();
        for y in 0..CHUNK_HEIGHT {
            for z in 0..CHUNK_DEPTH {
                for x in 0..CHUNK_WIDTH {
                    if is_non_natural(chunk.block(x, y, z)) {
                        mask.set(x, y, z, true);
                    }
                }
            }
        }
        chunk.set_non_natural_mask(mask);
        Ok(())
    }

    fn pre_geometry_filter(
        &self,
        center: &mut RawChunk,
        neighbors: Neighbors<'_>,
    ) -> Result<(), FilterError> {
        let mut grid = DistanceGrid::new();
        grid.seed(Self::mask_of(center)?, CHUNK_WIDTH, CHUNK_DEPTH);

        for dir in Direction::ALL {
            if let Some(chunk) = neighbors.get(dir) {
                let (x_offset, z_offset) = DistanceGrid::offset_of(dir);
                grid.seed(Self::mask_of(chunk)?, x_offset, z_offset);
            }
        }

        for _ in 0..DIFFUSION_ROUNDS {
            grid.diffuse();
        }

        let heights = self.surface.surface_heights(center);

        let mut filled = 0usize;
        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_DEPTH {
                let surface = heights[x][z];
                for y in 0..=surface.min(CHUNK_HEIGHT - 1) {
                    let dist = grid.get(x + CHUNK_WIDTH, y, z + CHUNK_DEPTH);
                    if dist < EXPLORED_THRESHOLD && center.block(x, y, z) != ids::STONE {
                        center.set_block(x, y, z, ids::STONE);
                        filled += 1;
                    }
                }
            }
        }

        let coord = center.coord();
        tracing::trace!("Cave filter on ({}, {}): {} voxels filled", coord.x, coord.z, filled);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::block::BlockId;
    use crate::world::position::ChunkCoord;

    #[test]
    fn diffusion_is_bounded_by_round_count() {
        let mut grid = DistanceGrid::new();
        grid.set(24, 128, 24, SEED_VALUE);
        for _ in 0..DIFFUSION_ROUNDS {
            grid.diffuse();
        }

        assert_eq!(grid.get(24, 128, 24), 16);
        assert_eq!(grid.get(29, 128, 24), 11);
        assert_eq!(grid.get(24, 128, 19), 11);
        assert_eq!(grid.get(26, 131, 24), 11); // 2 along x, 3 along y
        assert_eq!(grid.get(32, 128, 24), 8);
        assert_eq!(grid.get(33, 128, 24), 0);
        assert_eq!(grid.get(24, 137, 24), 0);
    }

    #[test]
    fn diffusion_skips_top_and_bottom_layers() {
        let mut grid = DistanceGrid::new();
        grid.set(24, 1, 24, SEED_VALUE);
        grid.set(24, GRID_Y - 2, 24, SEED_VALUE);
        grid.diffuse();
        assert_eq!(grid.get(24, 0, 24), 0);
        assert_eq!(grid.get(24, GRID_Y - 1, 24), 0);
        assert_eq!(grid.get(24, 2, 24), 15);
    }

    #[test]
    fn values_persist_across_buffer_swaps() {
        let mut grid = DistanceGrid::new();
        // Face cells are never written but still feed the interior.
        grid.set(0, 128, 24, SEED_VALUE);
        grid.diffuse();
        grid.diffuse();
        assert_eq!(grid.get(0, 128, 24), 16);
        assert_eq!(grid.get(1, 128, 24), 15);
        assert_eq!(grid.get(2, 128, 24), 14);

        grid.set(40, 100, 40, SEED_VALUE);
        grid.diffuse();
        assert_eq!(grid.get(40, 100, 40), 16);
        assert_eq!(grid.get(41, 100, 40), 15);
        assert_eq!(grid.get(0, 128, 24), 16);
        assert_eq!(grid.get(3, 128, 24), 13);
        assert_eq!(grid.get(1, 128, 24), 15);
    }

    #[test]
    fn single_chunk_pass_marks_player_blocks() {
        let mut chunk = RawChunk::new(ChunkCoord::new(0, 0));
        chunk.set_block(1, 2, 3, ids::TORCH);
        chunk.set_block(4, 5, 6, ids::REDSTONE_WIRE);
        chunk.set_block(7, 8, 9, ids::STONE);

        ExploredCaveFilter::new().filter(&mut chunk).unwrap();

        let mask = chunk.non_natural_mask().unwrap();
        assert!(mask.get(1, 2, 3));
        assert!(mask.get(4, 5, 6));
        assert!(!mask.get(7, 8, 9));
        assert_eq!(mask.count_set(), 2);
    }

    #[test]
    fn cross_chunk_pass_needs_the_center_mask() {
        let mut chunk = RawChunk::new(ChunkCoord::new(3, -2));
        let err = ExploredCaveFilter::new()
            .pre_geometry_filter(&mut chunk, Neighbors::none())
            .unwrap_err();
        assert!(matches!(
            err,
            FilterError::MissingNonNaturalMask { chunk } if chunk == ChunkCoord::new(3, -2)
        ));
    }

    #[test]
    fn cross_chunk_pass_needs_neighbor_masks() {
        let filter = ExploredCaveFilter::new();
        let mut center = RawChunk::new(ChunkCoord::new(0, 0));
        filter.filter(&mut center).unwrap();
        let south = RawChunk::new(ChunkCoord::new(1, 0));

        let err = filter
            .pre_geometry_filter(
                &mut center,
                Neighbors {
                    south: Some(&south),
                    ..Neighbors::none()
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            FilterError::MissingNonNaturalMask { chunk } if chunk == ChunkCoord::new(1, 0)
        ));
    }

    #[test]
    fn above_surface_voxels_are_left_alone() {
        // Air chunk: surface estimate is 0, so only y=0 may be filled.
        let filter = ExploredCaveFilter::new();
        let mut chunk = RawChunk::new(ChunkCoord::new(0, 0));
        filter.filter(&mut chunk).unwrap();
        filter
            .pre_geometry_filter(&mut chunk, Neighbors::none())
            .unwrap();
        assert_eq!(chunk.block(5, 0, 5), ids::STONE);
        assert_eq!(chunk.block(5, 1, 5), BlockId::AIR);
        assert_eq!(chunk.block(5, 200, 5), BlockId::AIR);
    }
}
