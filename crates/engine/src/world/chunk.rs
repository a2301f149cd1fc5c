use super::block::BlockId;
use super::position::ChunkCoord;

/// Blocks along x in one chunk.
pub const CHUNK_WIDTH: usize = 16;
/// Blocks along y in one chunk.
pub const CHUNK_HEIGHT: usize = 256;
/// Blocks along z in one chunk.
pub const CHUNK_DEPTH: usize = 16;
/// Total voxel count in one chunk.
pub const CHUNK_VOLUME: usize = CHUNK_WIDTH * CHUNK_HEIGHT * CHUNK_DEPTH;

/// Sky light written into columns that have been cropped away.
pub const FULL_SKY_LIGHT: u8 = 16;

#[inline]
const fn index(x: usize, y: usize, z: usize) -> usize {
    (y * CHUNK_DEPTH + z) * CHUNK_WIDTH + x
}

/// One boolean per voxel of a chunk, packed into words.
#[derive(Clone, PartialEq, Eq)]
pub struct VoxelMask {
    bits: Box<[u64]>,
}

impl VoxelMask {
    pub fn new() -> Self {
        Self {
            bits: vec![0u64; CHUNK_VOLUME.div_ceil(64)].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> bool {
        let i = index(x, y, z);
        self.bits[i / 64] & (1u64 << (i % 64)) != 0
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, value: bool) {
        let i = index(x, y, z);
        if value {
            self.bits[i / 64] |= 1u64 << (i % 64);
        } else {
            self.bits[i / 64] &= !(1u64 << (i % 64));
        }
    }

    pub fn count_set(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }
}

impl Default for VoxelMask {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VoxelMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoxelMask")
            .field("set", &self.count_set())
            .finish()
    }
}

/// A decoded chunk as handed to the filters: block ids, sky light, and the
/// attachments filters publish for their neighbors.
///
/// Stored as flat arrays in YZX order (x varies fastest).
#[derive(Clone)]
pub struct RawChunk {
    coord: ChunkCoord,
    blocks: Box<[BlockId]>,
    sky_light: Box<[u8]>,
    /// Published by the explored-cave filter's single-chunk pass, read by the
    /// cross-chunk pass of this chunk and its neighbors.
    non_natural: Option<VoxelMask>,
}

impl RawChunk {
    /// An all-air chunk with no sky light.
    pub fn new(coord: ChunkCoord) -> Self {
        Self::new_filled(coord, BlockId::AIR)
    }

    pub fn new_filled(coord: ChunkCoord, block: BlockId) -> Self {
        Self {
            coord,
            blocks: vec![block; CHUNK_VOLUME].into_boxed_slice(),
            sky_light: vec![0u8; CHUNK_VOLUME].into_boxed_slice(),
            non_natural: None,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    #[inline]
    pub fn block(&self, x: usize, y: usize, z: usize) -> BlockId {
        self.blocks[index(x, y, z)]
    }

    #[inline]
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, block: BlockId) {
        self.blocks[index(x, y, z)] = block;
    }

    #[inline]
    pub fn sky_light(&self, x: usize, y: usize, z: usize) -> u8 {
        self.sky_light[index(x, y, z)]
    }

    #[inline]
    pub fn set_sky_light(&mut self, x: usize, y: usize, z: usize, light: u8) {
        self.sky_light[index(x, y, z)] = light;
    }

    pub fn non_natural_mask(&self) -> Option<&VoxelMask> {
        self.non_natural.as_ref()
    }

    pub fn set_non_natural_mask(&mut self, mask: VoxelMask) {
        self.non_natural = Some(mask);
    }

    /// Whether the two chunks hold the same blocks and light, ignoring attachments.
    pub fn same_voxels(&self, other: &RawChunk) -> bool {
        self.blocks == other.blocks && self.sky_light == other.sky_light
    }
}

impl std::fmt::Debug for RawChunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawChunk")
            .field("coord", &self.coord)
            .field("non_natural", &self.non_natural)
            .finish_non_exhaustive()
    }
}
