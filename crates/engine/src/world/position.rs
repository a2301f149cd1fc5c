use super::chunk::{CHUNK_DEPTH, CHUNK_WIDTH};

/// Number of chunks along each axis of a region file.
pub const REGION_WIDTH_IN_CHUNKS: i32 = 32;

/// One cell of the output tile pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Morton key: bits of x on even positions, bits of y on odd positions.
    ///
    /// Sorting by this key keeps spatially close tiles close in render order.
    pub fn z_order(&self) -> u64 {
        let x = self.x as u32 as u64;
        let y = self.y as u32 as u64;
        let mut key = 0u64;
        for i in 0..32 {
            key |= ((x >> i) & 1) << (i * 2);
            key |= ((y >> i) & 1) << (i * 2 + 1);
        }
        key
    }
}

/// Chunk column position (each chunk is `CHUNK_WIDTH` x `CHUNK_DEPTH` blocks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

/// Cardinal directions between chunks.
///
/// North/south run along x, east/west along z: north is `-x`, south `+x`,
/// east `-z`, west `+z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];
}

impl ChunkCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// World-space position of the chunk's minimum corner.
    pub const fn block_origin(&self) -> WorldPos {
        WorldPos::new(
            self.x as i64 * CHUNK_WIDTH as i64,
            self.z as i64 * CHUNK_DEPTH as i64,
        )
    }

    /// The region file this chunk is stored in.
    pub const fn region(&self) -> RegionCoord {
        RegionCoord {
            x: self.x.div_euclid(REGION_WIDTH_IN_CHUNKS),
            z: self.z.div_euclid(REGION_WIDTH_IN_CHUNKS),
        }
    }

    pub const fn neighbor(&self, dir: Direction) -> ChunkCoord {
        match dir {
            Direction::North => Self::new(self.x - 1, self.z),
            Direction::South => Self::new(self.x + 1, self.z),
            Direction::East => Self::new(self.x, self.z - 1),
            Direction::West => Self::new(self.x, self.z + 1),
        }
    }
}

/// Position of a region file (32x32 chunks), as in `r.<x>.<z>.mca`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionCoord {
    pub x: i32,
    pub z: i32,
}

impl RegionCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Absolute coordinate of the chunk at `(local_x, local_z)` inside this region.
    pub const fn chunk(&self, local_x: usize, local_z: usize) -> ChunkCoord {
        ChunkCoord::new(
            self.x * REGION_WIDTH_IN_CHUNKS + local_x as i32,
            self.z * REGION_WIDTH_IN_CHUNKS + local_z as i32,
        )
    }

    /// Parse a region file name such as `r.0.-1.mca`, requiring extension `ext`.
    pub fn from_file_name(name: &str, ext: &str) -> Option<Self> {
        let rest = name.strip_prefix("r.")?;
        let rest = rest.strip_suffix(ext)?.strip_suffix('.')?;
        let (x, z) = rest.split_once('.')?;
        Some(Self::new(x.parse().ok()?, z.parse().ok()?))
    }
}

/// World-space column position in blocks. Height is irrelevant to subsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WorldPos {
    pub x: i64,
    pub z: i64,
}

impl WorldPos {
    pub const fn new(x: i64, z: i64) -> Self {
        Self { x, z }
    }

    /// Euclidean distance to `other`, truncated to an integer.
    pub fn separation(&self, other: &WorldPos) -> i64 {
        let dx = (self.x - other.x) as f64;
        let dz = (self.z - other.z) as f64;
        (dx * dx + dz * dz).sqrt() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_chunks_map_to_negative_regions() {
        assert_eq!(ChunkCoord::new(-1, 0).region(), RegionCoord::new(-1, 0));
        assert_eq!(ChunkCoord::new(-32, 31).region(), RegionCoord::new(-1, 0));
        assert_eq!(ChunkCoord::new(-33, 32).region(), RegionCoord::new(-2, 1));
    }

    #[test]
    fn region_file_names() {
        assert_eq!(
            RegionCoord::from_file_name("r.0.-1.mca", "mca"),
            Some(RegionCoord::new(0, -1))
        );
        assert_eq!(RegionCoord::from_file_name("r.0.-1.mcr", "mca"), None);
        assert_eq!(RegionCoord::from_file_name("r.a.1.mca", "mca"), None);
        assert_eq!(RegionCoord::from_file_name("level.dat", "mca"), None);
        assert_eq!(
            RegionCoord::new(-1, 2).chunk(3, 4),
            ChunkCoord::new(-29, 68)
        );
    }

    #[test]
    fn z_order_interleaves_bits() {
        assert_eq!(TileCoord::new(0, 0).z_order(), 0);
        assert_eq!(TileCoord::new(1, 0).z_order(), 0b01);
        assert_eq!(TileCoord::new(0, 1).z_order(), 0b10);
        assert_eq!(TileCoord::new(3, 3).z_order(), 0b1111);
        assert!(TileCoord::new(1, 1).z_order() < TileCoord::new(2, 0).z_order());
    }

    #[test]
    fn neighbors_follow_axis_convention() {
        let c = ChunkCoord::new(5, -5);
        assert_eq!(c.neighbor(Direction::North), ChunkCoord::new(4, -5));
        assert_eq!(c.neighbor(Direction::South), ChunkCoord::new(6, -5));
        assert_eq!(c.neighbor(Direction::East), ChunkCoord::new(5, -6));
        assert_eq!(c.neighbor(Direction::West), ChunkCoord::new(5, -4));
    }

    #[test]
    fn separation_truncates() {
        let a = WorldPos::new(0, 0);
        assert_eq!(a.separation(&WorldPos::new(3, 4)), 5);
        assert_eq!(a.separation(&WorldPos::new(1, 1)), 1);
        assert_eq!(a.separation(&WorldPos::new(-10, 0)), 10);
    }
}
