//! Enumerating region files of a dimension.

use std::fs;
use std::path::{Path, PathBuf};

use super::SaveFormat;
use crate::world::chunk::{CHUNK_DEPTH, CHUNK_WIDTH};
use crate::world::position::{REGION_WIDTH_IN_CHUNKS, RegionCoord, WorldPos};

/// Blocks along one edge of a region.
const REGION_EDGE_BLOCKS: i64 = REGION_WIDTH_IN_CHUNKS as i64 * CHUNK_WIDTH as i64;

/// A region file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionFile {
    pub coord: RegionCoord,
    pub path: PathBuf,
}

/// Lazily yields the region files a subset cares about.
///
/// Finite; build a new one to start over.
#[derive(Debug)]
pub enum RegionIterator {
    All(AllRegions),
    Circular(CircularRegions),
}

impl RegionIterator {
    /// The dimension directory being walked.
    pub fn base_dir(&self) -> &Path {
        match self {
            RegionIterator::All(it) => &it.base_dir,
            RegionIterator::Circular(it) => &it.base_dir,
        }
    }
}

impl Iterator for RegionIterator {
    type Item = RegionFile;

    fn next(&mut self) -> Option<RegionFile> {
        match self {
            RegionIterator::All(it) => it.next(),
            RegionIterator::Circular(it) => it.next(),
        }
    }
}

/// Every region file of the given format, ordered by z then x.
#[derive(Debug)]
pub struct AllRegions {
    base_dir: PathBuf,
    files: std::vec::IntoIter<RegionFile>,
}

impl AllRegions {
    pub fn new(base_dir: &Path, format: SaveFormat) -> Self {
        let region_dir = base_dir.join("region");
        let mut files = Vec::new();

        match fs::read_dir(&region_dir) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if !path.is_file() {
                        continue;
                    }
                    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                        continue;
                    };
                    if !name.ends_with(format.extension()) {
                        continue;
                    }
                    match RegionCoord::from_file_name(name, format.extension()) {
                        Some(coord) => files.push(RegionFile { coord, path }),
                        None => tracing::warn!("Skipping unexpected file in region dir: {}", name),
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Cannot list region dir {}: {}", region_dir.display(), e);
            }
        }

        files.sort_by_key(|f| (f.coord.z, f.coord.x));
        tracing::debug!("Found {} region files in {}", files.len(), region_dir.display());

        Self {
            base_dir: base_dir.to_path_buf(),
            files: files.into_iter(),
        }
    }
}

impl Iterator for AllRegions {
    type Item = RegionFile;

    fn next(&mut self) -> Option<RegionFile> {
        self.files.next()
    }
}

/// Region files whose center lies near a circle, walked row by row
/// (z outer, x inner) over the bounding square of candidate regions.
#[derive(Debug)]
pub struct CircularRegions {
    base_dir: PathBuf,
    format: SaveFormat,
    origin: WorldPos,
    radius: i64,
    min_x: i64,
    max_x: i64,
    max_z: i64,
    current_x: i64,
    current_z: i64,
}

impl CircularRegions {
    pub fn new(base_dir: &Path, format: SaveFormat, origin: WorldPos, radius: i64) -> Self {
        let radius_in_regions = radius / REGION_EDGE_BLOCKS + 1;
        let origin_x = origin.x.div_euclid(REGION_EDGE_BLOCKS);
        let origin_z = origin.z.div_euclid(REGION_EDGE_BLOCKS);

        Self {
            base_dir: base_dir.to_path_buf(),
            format,
            origin,
            radius,
            min_x: origin_x - radius_in_regions,
            max_x: origin_x + radius_in_regions,
            max_z: origin_z + radius_in_regions,
            current_x: origin_x - radius_in_regions - 1,
            current_z: origin_z - radius_in_regions,
        }
    }

    /// Whether region `(rx, rz)` can overlap the circle.
    fn in_range(&self, rx: i64, rz: i64) -> bool {
        let center_of = |r: i64| {
            r.saturating_mul(REGION_EDGE_BLOCKS)
                .saturating_add(REGION_EDGE_BLOCKS / 2)
        };
        let center = WorldPos::new(center_of(rx), center_of(rz));
        let diagonal = ((2 * REGION_EDGE_BLOCKS * REGION_EDGE_BLOCKS) as f64).sqrt() as i64;
        self.origin.separation(&center) <= self.radius.saturating_add(diagonal / 2)
    }
}

impl Iterator for CircularRegions {
    type Item = RegionFile;

    fn next(&mut self) -> Option<RegionFile> {
        if self.radius < 0 {
            return None;
        }
        loop {
            self.current_x += 1;
            if self.current_x > self.max_x {
                self.current_x = self.min_x;
                self.current_z += 1;
            }
            if self.current_z > self.max_z {
                return None;
            }

            let (rx, rz) = (self.current_x, self.current_z);
            if !self.in_range(rx, rz) {
                continue;
            }
            let (Ok(x), Ok(z)) = (i32::try_from(rx), i32::try_from(rz)) else {
                continue;
            };
            let path = self
                .base_dir
                .join("region")
                .join(format!("r.{}.{}.{}", x, z, self.format.extension()));
            if path.is_file() {
                return Some(RegionFile {
                    coord: RegionCoord::new(x, z),
                    path,
                });
            }
        }
    }
}
