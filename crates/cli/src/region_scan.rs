//! Which chunks a region file actually holds.
//!
//! Only the region's chunk table and compressed payloads are touched; the
//! chunk NBT itself is never parsed.

use std::fs;

use anyhow::{Context, Result};
use cartograph_engine::subset::RegionFile;
use cartograph_engine::world::position::{ChunkCoord, REGION_WIDTH_IN_CHUNKS};

/// Chunks present in `region`, in row order (z outer, x inner).
pub fn present_chunks(region: &RegionFile) -> Result<Vec<ChunkCoord>> {
    let (rx, rz) = (region.coord.x, region.coord.z);
    let path = &region.path;

    let len = fs::metadata(path)
        .with_context(|| format!("reading metadata of {}", path.display()))?
        .len();
    if len == 0 {
        tracing::debug!("Region r.{}.{} is empty", rx, rz);
        return Ok(Vec::new());
    }

    let file = fs::File::open(path)
        .with_context(|| format!("opening region file {}", path.display()))?;
    let mut reader = fastanvil::Region::from_stream(file)
        .with_context(|| format!("parsing region file {}", path.display()))?;

    let width = REGION_WIDTH_IN_CHUNKS as usize;
    let mut present = Vec::new();
    for z in 0..width {
        for x in 0..width {
            let chunk = reader
                .read_chunk(x, z)
                .with_context(|| format!("reading chunk ({}, {}) from r.{}.{}", x, z, rx, rz))?;
            if chunk.is_some() {
                present.push(region.coord.chunk(x, z));
            }
        }
    }

    tracing::debug!("Region r.{}.{} holds {} chunks", rx, rz, present.len());
    Ok(present)
}

/// Write a region file holding placeholder payloads at the given local slots.
#[cfg(test)]
pub(crate) fn write_region(path: &std::path::Path, slots: &[(usize, usize)]) {
    use std::io::{Cursor, Seek};

    let mut region = fastanvil::Region::new(Cursor::new(Vec::new())).unwrap();
    for &(x, z) in slots {
        region.write_chunk(x, z, b"placeholder chunk").unwrap();
    }
    let mut cursor = region.into_inner().unwrap();
    let len = cursor.stream_position().unwrap();
    let data = cursor.into_inner();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, &data[..len as usize]).unwrap();
}
