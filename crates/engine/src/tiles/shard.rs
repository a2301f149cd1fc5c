//! Shard files: append-only runs of fixed-size tile records.
//!
//! Record layout (little-endian): magic `u32`, x `i32`, y `i32`.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

use crate::world::position::TileCoord;

/// Tiles per shard along each axis.
pub const SHARD_SPAN: i32 = 32;

/// Marks the start of every record.
pub const RECORD_MAGIC: u32 = 0xC0DE_BABE;

/// Bytes per record.
pub const RECORD_LEN: usize = 12;

const EXTENSION: &str = "tiles";

/// Spatial bucket a tile is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShardKey {
    pub bx: i32,
    pub by: i32,
}

impl ShardKey {
    pub const fn of(coord: TileCoord) -> Self {
        Self {
            bx: coord.x.div_euclid(SHARD_SPAN),
            by: coord.y.div_euclid(SHARD_SPAN),
        }
    }

    pub fn file_name(&self) -> String {
        format!("s.{}.{}.{}", self.bx, self.by, EXTENSION)
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        let rest = name.strip_prefix("s.")?.strip_suffix(EXTENSION)?.strip_suffix('.')?;
        let (bx, by) = rest.split_once('.')?;
        Some(Self {
            bx: bx.parse().ok()?,
            by: by.parse().ok()?,
        })
    }
}

pub fn encode(coord: TileCoord) -> [u8; RECORD_LEN] {
    let mut buf = [0u8; RECORD_LEN];
    buf[0..4].copy_from_slice(&RECORD_MAGIC.to_le_bytes());
    buf[4..8].copy_from_slice(&coord.x.to_le_bytes());
    buf[8..12].copy_from_slice(&coord.y.to_le_bytes());
    buf
}

fn decode(record: &[u8]) -> Option<TileCoord> {
    let word = |at: usize| [record[at], record[at + 1], record[at + 2], record[at + 3]];
    if u32::from_le_bytes(word(0)) != RECORD_MAGIC {
        return None;
    }
    Some(TileCoord::new(
        i32::from_le_bytes(word(4)),
        i32::from_le_bytes(word(8)),
    ))
}

/// Decoded contents of one shard file.
#[derive(Debug, Default)]
pub struct ShardContents {
    pub tiles: Vec<TileCoord>,
    /// Length of the file rounded down to whole records, in bytes.
    pub record_bytes: u64,
    /// Whole records skipped for a bad magic.
    pub corrupt_records: usize,
    /// Bytes of a trailing partial record.
    pub torn_tail: usize,
}

impl ShardContents {
    /// Decode every whole record, skipping ones with a bad magic.
    ///
    /// A trailing partial record is treated as absent.
    pub fn parse(bytes: &[u8], path: &Path) -> Self {
        let mut contents = ShardContents::default();
        let mut records = bytes.chunks_exact(RECORD_LEN);
        for (i, record) in (&mut records).enumerate() {
            match decode(record) {
                Some(coord) => contents.tiles.push(coord),
                None => {
                    tracing::warn!(
                        "Corrupt record in tile shard {} at byte {}; skipping it",
                        path.display(),
                        i * RECORD_LEN,
                    );
                    contents.corrupt_records += 1;
                }
            }
        }
        contents.torn_tail = records.remainder().len();
        contents.record_bytes = (bytes.len() - contents.torn_tail) as u64;
        if contents.torn_tail > 0 {
            tracing::warn!(
                "Tile shard {} ends in a partial record ({} bytes); ignoring it",
                path.display(),
                contents.torn_tail,
            );
        }
        contents
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        self.tiles.contains(&coord)
    }
}

/// Read and decode a whole shard.
pub fn read(path: &Path) -> io::Result<ShardContents> {
    let bytes = std::fs::read(path)?;
    Ok(ShardContents::parse(&bytes, path))
}

/// Append `coord` to the shard at `path` unless it is already there.
///
/// A torn tail is cut off before appending. A shard with corrupt records is
/// rewritten from the records that still decode. Returns whether the
/// coordinate was added. The caller must hold the shard's lock.
pub fn insert(path: &Path, coord: TileCoord) -> io::Result<bool> {
    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)?;

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    let contents = ShardContents::parse(&bytes, path);
    if contents.contains(coord) {
        return Ok(false);
    }

    if contents.corrupt_records > 0 {
        drop(file);
        let mut tiles = contents.tiles;
        tiles.push(coord);
        rewrite(path, &tiles)?;
        return Ok(true);
    }
    if contents.torn_tail > 0 {
        file.set_len(contents.record_bytes)?;
    }
    file.write_all(&encode(coord))?;
    file.sync_data()?;
    Ok(true)
}

/// Replace the shard with `tiles`, dropping repeats.
///
/// The new contents go to a sibling file first and are renamed over the
/// shard, so a crash leaves either the old or the new shard.
fn rewrite(path: &Path, tiles: &[TileCoord]) -> io::Result<()> {
    let mut seen = HashSet::with_capacity(tiles.len());
    let mut bytes = Vec::with_capacity(tiles.len() * RECORD_LEN);
    for &coord in tiles {
        if seen.insert(coord) {
            bytes.extend_from_slice(&encode(coord));
        }
    }

    let staging = path.with_extension(format!("{EXTENSION}.tmp"));
    let mut file = File::create(&staging)?;
    file.write_all(&bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(&staging, path)?;
    tracing::info!(
        "Rewrote tile shard {} with {} records",
        path.display(),
        seen.len()
    );
    Ok(())
}
