//! Turning a world scan into dirty tiles, and reading them back.

use std::collections::BTreeSet;
use std::time::Instant;

use anyhow::{Context, Result};
use cartograph_engine::batch::mark_dirty;
use cartograph_engine::tiles::{DiskBackedTileSet, DiskBackedTileSetFactory};
use cartograph_engine::world::position::{ChunkCoord, TileCoord};

use crate::config::Config;
use crate::region_scan;

/// Counts from one `plan` run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub regions: usize,
    pub skipped_regions: usize,
    pub chunks: usize,
    pub tiles: usize,
    pub new_tiles: usize,
}

/// The tile holding `chunk` when tiles are `tile_size_chunks` chunks across.
pub fn tile_of(chunk: ChunkCoord, tile_size_chunks: u32) -> TileCoord {
    let size = tile_size_chunks as i32;
    TileCoord::new(chunk.x.div_euclid(size), chunk.z.div_euclid(size))
}

fn open_list(config: &Config) -> Result<DiskBackedTileSet> {
    let factory = DiskBackedTileSetFactory::new(&config.cache_dir)
        .with_context(|| format!("opening tile cache {}", config.cache_dir.display()))?;
    factory
        .create_list(&config.list_name)
        .with_context(|| format!("opening tile list {:?}", config.list_name))
}

/// Scan every region the subset selects and mark the tiles of its chunks dirty.
///
/// Unreadable regions are logged and skipped.
pub fn plan(config: &Config) -> Result<PlanSummary> {
    let start = Instant::now();
    let subset = config.subset.build();
    let dimension_dir = config.dimension_dir();
    tracing::info!("Planning {} over {}", subset.description(), dimension_dir.display());

    let tiles = open_list(config)?;
    let mut summary = PlanSummary::default();
    let mut dirty = BTreeSet::new();

    for region in subset.create_region_iterator(config.save_format.into(), &dimension_dir) {
        let chunks = match region_scan::present_chunks(&region) {
            Ok(chunks) => chunks,
            Err(e) => {
                tracing::warn!("Skipping region {}: {:#}", region.path.display(), e);
                summary.skipped_regions += 1;
                continue;
            }
        };
        summary.regions += 1;
        for chunk in chunks.into_iter().filter(|&c| subset.contains(c)) {
            summary.chunks += 1;
            dirty.insert(tile_of(chunk, config.tile_size_chunks));
        }
    }

    let dirty: Vec<TileCoord> = dirty.into_iter().collect();
    summary.tiles = dirty.len();
    summary.new_tiles = mark_dirty(&tiles, &dirty)
        .with_context(|| format!("recording dirty tiles in {}", tiles.dir().display()))?;

    tracing::info!(
        "Planned {} tiles ({} new) from {} chunks in {} regions ({:.2?})",
        summary.tiles,
        summary.new_tiles,
        summary.chunks,
        summary.regions,
        start.elapsed(),
    );
    Ok(summary)
}

/// Dirty tiles in render order, with their bounds.
#[derive(Debug, Default)]
pub struct Listing {
    pub tiles: Vec<TileCoord>,
    pub bounds: Option<(TileCoord, TileCoord)>,
}

pub fn list(config: &Config) -> Result<Listing> {
    let set = open_list(config)?;
    let mut tiles: Vec<TileCoord> = set
        .iter()
        .with_context(|| format!("reading tile list {}", set.dir().display()))?
        .collect();
    tiles.sort_by_key(|t| (t.z_order(), t.y, t.x));
    let bounds = set
        .bounds()
        .with_context(|| format!("reading tile list {}", set.dir().display()))?;
    Ok(Listing { tiles, bounds })
}
