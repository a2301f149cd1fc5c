use std::collections::HashMap;
use std::time::Instant;

use rayon::prelude::*;

use crate::filter::{BlockFilter, FilterError, Neighbors};
use crate::tiles::{DiskBackedTileSet, TileSetError};
use crate::world::ChunkSource;
use crate::world::chunk::RawChunk;
use crate::world::position::{ChunkCoord, TileCoord};

/// Outcome of one batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Chunks handed to the batch.
    pub processed: usize,
    /// Chunks that failed either pass, with the first error each hit.
    pub failures: Vec<(ChunkCoord, FilterError)>,
}

impl BatchReport {
    pub fn ok_count(&self) -> usize {
        self.processed - self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs both filter passes over a batch of chunks with a barrier in between.
///
/// Every chunk gets its own filter from `filter_for`, used for both passes.
pub struct BatchRunner<F> {
    filter_for: F,
}

impl<F> BatchRunner<F>
where
    F: Fn(ChunkCoord) -> Box<dyn BlockFilter> + Sync,
{
    pub fn new(filter_for: F) -> Self {
        Self { filter_for }
    }

    /// Filter `chunks` and return the ones that made it through, in input order.
    ///
    /// Phase 1 mutates chunks in place, in parallel. Phase 2 reads an
    /// immutable snapshot of phase 1 output and writes into copies, so no
    /// chunk sees a neighbor that is half way through its cross-chunk pass.
    /// Chunks that fail phase 1 are absent neighbors in phase 2.
    pub fn run(&self, chunks: Vec<RawChunk>) -> (Vec<RawChunk>, BatchReport) {
        let start = Instant::now();
        let mut report = BatchReport {
            processed: chunks.len(),
            failures: Vec::new(),
        };

        let mut jobs: Vec<(RawChunk, Box<dyn BlockFilter>)> = chunks
            .into_iter()
            .map(|chunk| {
                let filter = (self.filter_for)(chunk.coord());
                (chunk, filter)
            })
            .collect();

        // ── Phase 1: single-chunk pass ──────────────────────────────────
        let phase1: Vec<Result<(), FilterError>> = jobs
            .par_iter_mut()
            .map(|(chunk, filter)| filter.filter(chunk))
            .collect();

        let mut passed = Vec::with_capacity(jobs.len());
        for ((chunk, filter), outcome) in jobs.into_iter().zip(phase1) {
            match outcome {
                Ok(()) => passed.push((chunk, filter)),
                Err(e) => {
                    tracing::warn!(
                        "Chunk ({}, {}) failed filtering: {}",
                        chunk.coord().x,
                        chunk.coord().z,
                        e
                    );
                    report.failures.push((chunk.coord(), e));
                }
            }
        }

        // ── Phase 2: cross-chunk pass against the snapshot ──────────────
        let snapshot: HashMap<ChunkCoord, &RawChunk> = passed
            .iter()
            .map(|(chunk, _)| (chunk.coord(), chunk))
            .collect();

        let phase2: Vec<Result<RawChunk, FilterError>> = passed
            .par_iter()
            .map(|(chunk, filter)| {
                let mut center = chunk.clone();
                let neighbors = Neighbors::gather(chunk.coord(), |c| snapshot.get(&c).copied());
                filter
                    .pre_geometry_filter(&mut center, neighbors)
                    .map(|()| center)
            })
            .collect();

        let mut done = Vec::with_capacity(phase2.len());
        for ((chunk, _), outcome) in passed.iter().zip(phase2) {
            match outcome {
                Ok(filtered) => done.push(filtered),
                Err(e) => {
                    tracing::warn!(
                        "Chunk ({}, {}) failed cross-chunk filtering: {}",
                        chunk.coord().x,
                        chunk.coord().z,
                        e
                    );
                    report.failures.push((chunk.coord(), e));
                }
            }
        }

        tracing::info!(
            "Filtered {}/{} chunks in {:.1?}",
            done.len(),
            report.processed,
            start.elapsed()
        );
        (done, report)
    }

    /// Load `coords` from `source` and run them as one batch.
    ///
    /// Coordinates with no chunk behind them are skipped and not counted.
    pub fn load_and_run(
        &self,
        source: &impl ChunkSource,
        coords: &[ChunkCoord],
    ) -> (Vec<RawChunk>, BatchReport) {
        let chunks: Vec<RawChunk> = coords.par_iter().filter_map(|&c| source.load(c)).collect();
        tracing::debug!("Loaded {}/{} chunks", chunks.len(), coords.len());
        self.run(chunks)
    }
}

/// Add `coords` to `tiles` in parallel. Returns how many were new.
pub fn mark_dirty(tiles: &DiskBackedTileSet, coords: &[TileCoord]) -> Result<usize, TileSetError> {
    coords
        .par_iter()
        .map(|&coord| tiles.add(coord).map(usize::from))
        .try_reduce(|| 0, |a, b| Ok(a + b))
}
