//! Disk-resident sets of dirty tile coordinates.
//!
//! A set lives in its own directory and is split into shard files by spatial
//! bucket, so adding a tile only ever touches one small file and iterating
//! only ever holds one shard in memory.

pub mod factory;
pub mod set;
pub mod shard;

use std::path::PathBuf;

pub use factory::DiskBackedTileSetFactory;
pub use set::{DiskBackedTileSet, TileSetIter};

/// Errors surfaced by tile set storage.
#[derive(Debug, thiserror::Error)]
pub enum TileSetError {
    #[error("tile set storage failure at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid tile set name {0:?}")]
    InvalidName(String),
}

impl TileSetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TileSetError::Io {
            path: path.into(),
            source,
        }
    }
}
