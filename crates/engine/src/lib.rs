//! Incremental tile tracking and world-subset chunk filtering for voxel map
//! rendering.
//!
//! Nothing here decodes a save format: chunks arrive as [`world::chunk::RawChunk`]
//! from whatever loader the caller has, and tiles leave as coordinates in a
//! [`tiles::DiskBackedTileSet`].

pub mod batch;
pub mod filter;
pub mod subset;
pub mod tiles;
pub mod world;
