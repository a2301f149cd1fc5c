//! JSON run configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use cartograph_engine::subset::{CircularWorldSubset, FullWorldSubset, SaveFormat, WorldSubset};
use cartograph_engine::world::position::WorldPos;
use serde::Deserialize;

/// Largest accepted tile edge, in chunks.
const MAX_TILE_SIZE_CHUNKS: u32 = 4096;

/// Largest accepted circle radius and origin coordinate, in blocks. Matches
/// the edge of a playable world.
const MAX_WORLD_EXTENT: i64 = 30_000_000;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// World save root (the directory holding `level.dat`).
    pub world_dir: PathBuf,
    #[serde(default)]
    pub dimension: Dimension,
    #[serde(default)]
    pub save_format: Format,
    #[serde(default)]
    pub subset: SubsetConfig,
    /// Where tile sets are kept between runs.
    pub cache_dir: PathBuf,
    #[serde(default = "default_list_name")]
    pub list_name: String,
    /// Tile edge length in chunks.
    #[serde(default = "default_tile_size_chunks")]
    pub tile_size_chunks: u32,
}

fn default_list_name() -> String {
    "dirty".into()
}

fn default_tile_size_chunks() -> u32 {
    8
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    #[default]
    Overworld,
    Nether,
    End,
}

impl Dimension {
    /// Directory of the dimension relative to the world root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Dimension::Overworld => ".",
            Dimension::Nether => "DIM-1",
            Dimension::End => "DIM1",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Anvil,
    McRegion,
}

impl From<Format> for SaveFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Anvil => SaveFormat::Anvil,
            Format::McRegion => SaveFormat::McRegion,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SubsetConfig {
    #[default]
    Full,
    Circular {
        /// World-space `[x, z]` of the center.
        origin: [i64; 2],
        radius: i64,
    },
}

impl SubsetConfig {
    pub fn build(&self) -> Box<dyn WorldSubset> {
        match *self {
            SubsetConfig::Full => Box::new(FullWorldSubset),
            SubsetConfig::Circular {
                origin: [x, z],
                radius,
            } => Box::new(CircularWorldSubset::new(WorldPos::new(x, z), radius)),
        }
    }
}

impl Config {
    /// Read a config file. Relative paths inside it are taken relative to
    /// the file's own directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config =
            Self::from_json(&text).with_context(|| format!("loading config {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.world_dir = base.join(&config.world_dir);
            config.cache_dir = base.join(&config.cache_dir);
        }
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text).context("parsing config JSON")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            (1..=MAX_TILE_SIZE_CHUNKS).contains(&self.tile_size_chunks),
            "tile_size_chunks must be between 1 and {}, got {}",
            MAX_TILE_SIZE_CHUNKS,
            self.tile_size_chunks
        );
        ensure!(!self.list_name.is_empty(), "list_name must not be empty");
        if let SubsetConfig::Circular { origin, radius } = self.subset {
            ensure!(radius >= 0, "circular subset radius must not be negative, got {}", radius);
            ensure!(
                radius <= MAX_WORLD_EXTENT,
                "circular subset radius must be at most {}, got {}",
                MAX_WORLD_EXTENT,
                radius
            );
            ensure!(
                origin.iter().all(|c| c.unsigned_abs() <= MAX_WORLD_EXTENT as u64),
                "circular subset origin must be within {} blocks of 0, got {:?}",
                MAX_WORLD_EXTENT,
                origin
            );
        }
        Ok(())
    }

    pub fn dimension_dir(&self) -> PathBuf {
        match self.dimension {
            Dimension::Overworld => self.world_dir.clone(),
            other => self.world_dir.join(other.dir_name()),
        }
    }
}
