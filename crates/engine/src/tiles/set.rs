use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use dashmap::DashMap;

use super::TileSetError;
use super::shard::{self, RECORD_LEN, ShardKey};
use crate::world::position::TileCoord;

/// Shard locks for the whole process, keyed by canonical shard path, so
/// handles from different factories on one directory still serialize.
static SHARD_LOCKS: LazyLock<DashMap<PathBuf, Arc<Mutex<()>>>> = LazyLock::new(DashMap::new);

/// A named, grow-only set of tile coordinates stored on disk.
///
/// Handles are cheap to clone. Adds to different shards run in parallel;
/// adds to the same shard serialize, whichever handle they come through.
#[derive(Clone)]
pub struct DiskBackedTileSet {
    inner: Arc<Inner>,
}

struct Inner {
    name: String,
    dir: PathBuf,
    /// `dir` with symlinks and relative parts resolved.
    canonical_dir: PathBuf,
}

impl DiskBackedTileSet {
    pub(crate) fn open(name: &str, dir: PathBuf) -> Result<Self, TileSetError> {
        fs::create_dir_all(&dir).map_err(|e| TileSetError::io(&dir, e))?;
        let canonical_dir = fs::canonicalize(&dir).map_err(|e| TileSetError::io(&dir, e))?;
        tracing::debug!("Opened tile set {:?} at {}", name, canonical_dir.display());
        Ok(Self {
            inner: Arc::new(Inner {
                name: name.to_string(),
                dir,
                canonical_dir,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    fn shard_path(&self, key: ShardKey) -> PathBuf {
        self.inner.dir.join(key.file_name())
    }

    fn lock_for(&self, key: ShardKey) -> Arc<Mutex<()>> {
        let path = self.inner.canonical_dir.join(key.file_name());
        SHARD_LOCKS.entry(path).or_default().clone()
    }

    /// Insert `coord`, returning whether it was not already present.
    ///
    /// The record is on disk by the time this returns `Ok`.
    pub fn add(&self, coord: TileCoord) -> Result<bool, TileSetError> {
        let key = ShardKey::of(coord);
        let lock = self.lock_for(key);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let path = self.shard_path(key);
        shard::insert(&path, coord).map_err(|e| TileSetError::io(&path, e))
    }

    /// Shard files currently on disk, ordered by bucket.
    fn shard_files(&self) -> Result<Vec<(ShardKey, PathBuf)>, TileSetError> {
        let dir = &self.inner.dir;
        let entries = fs::read_dir(dir).map_err(|e| TileSetError::io(dir, e))?;

        let mut shards = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TileSetError::io(dir, e))?;
            let Some(key) = entry.file_name().to_str().and_then(ShardKey::from_file_name) else {
                continue;
            };
            shards.push((key, entry.path()));
        }
        shards.sort_by_key(|(key, _)| (key.by, key.bx));
        Ok(shards)
    }

    /// Lazily walk every distinct coordinate, one shard at a time.
    ///
    /// Order is unspecified. Call again to start over.
    pub fn iter(&self) -> Result<TileSetIter, TileSetError> {
        let shards = self.shard_files()?;
        tracing::debug!("Iterating tile set {:?} over {} shards", self.name(), shards.len());
        Ok(TileSetIter {
            set: self.clone(),
            shards: shards.into_iter(),
            current: Vec::new().into_iter(),
        })
    }

    /// Number of records on disk, taken from shard file sizes.
    ///
    /// Damaged shards may count records that iteration skips.
    pub fn len(&self) -> Result<usize, TileSetError> {
        let mut total = 0;
        for (_, path) in self.shard_files()? {
            let meta = fs::metadata(&path).map_err(|e| TileSetError::io(&path, e))?;
            total += meta.len() as usize / RECORD_LEN;
        }
        Ok(total)
    }

    pub fn is_empty(&self) -> Result<bool, TileSetError> {
        Ok(self.len()? == 0)
    }

    /// Min and max corners over every coordinate, or `None` when empty.
    pub fn bounds(&self) -> Result<Option<(TileCoord, TileCoord)>, TileSetError> {
        let mut bounds: Option<(TileCoord, TileCoord)> = None;
        for coord in self.iter()? {
            bounds = Some(match bounds {
                None => (coord, coord),
                Some((min, max)) => (
                    TileCoord::new(min.x.min(coord.x), min.y.min(coord.y)),
                    TileCoord::new(max.x.max(coord.x), max.y.max(coord.y)),
                ),
            });
        }
        Ok(bounds)
    }

    pub fn to_set(&self) -> Result<HashSet<TileCoord>, TileSetError> {
        Ok(self.iter()?.collect())
    }

    fn load_shard(&self, key: ShardKey, path: &Path) -> Vec<TileCoord> {
        let lock = self.lock_for(key);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        match shard::read(path) {
            Ok(contents) => {
                let mut seen = HashSet::with_capacity(contents.tiles.len());
                let mut tiles = contents.tiles;
                tiles.retain(|coord| seen.insert(*coord));
                tiles
            }
            Err(e) => {
                tracing::warn!("Skipping unreadable tile shard {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for DiskBackedTileSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskBackedTileSet")
            .field("name", &self.inner.name)
            .field("dir", &self.inner.dir)
            .finish()
    }
}

/// Iterator over a tile set. Holds at most one shard in memory.
pub struct TileSetIter {
    set: DiskBackedTileSet,
    shards: std::vec::IntoIter<(ShardKey, PathBuf)>,
    current: std::vec::IntoIter<TileCoord>,
}

impl Iterator for TileSetIter {
    type Item = TileCoord;

    fn next(&mut self) -> Option<TileCoord> {
        loop {
            if let Some(coord) = self.current.next() {
                return Some(coord);
            }
            let (key, path) = self.shards.next()?;
            self.current = self.set.load_shard(key, &path).into_iter();
        }
    }
}
