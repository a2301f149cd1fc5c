use std::fs;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::TileSetError;
use super::set::DiskBackedTileSet;

const AUTO_LIST_PREFIX: &str = "autoList";

/// Opens named tile sets under one working directory.
///
/// Asking for the same name twice returns handles to the same set.
pub struct DiskBackedTileSetFactory {
    working_dir: PathBuf,
    open: DashMap<String, DiskBackedTileSet>,
}

impl DiskBackedTileSetFactory {
    pub fn new(working_dir: impl Into<PathBuf>) -> Result<Self, TileSetError> {
        let working_dir = working_dir.into();
        fs::create_dir_all(&working_dir).map_err(|e| TileSetError::io(&working_dir, e))?;
        Ok(Self {
            working_dir,
            open: DashMap::new(),
        })
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Open or create the set stored under `working_dir/<name>`.
    ///
    /// Existing contents are kept.
    pub fn create_list(&self, name: &str) -> Result<DiskBackedTileSet, TileSetError> {
        validate_name(name)?;
        match self.open.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let set = DiskBackedTileSet::open(name, self.working_dir.join(name))?;
                entry.insert(set.clone());
                Ok(set)
            }
        }
    }

    /// Create a fresh set named `autoList<N>` for the first unused `N`.
    pub fn create_auto_list(&self) -> Result<DiskBackedTileSet, TileSetError> {
        let mut n: u64 = 0;
        loop {
            let name = format!("{AUTO_LIST_PREFIX}{n}");
            let dir = self.working_dir.join(&name);
            if let Entry::Vacant(entry) = self.open.entry(name) {
                if !dir.exists() {
                    let set = DiskBackedTileSet::open(entry.key(), dir)?;
                    entry.insert(set.clone());
                    return Ok(set);
                }
            }
            n += 1;
        }
    }
}

fn validate_name(name: &str) -> Result<(), TileSetError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains('\0');
    if bad {
        return Err(TileSetError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::position::TileCoord;

    #[test]
    fn creates_working_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("cache").join("tiles");
        let factory = DiskBackedTileSetFactory::new(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(factory.working_dir(), root);
    }

    #[test]
    fn same_name_shares_a_set() {
        let tmp = tempfile::tempdir().unwrap();
        let factory = DiskBackedTileSetFactory::new(tmp.path()).unwrap();
        let a = factory.create_list("changed").unwrap();
        let b = factory.create_list("changed").unwrap();
        assert!(a.add(TileCoord::new(1, 1)).unwrap());
        assert!(!b.add(TileCoord::new(1, 1)).unwrap());
        assert_eq!(a.dir(), tmp.path().join("changed"));
    }

    #[test]
    fn rejects_bad_names() {
        let tmp = tempfile::tempdir().unwrap();
        let factory = DiskBackedTileSetFactory::new(tmp.path()).unwrap();
        for name in ["", ".", "..", "a/b", "a\\b"] {
            assert!(
                matches!(factory.create_list(name), Err(TileSetError::InvalidName(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn auto_lists_skip_used_names() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("autoList0")).unwrap();
        let factory = DiskBackedTileSetFactory::new(tmp.path()).unwrap();

        let first = factory.create_auto_list().unwrap();
        let second = factory.create_auto_list().unwrap();
        assert_eq!(first.name(), "autoList1");
        assert_eq!(second.name(), "autoList2");
    }
}
