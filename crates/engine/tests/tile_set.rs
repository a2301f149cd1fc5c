//! Disk-backed tile set behavior through the public factory API: set
//! semantics, durability across factories, concurrency and crash recovery.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;

use cartograph_engine::tiles::{DiskBackedTileSetFactory, TileSetError};
use cartograph_engine::world::position::TileCoord;

const SAMPLE: [(i32, i32); 8] = [
    (0, 0),
    (1, 1),
    (20, 0),
    (0, 20),
    (40, 40),
    (41, 40),
    (-5, 0),
    (-10, -10),
];

fn sample() -> HashSet<TileCoord> {
    SAMPLE.iter().map(|&(x, y)| TileCoord::new(x, y)).collect()
}

// ---------------------------------------------------------------------------
// Set semantics
// ---------------------------------------------------------------------------

#[test]
fn adding_twice_keeps_one_entry() {
    let tmp = tempfile::tempdir().unwrap();
    let factory = DiskBackedTileSetFactory::new(tmp.path()).unwrap();
    let set = factory.create_list("dirty").unwrap();

    assert!(set.add(TileCoord::new(7, -3)).unwrap());
    assert!(!set.add(TileCoord::new(7, -3)).unwrap());

    let all: Vec<_> = set.iter().unwrap().collect();
    assert_eq!(all, vec![TileCoord::new(7, -3)]);
}

#[test]
fn iteration_yields_each_added_tile_once() {
    let tmp = tempfile::tempdir().unwrap();
    let factory = DiskBackedTileSetFactory::new(tmp.path()).unwrap();
    let set = factory.create_list("dirty").unwrap();

    for &(x, y) in &SAMPLE {
        set.add(TileCoord::new(x, y)).unwrap();
    }
    // Re-adding in reverse must not create duplicates.
    for &(x, y) in SAMPLE.iter().rev() {
        set.add(TileCoord::new(x, y)).unwrap();
    }

    let listed: Vec<_> = set.iter().unwrap().collect();
    assert_eq!(listed.len(), SAMPLE.len());
    assert_eq!(listed.into_iter().collect::<HashSet<_>>(), sample());
    assert_eq!(set.len().unwrap(), SAMPLE.len());

    // Iteration restarts from scratch.
    assert_eq!(set.iter().unwrap().count(), SAMPLE.len());
}

#[test]
fn fresh_list_is_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let factory = DiskBackedTileSetFactory::new(tmp.path()).unwrap();
    let set = factory.create_list("dirty").unwrap();
    assert_eq!(set.iter().unwrap().next(), None);
    assert!(set.is_empty().unwrap());
    assert!(set.to_set().unwrap().is_empty());
}

#[test]
fn names_are_independent_sets() {
    let tmp = tempfile::tempdir().unwrap();
    let factory = DiskBackedTileSetFactory::new(tmp.path()).unwrap();
    let a = factory.create_list("a").unwrap();
    let b = factory.create_list("b").unwrap();
    a.add(TileCoord::new(1, 2)).unwrap();
    assert!(b.is_empty().unwrap());
    assert!(b.add(TileCoord::new(1, 2)).unwrap());
}

// ---------------------------------------------------------------------------
// Durability
// ---------------------------------------------------------------------------

#[test]
fn contents_survive_a_new_factory() {
    let tmp = tempfile::tempdir().unwrap();
    {
        let factory = DiskBackedTileSetFactory::new(tmp.path()).unwrap();
        let set = factory.create_list("dirty").unwrap();
        for &(x, y) in &SAMPLE {
            set.add(TileCoord::new(x, y)).unwrap();
        }
    }

    let factory = DiskBackedTileSetFactory::new(tmp.path()).unwrap();
    let set = factory.create_list("dirty").unwrap();
    assert_eq!(set.to_set().unwrap(), sample());
    assert!(!set.add(TileCoord::new(40, 40)).unwrap());
    assert_eq!(
        set.bounds().unwrap(),
        Some((TileCoord::new(-10, -10), TileCoord::new(41, 40)))
    );
}

#[test]
fn torn_write_loses_only_the_partial_record() {
    let tmp = tempfile::tempdir().unwrap();
    let factory = DiskBackedTileSetFactory::new(tmp.path()).unwrap();
    let set = factory.create_list("dirty").unwrap();
    set.add(TileCoord::new(3, 3)).unwrap();
    set.add(TileCoord::new(4, 3)).unwrap();

    // Simulate a crash half way through a third append.
    let shard = set.dir().join("s.0.0.tiles");
    let mut file = OpenOptions::new().append(true).open(&shard).unwrap();
    file.write_all(&[0xBE, 0xBA, 0xDE, 0xC0, 5, 0]).unwrap();
    drop(file);

    let reopened = DiskBackedTileSetFactory::new(tmp.path())
        .unwrap()
        .create_list("dirty")
        .unwrap();
    let expected: HashSet<_> = [TileCoord::new(3, 3), TileCoord::new(4, 3)].into();
    assert_eq!(reopened.to_set().unwrap(), expected);

    assert!(reopened.add(TileCoord::new(5, 3)).unwrap());
    assert_eq!(reopened.to_set().unwrap().len(), 3);
    assert_eq!(std::fs::metadata(&shard).unwrap().len(), 36);
}

#[test]
fn corrupt_record_does_not_take_later_records_with_it() {
    let tmp = tempfile::tempdir().unwrap();
    let factory = DiskBackedTileSetFactory::new(tmp.path()).unwrap();
    let set = factory.create_list("dirty").unwrap();
    for (x, y) in [(1, 1), (2, 2), (3, 3)] {
        set.add(TileCoord::new(x, y)).unwrap();
    }

    // Flip one bit in the magic of the middle record.
    let shard = set.dir().join("s.0.0.tiles");
    let mut bytes = std::fs::read(&shard).unwrap();
    bytes[12] ^= 0x80;
    std::fs::write(&shard, &bytes).unwrap();

    let expected: HashSet<_> = [TileCoord::new(1, 1), TileCoord::new(3, 3)].into();
    assert_eq!(set.to_set().unwrap(), expected);

    assert!(set.add(TileCoord::new(4, 4)).unwrap());
    let expected: HashSet<_> = [(1, 1), (3, 3), (4, 4)]
        .into_iter()
        .map(|(x, y)| TileCoord::new(x, y))
        .collect();
    assert_eq!(set.to_set().unwrap(), expected);
    assert_eq!(std::fs::metadata(&shard).unwrap().len(), 36);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn concurrent_adds_are_deduplicated() {
    let tmp = tempfile::tempdir().unwrap();
    let factory = DiskBackedTileSetFactory::new(tmp.path()).unwrap();

    let added: usize = std::thread::scope(|s| {
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let set = factory.create_list("dirty").unwrap();
                s.spawn(move || {
                    let mut mine = 0;
                    for x in -20..20 {
                        for y in 0..5 {
                            if set.add(TileCoord::new(x * 3, y)).unwrap() {
                                mine += 1;
                            }
                        }
                    }
                    mine
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).sum()
    });

    // Every tile was reported new by exactly one thread.
    assert_eq!(added, 40 * 5);
    let set = factory.create_list("dirty").unwrap();
    assert_eq!(set.to_set().unwrap().len(), 40 * 5);
    assert_eq!(set.len().unwrap(), 40 * 5);
}

#[test]
fn factories_sharing_a_directory_lose_no_adds() {
    const THREADS: i32 = 4;
    const PER_THREAD: i32 = 25;
    let tmp = tempfile::tempdir().unwrap();

    for round in 0..20 {
        let name = format!("round{round}");
        std::thread::scope(|s| {
            for t in 0..THREADS {
                let root = tmp.path();
                let name = &name;
                s.spawn(move || {
                    let factory = DiskBackedTileSetFactory::new(root).unwrap();
                    let set = factory.create_list(name).unwrap();
                    for i in 0..PER_THREAD {
                        // All inside shard (0, 0).
                        let n = t * PER_THREAD + i;
                        assert!(set.add(TileCoord::new(n % 32, n / 32)).unwrap());
                    }
                });
            }
        });

        let set = DiskBackedTileSetFactory::new(tmp.path())
            .unwrap()
            .create_list(&name)
            .unwrap();
        let expected = (THREADS * PER_THREAD) as usize;
        assert_eq!(set.to_set().unwrap().len(), expected, "round {round}");
        assert_eq!(set.len().unwrap(), expected, "round {round}");
    }
}

// ---------------------------------------------------------------------------
// Naming
// ---------------------------------------------------------------------------

#[test]
fn path_like_names_are_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let factory = DiskBackedTileSetFactory::new(tmp.path()).unwrap();
    let err = factory.create_list("../escape").unwrap_err();
    assert!(matches!(err, TileSetError::InvalidName(name) if name == "../escape"));
}
