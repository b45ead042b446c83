//! Exact lookup over loaded move tables.
//!
//! A table is one orientation's complete state-to-move map, kept
//! resident after a single load. Lookups are allocation-free binary
//! searches; tables are immutable and can be shared across threads.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::codec::{self, DecodeError, NextStep, PackedKey, Record};
use crate::puzzle::{Move, Orientation, State};

/// A loaded, sorted move table for one orientation.
#[derive(Clone, Debug)]
pub struct Table {
    orientation: Orientation,
    records: Vec<Record>,
}

/// Outcome of an exact lookup.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Lookup {
    /// The state is this table's solved root.
    Solved,
    /// The move that reached this state during enumeration.
    Step(Move),
    /// The state is not reachable in this table's orientation.
    Miss,
}

/// Error loading a table file.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("table name {0:?} is not a four-color orientation code")]
    BadFileName(String),
    #[error("corrupt table {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
    #[error("no move tables found in {0}")]
    NoTables(PathBuf),
}

impl Table {
    /// Loads one table file; the orientation comes from the file stem.
    pub fn load(path: &Path) -> Result<Table, TableError> {
        let stem = path.file_stem().and_then(|stem| stem.to_str()).unwrap_or("");
        let orientation = Orientation::from_code(stem)
            .ok_or_else(|| TableError::BadFileName(stem.to_string()))?;
        let bytes = fs::read(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let records = codec::decode(&bytes).map_err(|source| TableError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Table {
            orientation,
            records,
        })
    }

    /// Loads every `.bin` table in a directory, in name order.
    pub fn load_dir(dir: &Path) -> Result<Vec<Table>, TableError> {
        let entries = fs::read_dir(dir).map_err(|source| TableError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "bin"))
            .collect();
        paths.sort();

        let mut tables = Vec::with_capacity(paths.len());
        for path in &paths {
            tables.push(Table::load(path)?);
        }
        if tables.is_empty() {
            return Err(TableError::NoTables(dir.to_path_buf()));
        }
        Ok(tables)
    }

    /// Builds a table straight from an enumeration map, skipping the
    /// file format.
    pub fn from_map(orientation: Orientation, entries: &FxHashMap<PackedKey, NextStep>) -> Table {
        let mut records: Vec<Record> = entries
            .iter()
            .map(|(&key, &step)| Record { key, step })
            .collect();
        records.sort_unstable_by_key(|record| record.key);
        Table {
            orientation,
            records,
        }
    }

    /// The orientation this table solves toward.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Number of reachable states in the table.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The sorted records, for linear scans.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Binary-searches the table for a resolved state.
    pub fn lookup(&self, state: &State) -> Lookup {
        let key = codec::pack(state);
        match self.records.binary_search_by(|record| record.key.cmp(&key)) {
            Ok(index) => match self.records[index].step {
                NextStep::Solved => Lookup::Solved,
                NextStep::Face(mv) => Lookup::Step(mv),
            },
            Err(_) => Lookup::Miss,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn reference() -> Orientation {
        Orientation::ALL[4]
    }

    /// The solved root and its eight one-move neighbors.
    fn small_table() -> Table {
        let solved = reference().solved_state();
        let mut entries = FxHashMap::default();
        entries.insert(codec::pack(&solved), NextStep::Solved);
        for mv in Move::ALL {
            entries.insert(codec::pack(&solved.apply(mv)), NextStep::Face(mv));
        }
        Table::from_map(reference(), &entries)
    }

    /// A scratch directory unique to this test run.
    fn scratch_dir(tag: &str) -> PathBuf {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let dir = std::env::temp_dir().join(format!(
            "pyrasolve-test-{}-{}-{tag}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_lookup_finds_root_and_edges() {
        let table = small_table();
        let solved = reference().solved_state();
        assert_eq!(table.lookup(&solved), Lookup::Solved);
        for mv in Move::ALL {
            assert_eq!(table.lookup(&solved.apply(mv)), Lookup::Step(mv));
        }
        assert_eq!(table.len(), 9);
    }

    #[test]
    fn test_lookup_misses_foreign_states() {
        let table = small_table();
        // two moves away is outside the small table
        let far = reference().solved_state().apply(Move::U).apply(Move::R);
        assert_eq!(table.lookup(&far), Lookup::Miss);
        // another orientation's root is never reachable here
        let foreign = Orientation::ALL[0].solved_state();
        assert_eq!(table.lookup(&foreign), Lookup::Miss);
    }

    #[test]
    fn test_records_are_strictly_sorted() {
        let table = small_table();
        for pair in table.records().windows(2) {
            assert!(pair[0].key < pair[1].key);
        }
    }

    #[test]
    fn test_file_round_trip() {
        let dir = scratch_dir("round-trip");
        let table = small_table();

        let mut entries = FxHashMap::default();
        for record in table.records() {
            entries.insert(record.key, record.step);
        }
        let path = dir.join(format!("{}.bin", table.orientation()));
        fs::write(&path, codec::encode(&entries)).unwrap();

        let loaded = Table::load(&path).unwrap();
        assert_eq!(loaded.orientation(), table.orientation());
        assert_eq!(loaded.records(), table.records());

        let all = Table::load_dir(&dir).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].records(), table.records());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_rejects_bad_file_name() {
        let dir = scratch_dir("bad-name");
        let path = dir.join("notacode.bin");
        fs::write(&path, b"").unwrap();
        assert!(matches!(
            Table::load(&path),
            Err(TableError::BadFileName(_))
        ));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_rejects_corrupt_table() {
        let dir = scratch_dir("corrupt");
        let path = dir.join("rygb.bin");
        fs::write(&path, [0u8; 7]).unwrap();
        assert!(matches!(Table::load(&path), Err(TableError::Corrupt { .. })));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_dir_requires_tables() {
        let dir = scratch_dir("empty");
        assert!(matches!(
            Table::load_dir(&dir),
            Err(TableError::NoTables(_))
        ));
        fs::remove_dir_all(&dir).ok();
    }
}
