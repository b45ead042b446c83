//! Offline breadth-first enumeration of the move tables.
//!
//! Starting from one orientation's solved state, every state reachable
//! through the eight generators is visited exactly once and recorded
//! with the move that produced it from its parent. The twelve
//! orientations share nothing and build as independent parallel tasks.

use std::collections::hash_map::Entry;
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

use log::info;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::codec::{self, NextStep, PackedKey};
use crate::puzzle::{Move, Orientation};

/// Enumerates every state reachable from `orientation`'s solved state.
///
/// The map holds one entry per reachable state: the generator applied to
/// the parent to reach it, or the solved sentinel for the root. The
/// search always exhausts the component; the generator group is finite.
pub fn enumerate(orientation: Orientation) -> FxHashMap<PackedKey, NextStep> {
    let solved = orientation.solved_state();

    let mut entries = FxHashMap::default();
    let mut frontier = VecDeque::new();
    entries.insert(codec::pack(&solved), NextStep::Solved);
    frontier.push_back(solved);

    while let Some(state) = frontier.pop_front() {
        for mv in Move::ALL {
            let successor = state.apply(mv);
            if let Entry::Vacant(slot) = entries.entry(codec::pack(&successor)) {
                slot.insert(NextStep::Face(mv));
                frontier.push_back(successor);
            }
        }
    }
    entries
}

/// Builds and writes one orientation's table file, returning its state
/// count.
pub fn build_table(orientation: Orientation, dir: &Path) -> io::Result<usize> {
    let start = Instant::now();
    let entries = enumerate(orientation);
    let bytes = codec::encode(&entries);
    fs::write(dir.join(format!("{orientation}.bin")), bytes)?;
    info!(
        "{orientation}: {} states in {:.2?}",
        entries.len(),
        start.elapsed()
    );
    Ok(entries.len())
}

/// Builds all twelve orientation tables in parallel.
///
/// Each task owns its map and output file exclusively; the only
/// coordination is collecting the per-orientation results once every
/// task has finished.
pub fn build_all(dir: &Path) -> io::Result<Vec<(Orientation, io::Result<usize>)>> {
    fs::create_dir_all(dir)?;
    Ok(Orientation::ALL
        .into_par_iter()
        .map(|orientation| (orientation, build_table(orientation, dir)))
        .collect())
}


#[cfg(test)]
mod tests {
    use super::testing::{reference_entries, reference_orientation};
    use super::*;

    #[test]
    fn test_enumeration_visits_the_whole_component() {
        // 6 edges (6!/2 positions, 2^5 flips) times 4 in-place vertex
        // rotations (3^4)
        assert_eq!(reference_entries().len(), 933_120);
    }

    #[test]
    fn test_root_is_labeled_solved() {
        let solved = reference_orientation().solved_state();
        assert_eq!(
            reference_entries().get(&codec::pack(&solved)),
            Some(&NextStep::Solved)
        );
    }

    #[test]
    fn test_one_move_states_carry_their_generator() {
        let solved = reference_orientation().solved_state();
        for mv in Move::ALL {
            assert_eq!(
                reference_entries().get(&codec::pack(&solved.apply(mv))),
                Some(&NextStep::Face(mv))
            );
        }
    }

    #[test]
    fn test_edges_point_at_recorded_parents() {
        // walking any recorded edge backwards must land on another
        // recorded state
        let entries = reference_entries();
        for (&key, &step) in entries.iter().take(5000) {
            if let NextStep::Face(mv) = step {
                let parent = codec::unpack(key).apply(mv.inverse());
                assert!(entries.contains_key(&codec::pack(&parent)));
            }
        }
    }

    #[test]
    #[ignore = "builds all twelve tables on disk"]
    fn test_build_all_writes_every_orientation() {
        let dir = std::env::temp_dir().join(format!("pyrasolve-build-{}", std::process::id()));
        let results = build_all(&dir).unwrap();
        assert_eq!(results.len(), Orientation::ALL.len());
        for (orientation, result) in results {
            assert_eq!(result.unwrap(), 933_120, "{orientation}");
            assert!(dir.join(format!("{orientation}.bin")).exists());
        }
        std::fs::remove_dir_all(&dir).ok();
    }
}
