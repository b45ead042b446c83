//! Nearest-match lookup for noisy or partial scans.
//!
//! A scanned state may carry unknown stickers or outright
//! misclassifications. This scan walks a table's sorted records and
//! keeps the closest one under a masked sticker-mismatch metric:
//! unknown stickers match every color, known stickers count one error
//! per color difference. Ties keep the earliest record, which is the
//! lowest packed key.

use crate::codec::{self, KEY_BYTES, PackedKey};
use crate::oracle::Table;
use crate::puzzle::{Scan, State};

/// Default tolerated sticker errors before a table reports no match.
pub const MAX_SCAN_ERRORS: u32 = 6;

/// Finds the reachable state closest to `scan` in `table`.
///
/// Returns the resolved state and its error count, or `None` when no
/// record is within `max_errors`.
pub fn nearest(scan: &Scan, table: &Table, max_errors: u32) -> Option<(State, u32)> {
    let (target, mask) = codec::pack_masked(scan);

    let mut best: Option<(PackedKey, u32)> = None;
    for record in table.records() {
        let errors = distance(record.key, target, mask);
        if best.is_none_or(|(_, fewest)| errors < fewest) {
            best = Some((record.key, errors));
            if errors == 0 {
                break;
            }
        }
    }

    best.filter(|&(_, errors)| errors <= max_errors)
        .map(|(key, errors)| (codec::unpack(key), errors))
}

/// Number of known stickers whose colors differ between a table key and
/// a masked scan target.
fn distance(key: PackedKey, target: PackedKey, mask: PackedKey) -> u32 {
    let mut errors = 0;
    for index in 0..KEY_BYTES {
        // nonzero 2-bit groups of the masked XOR are mismatched stickers
        let diff = (key.0[index] ^ target.0[index]) & mask.0[index];
        if diff == 0 {
            continue;
        }
        for shift in [6, 4, 2, 0] {
            if (diff >> shift) & 0b11 != 0 {
                errors += 1;
            }
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::NextStep;
    use crate::puzzle::{Color, Move, Orientation};
    use rustc_hash::FxHashMap;

    fn reference() -> Orientation {
        Orientation::ALL[4]
    }

    fn table_of(states: &[(State, NextStep)]) -> Table {
        let mut entries = FxHashMap::default();
        for (state, step) in states {
            entries.insert(codec::pack(state), *step);
        }
        Table::from_map(reference(), &entries)
    }

    /// The solved root plus its one-move neighbors; neighbors sit twelve
    /// sticker errors away from the root.
    fn neighborhood() -> Table {
        let solved = reference().solved_state();
        let mut states = vec![(solved, NextStep::Solved)];
        for mv in Move::ALL {
            states.push((solved.apply(mv), NextStep::Face(mv)));
        }
        table_of(&states)
    }

    #[test]
    fn test_exact_scan_matches_at_distance_zero() {
        let table = neighborhood();
        let state = reference().solved_state().apply(Move::Li);
        let found = nearest(&Scan::from(state), &table, MAX_SCAN_ERRORS);
        assert_eq!(found, Some((state, 0)));
    }

    #[test]
    fn test_single_unknown_resolves_to_true_state() {
        let table = neighborhood();
        let solved = reference().solved_state();
        let scan = Scan::from(solved).with_sticker(17, None);
        assert_eq!(nearest(&scan, &table, MAX_SCAN_ERRORS), Some((solved, 0)));
    }

    #[test]
    fn test_single_substitution_resolves_to_true_state() {
        let table = neighborhood();
        let solved = reference().solved_state();
        // front face sticker misread as blue
        let scan = Scan::from(solved.with_sticker(1, Color::Blue));
        assert_eq!(nearest(&scan, &table, MAX_SCAN_ERRORS), Some((solved, 1)));
    }

    #[test]
    fn test_threshold_rejects_distant_scans() {
        let solved = reference().solved_state();
        let table = table_of(&[(solved, NextStep::Solved)]);

        let mut scan = Scan::from(solved);
        // corrupt seven red stickers to green: one past the default
        // threshold
        for index in 0..7 {
            scan = scan.with_sticker(index, Some(Color::Green));
        }
        assert_eq!(nearest(&scan, &table, MAX_SCAN_ERRORS), None);

        let mut scan = Scan::from(solved);
        for index in 0..6 {
            scan = scan.with_sticker(index, Some(Color::Green));
        }
        assert_eq!(nearest(&scan, &table, MAX_SCAN_ERRORS), Some((solved, 6)));
    }

    #[test]
    fn test_ties_break_toward_lowest_key() {
        let solved = reference().solved_state();
        // a second entry differing from the root in stickers 0 and 1
        let other = solved
            .with_sticker(0, Color::Blue)
            .with_sticker(1, Color::Blue);
        let table = table_of(&[(solved, NextStep::Solved), (other, NextStep::Face(Move::U))]);

        // one error against each entry; the root packs lower (red < blue)
        let scan = Scan::from(solved.with_sticker(0, Color::Blue));
        assert!(codec::pack(&solved) < codec::pack(&other));
        assert_eq!(nearest(&scan, &table, MAX_SCAN_ERRORS), Some((solved, 1)));
    }

    #[test]
    fn test_unknowns_count_no_errors() {
        let solved = reference().solved_state();
        let table = table_of(&[(solved, NextStep::Solved)]);
        let mut scan = Scan::from(solved);
        for index in 0..10 {
            scan = scan.with_sticker(index, None);
        }
        // ten unknowns still match exactly
        assert_eq!(nearest(&scan, &table, 0), Some((solved, 0)));
    }
}
