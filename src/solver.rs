//! Solve orchestration: tip alignment, orientation fallback, and
//! sequence reconstruction over the move tables.
//!
//! A solve runs in three phases. First the four tips are aligned
//! greedily; tip twists never touch the face-move state graph, so a
//! fixed tip stays fixed. Then candidate tables are walked
//! preferred-orientation first: each lookup names the move that reached
//! the current state during enumeration, so applying its inverse steps
//! one edge back toward that table's root. Finally the accumulated
//! sequence is inverted once, turning the walk-to-root into a recipe
//! that solves the scanned puzzle.

use std::path::Path;

use log::{debug, warn};
use thiserror::Error;

use crate::corrector::{self, MAX_SCAN_ERRORS};
use crate::oracle::{Lookup, Table, TableError};
use crate::puzzle::{
    Move, Orientation, Pos, Scan, State, Step, TipTwist, BOTTOM, FACE_STICKERS, FRONT, LEFT, RIGHT,
};

/// Query cap per candidate table. No state sits more than a few dozen
/// moves from its root; running past this means the table and the move
/// model disagree.
const QUERY_CAP: usize = 50;

/// Tip alignment rules: tip position, the neighbor matched by the
/// forward twist, the neighbor matched by the backward twist, and the
/// forward twist itself.
const TIP_RULES: [(Pos, Pos, Pos, TipTwist); 4] = [
    ((FRONT, 0), (LEFT, 2), (RIGHT, 2), TipTwist::U),
    ((FRONT, 8), (RIGHT, 5), (BOTTOM, 7), TipTwist::R),
    ((FRONT, 4), (BOTTOM, 5), (LEFT, 7), TipTwist::L),
    ((BOTTOM, 0), (RIGHT, 7), (LEFT, 5), TipTwist::B),
];

/// A reconstructed solving sequence.
#[derive(Clone, Debug)]
pub struct Solution {
    /// Steps that solve `state`, in application order.
    pub steps: Vec<Step>,
    /// The corrected, canonicalized, tip-aligned state the steps apply
    /// to.
    pub state: State,
}

impl Solution {
    /// The sequence as space-separated move tokens.
    pub fn tokens(&self) -> String {
        self.steps
            .iter()
            .map(Step::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// User-visible solve failures. Oracle misses and runaway walks are
/// recovered internally by advancing to the next candidate table.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("cannot disambiguate scan: no known configuration within {0} sticker errors")]
    CannotDisambiguate(u32),
    #[error("state is unreachable in every orientation table")]
    Exhausted,
}

/// The solving engine: all loaded tables plus the correction threshold.
pub struct Solver {
    tables: Vec<Table>,
    /// Tolerated sticker errors when correcting a scan.
    pub max_scan_errors: u32,
}

impl Solver {
    /// Loads every table in `dir`.
    pub fn load(dir: &Path) -> Result<Solver, TableError> {
        Ok(Solver::from_tables(Table::load_dir(dir)?))
    }

    /// Wraps already-loaded tables.
    pub fn from_tables(tables: Vec<Table>) -> Solver {
        Solver {
            tables,
            max_scan_errors: MAX_SCAN_ERRORS,
        }
    }

    /// Solves a scanned state.
    ///
    /// Scans with unknown stickers or implausible color counts are first
    /// corrected to the nearest known configuration. The returned steps
    /// solve the corrected state exactly; replaying them must end on a
    /// monochrome puzzle.
    pub fn solve(&self, scan: &Scan) -> Result<Solution, SolveError> {
        let preferred = guess_orientation(scan);

        let state = match scan.resolved() {
            Some(state) if scan.color_counts() == [FACE_STICKERS; 4] => state,
            _ => self.correct(scan, preferred)?,
        };
        let state = state.canonicalized();
        let (state, twists) = align_tips(state);

        // seed with inverted tip twists; the final whole-sequence
        // inversion restores them as applied
        let mut recorded: Vec<Step> = twists
            .iter()
            .map(|twist| Step::Tip(twist.inverse()))
            .collect();

        for table in self.candidates(preferred) {
            debug!("walking {} table", table.orientation());
            if let Some(labels) = walk(table, state) {
                recorded.extend(labels.into_iter().map(Step::Face));
                let steps = recorded.iter().map(|step| step.inverse()).collect();
                return Ok(Solution { steps, state });
            }
        }
        Err(SolveError::Exhausted)
    }

    /// Candidate tables, the guessed orientation first.
    fn candidates(&self, preferred: Option<Orientation>) -> impl Iterator<Item = &Table> {
        let first = self
            .tables
            .iter()
            .filter(move |table| Some(table.orientation()) == preferred);
        let rest = self
            .tables
            .iter()
            .filter(move |table| Some(table.orientation()) != preferred);
        first.chain(rest)
    }

    /// Resolves a noisy scan against the candidate tables.
    fn correct(&self, scan: &Scan, preferred: Option<Orientation>) -> Result<State, SolveError> {
        for table in self.candidates(preferred) {
            if let Some((state, errors)) = corrector::nearest(scan, table, self.max_scan_errors) {
                debug!(
                    "scan corrected via {} table ({errors} sticker errors)",
                    table.orientation()
                );
                return Ok(state);
            }
        }
        Err(SolveError::CannotDisambiguate(self.max_scan_errors))
    }
}

/// Walks one table from `start` back to its root, returning the edge
/// labels in visit order, or `None` when the table cannot finish the
/// walk.
fn walk(table: &Table, start: State) -> Option<Vec<Move>> {
    let mut state = start;
    let mut labels = Vec::new();
    for _ in 0..QUERY_CAP {
        match table.lookup(&state) {
            Lookup::Solved => return Some(labels),
            Lookup::Step(mv) => {
                labels.push(mv);
                state = state.apply(mv.inverse());
            }
            Lookup::Miss => return None,
        }
    }
    warn!(
        "{} table produced {QUERY_CAP} steps without reaching its root; \
         the table is inconsistent with the move model",
        table.orientation()
    );
    None
}

/// Aligns each tip against its vertex, returning the twisted state and
/// the twists as applied. Greedy and order-independent: no face move or
/// later twist can undo an aligned tip.
pub fn align_tips(mut state: State) -> (State, Vec<TipTwist>) {
    let mut twists = Vec::new();
    for (tip, forward_neighbor, backward_neighbor, forward) in TIP_RULES {
        let sticker = state.at(tip.0, tip.1);
        let twist = if sticker == state.at(forward_neighbor.0, forward_neighbor.1) {
            forward
        } else if sticker == state.at(backward_neighbor.0, backward_neighbor.1) {
            forward.inverse()
        } else {
            continue;
        };
        state = state.apply_tip(twist);
        twists.push(twist);
    }
    (state, twists)
}

/// Applies a solving sequence to a state.
pub fn replay(state: &State, steps: &[Step]) -> State {
    steps
        .iter()
        .fold(*state, |state, &step| state.apply_step(step))
}

/// Reads the four face tips of the raw scan as an orientation code.
/// Tips may be twisted or misread; a wrong guess only costs fallback
/// order.
fn guess_orientation(scan: &Scan) -> Option<Orientation> {
    Some(Orientation([
        scan.sticker(0)?,
        scan.sticker(FACE_STICKERS)?,
        scan.sticker(2 * FACE_STICKERS)?,
        scan.sticker(3 * FACE_STICKERS)?,
    ]))
}
