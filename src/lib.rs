//! Pyraminx Solving Engine
//!
//! Turns a scanned four-face triangular puzzle state into a move
//! sequence that solves it. The heavy lifting happens offline: a
//! breadth-first enumeration records, for every reachable configuration
//! of each solved coloring, the move that produced it, packed into
//! sorted binary tables. Online solving is then exact binary-search
//! lookups plus a nearest-match fallback for noisy scans.

pub mod builder;
pub mod codec;
pub mod corrector;
pub mod oracle;
pub mod puzzle;
pub mod solver;

pub use oracle::{Lookup, Table, TableError};
pub use puzzle::{Color, Move, Orientation, Scan, State, Step, TipTwist};
pub use solver::{Solution, SolveError, Solver};
