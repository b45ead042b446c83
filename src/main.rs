//! Pyraminx Solver
//!
//! Builds the per-orientation move tables and solves scanned puzzle
//! states against them. A scanned state is 36 face-major sticker
//! symbols over `rgby`, with `?` for stickers the scanner could not
//! classify.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use pyrasolve::solver::replay;
use pyrasolve::{builder, Scan, Solver, State, Step, TableError};

/// Solves a four-face triangular twisty puzzle from scanned states.
#[derive(Parser)]
#[command(name = "pyrasolve")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the twelve orientation tables.
    Build {
        /// Directory the table files are written to.
        #[arg(long, default_value = "tables")]
        db_dir: PathBuf,
    },
    /// Solve a scanned state and print the move sequence.
    Solve {
        /// 36 sticker symbols, `?` for unknown.
        state: String,
        /// Directory the table files are read from.
        #[arg(long, default_value = "tables")]
        db_dir: PathBuf,
    },
    /// Display a state as an unfolded net.
    Show {
        /// 36 sticker symbols, `?` for unknown.
        state: String,
    },
    /// Replay a move sequence against a state and report the result.
    Check {
        /// 36 sticker symbols, fully resolved.
        state: String,
        /// Move tokens such as `U`, `R'`, `b`.
        moves: Vec<String>,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Build { db_dir } => run_build(&db_dir),
        Command::Solve { state, db_dir } => run_solve(&state, &db_dir),
        Command::Show { state } => run_show(&state),
        Command::Check { state, moves } => run_check(&state, &moves),
    }
}

/// Builds all tables, reporting each orientation's outcome.
fn run_build(db_dir: &Path) -> ExitCode {
    let results = match builder::build_all(db_dir) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Failed to create {}: {e}", db_dir.display());
            return ExitCode::FAILURE;
        }
    };

    let mut failed = false;
    for (orientation, result) in results {
        match result {
            Ok(states) => println!("{orientation}: {states} states"),
            Err(e) => {
                eprintln!("{orientation}: failed ({e})");
                failed = true;
            }
        }
    }
    if failed {
        ExitCode::FAILURE
    } else {
        println!("Wrote tables to {}", db_dir.display());
        ExitCode::SUCCESS
    }
}

/// Solves one scanned state.
fn run_solve(state: &str, db_dir: &Path) -> ExitCode {
    let scan: Scan = match state.parse() {
        Ok(scan) => scan,
        Err(e) => {
            eprintln!("Bad state: {e}");
            return ExitCode::FAILURE;
        }
    };

    let solver = match Solver::load(db_dir) {
        Ok(solver) => solver,
        Err(e @ TableError::NoTables(_)) => {
            eprintln!("{e}. Run 'pyrasolve build' first.");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("Failed to load tables: {e}");
            return ExitCode::FAILURE;
        }
    };

    match solver.solve(&scan) {
        Ok(solution) => {
            if solution.steps.is_empty() {
                println!("Already solved");
            } else {
                println!(
                    "Solved in {} moves: {}",
                    solution.steps.len(),
                    solution.tokens()
                );
            }
            println!("Resolved state: {}", solution.state);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Prints a state as an unfolded net.
fn run_show(state: &str) -> ExitCode {
    match state.parse::<Scan>() {
        Ok(scan) => {
            print!("{}", scan.net());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Bad state: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Replays a token sequence and reports whether it solves the state.
fn run_check(state: &str, moves: &[String]) -> ExitCode {
    let start: State = match state.parse() {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Bad state: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut steps = Vec::with_capacity(moves.len());
    for token in moves {
        match token.parse::<Step>() {
            Ok(step) => steps.push(step),
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        }
    }

    let end = replay(&start, &steps);
    println!("Final state: {end}");
    if end.is_solved() {
        println!("Solved");
        ExitCode::SUCCESS
    } else {
        println!("Not solved");
        ExitCode::FAILURE
    }
}
