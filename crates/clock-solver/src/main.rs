//! CLI entry point for the clock puzzle solver.
//!
//! Usage:
//!   clock-solver solve <puzzle.json> [options]
//!   clock-solver solve --stdin [options]
//!
//! Options:
//!   --max-presses <n>  Press budget, overriding the definition's maxPresses
//!   --json             Print a machine-readable JSON report
//!   --verbose          Log search progress at debug level
//!
//! Exit status: 0 solved, 1 no solution, 2 budget exceeded, 3 malformed
//! puzzle or unreadable input.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use clock_solver::{solve, Puzzle, PuzzleDef, Solution, SolverConfig, SolverError};

#[derive(Parser)]
#[command(name = "clock-solver")]
#[command(about = "Breadth-first solver for clock-board button puzzles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find a shortest press sequence that solves a puzzle
    Solve {
        /// Path to puzzle JSON file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read puzzle from stdin instead of file
        #[arg(long)]
        stdin: bool,

        /// Maximum presses to allow, overriding the definition's maxPresses
        #[arg(long)]
        max_presses: Option<usize>,

        /// Print a JSON report instead of human-readable text
        #[arg(long)]
        json: bool,

        /// Log search progress at debug level
        #[arg(long)]
        verbose: bool,
    },
}

/// Output format for the solve report
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolveReport {
    solved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    presses: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sequence: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    states_expanded: usize,
    states_seen: usize,
    depth_reached: usize,
    time_elapsed_ms: u64,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            file,
            stdin,
            max_presses,
            json,
            verbose,
        } => {
            init_logging(verbose);

            // Read puzzle JSON
            let json_content = if stdin {
                let mut buffer = String::new();
                if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                    error!(error = %e, "failed to read puzzle from stdin");
                    std::process::exit(3);
                }
                buffer
            } else if let Some(path) = file {
                match fs::read_to_string(&path) {
                    Ok(contents) => contents,
                    Err(e) => {
                        error!(path = %path.display(), error = %e, "failed to read puzzle file");
                        std::process::exit(3);
                    }
                }
            } else {
                error!("must provide either a file path or --stdin");
                std::process::exit(3);
            };

            // Parse and validate puzzle
            let def: PuzzleDef = match serde_json::from_str(&json_content) {
                Ok(def) => def,
                Err(e) => {
                    error!(error = %e, "failed to parse puzzle JSON");
                    std::process::exit(3);
                }
            };
            let puzzle = match Puzzle::new(&def) {
                Ok(puzzle) => puzzle,
                Err(e) => {
                    error!(error = %e, "malformed puzzle");
                    std::process::exit(3);
                }
            };
            info!(
                name = puzzle.name().unwrap_or("unnamed"),
                clocks = puzzle.clock_count(),
                buttons = puzzle.buttons().len(),
                modulus = puzzle.modulus(),
                "puzzle loaded"
            );

            // Build solver config; the CLI budget wins over the definition's
            let config = SolverConfig {
                max_presses: max_presses.or(puzzle.max_presses()),
            };

            // Run solver
            let result = solve(&puzzle, &config);

            // Print report
            if json {
                let report = format_report(&result);
                println!("{}", serde_json::to_string_pretty(&report).unwrap());
            } else {
                print_text_report(&result);
            }

            // Exit with appropriate code
            match result {
                Ok(_) => std::process::exit(0),
                Err(SolverError::NoSolution { .. }) => std::process::exit(1),
                Err(SolverError::BudgetExceeded { .. }) => std::process::exit(2),
            }
        }
    }
}

fn format_report(result: &Result<Solution, SolverError>) -> SolveReport {
    match result {
        Ok(solution) => SolveReport {
            solved: true,
            presses: Some(solution.presses.len()),
            sequence: Some(solution.presses.clone()),
            reason: None,
            states_expanded: solution.stats.states_expanded,
            states_seen: solution.stats.states_seen,
            depth_reached: solution.stats.depth_reached,
            time_elapsed_ms: solution.stats.time_elapsed_ms,
        },
        Err(error) => {
            let stats = error.stats();
            SolveReport {
                solved: false,
                presses: None,
                sequence: None,
                reason: Some(
                    match error {
                        SolverError::NoSolution { .. } => "no_solution",
                        SolverError::BudgetExceeded { .. } => "budget_exceeded",
                    }
                    .to_string(),
                ),
                states_expanded: stats.states_expanded,
                states_seen: stats.states_seen,
                depth_reached: stats.depth_reached,
                time_elapsed_ms: stats.time_elapsed_ms,
            }
        }
    }
}

fn print_text_report(result: &Result<Solution, SolverError>) {
    let stats = match result {
        Ok(solution) => {
            if solution.presses.is_empty() {
                println!("Already solved: the board starts on the target.");
            } else {
                println!("Solved in {} presses:", solution.presses.len());
                for (index, name) in solution.presses.iter().enumerate() {
                    println!("  {}. {}", index + 1, name);
                }
            }
            &solution.stats
        }
        Err(error) => {
            match error {
                SolverError::NoSolution { .. } => {
                    println!("No solution: the target is unreachable from the initial board.");
                }
                SolverError::BudgetExceeded { limit, .. } => {
                    println!(
                        "No solution within {} presses; a longer sequence may still exist.",
                        limit
                    );
                }
            }
            error.stats()
        }
    };
    println!(
        "({} states expanded, {} seen, {} ms)",
        stats.states_expanded, stats.states_seen, stats.time_elapsed_ms
    );
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
