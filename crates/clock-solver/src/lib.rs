//! Clock puzzle solver library.
//!
//! This crate models boards of modular clocks driven by increment
//! buttons and finds a shortest sequence of presses that brings every
//! clock to the target position, optionally within a press budget.

pub mod puzzle;
pub mod solver;

// Re-export main types
pub use puzzle::{
    Board, Button, ButtonDef, ButtonEffect, Fingerprint, MalformedPuzzle, Positions, Puzzle,
    PuzzleDef,
};
pub use solver::{solve, SearchStats, Solution, SolverConfig, SolverError};
