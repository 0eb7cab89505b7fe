//! Breadth-first search over board states.
//!
//! Each press of a button is one edge in the state graph, so a plain BFS
//! from the initial board finds a shortest press sequence. States are
//! deduplicated by fingerprint the moment they are enqueued, and every
//! node keeps a back-reference to its parent so the winning sequence can
//! be reconstructed without storing a path per node.

use std::collections::VecDeque;
use std::time::Instant;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::puzzle::{Board, Puzzle};

/// Configuration for a single solve call.
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    /// Longest press sequence to consider. `None` searches the whole
    /// reachable state space; the puzzle's own limit is not consulted.
    pub max_presses: Option<usize>,
}

/// Counters describing how much work a search did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// States dequeued and expanded.
    pub states_expanded: usize,
    /// Distinct states ever enqueued, the initial board included.
    pub states_seen: usize,
    /// Deepest press depth the search dequeued and examined.
    pub depth_reached: usize,
    /// Wall-clock search time in milliseconds.
    pub time_elapsed_ms: u64,
}

/// A successful search: a minimal press sequence plus work counters.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Button names in press order; empty if the initial board is already
    /// the target.
    pub presses: Vec<String>,
    pub stats: SearchStats,
}

/// Why a search ended without a solution.
///
/// Both variants carry the work counters so callers can report how much
/// of the state space was covered before giving up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolverError {
    /// The target is unreachable from the initial board, no matter how
    /// many presses are allowed.
    #[error("no sequence of button presses reaches the target")]
    NoSolution { stats: SearchStats },

    /// The search hit the press limit with unexplored states beyond it.
    /// A longer sequence may still exist.
    #[error("no solution within {limit} presses")]
    BudgetExceeded { limit: usize, stats: SearchStats },
}

impl SolverError {
    /// Work counters for the failed search.
    pub fn stats(&self) -> &SearchStats {
        match self {
            SolverError::NoSolution { stats } => stats,
            SolverError::BudgetExceeded { stats, .. } => stats,
        }
    }
}

/// One explored state in the search arena.
struct SearchNode {
    board: Board,
    depth: usize,
    /// Arena index of the parent and the index of the button pressed to
    /// get here. `None` only for the initial board.
    via: Option<(usize, usize)>,
}

/// Search for a shortest press sequence taking the puzzle's initial board
/// to its target.
///
/// Buttons are tried in declaration order at every state, so ties between
/// equally short solutions always resolve to the earliest-declared
/// buttons. With a `max_presses` budget the search stops at that depth
/// and reports [`SolverError::BudgetExceeded`] if anything beyond the
/// horizon was left unexplored; [`SolverError::NoSolution`] means the
/// reachable space was exhausted and the target is provably unreachable.
pub fn solve(puzzle: &Puzzle, config: &SolverConfig) -> Result<Solution, SolverError> {
    let start = Instant::now();

    let mut stats = SearchStats {
        states_seen: 1,
        ..SearchStats::default()
    };

    if puzzle.is_solved(puzzle.initial()) {
        stats.time_elapsed_ms = start.elapsed().as_millis() as u64;
        return Ok(Solution {
            presses: Vec::new(),
            stats,
        });
    }

    if puzzle.buttons().is_empty() {
        stats.time_elapsed_ms = start.elapsed().as_millis() as u64;
        return Err(SolverError::NoSolution { stats });
    }

    let mut nodes: Vec<SearchNode> = vec![SearchNode {
        board: puzzle.initial().clone(),
        depth: 0,
        via: None,
    }];
    let mut frontier: VecDeque<usize> = VecDeque::new();
    frontier.push_back(0);

    let mut visited: FxHashSet<_> = FxHashSet::default();
    visited.insert(puzzle.initial().fingerprint());

    // Set when an unvisited successor was suppressed at the budget
    // horizon. Only then can a solution still exist past the cutoff.
    let mut truncated = false;

    while let Some(index) = frontier.pop_front() {
        let depth = nodes[index].depth;
        if depth > stats.depth_reached {
            stats.depth_reached = depth;
            debug!(
                depth,
                seen = stats.states_seen,
                frontier = frontier.len() + 1,
                "searching next press depth"
            );
        }

        if puzzle.is_solved(&nodes[index].board) {
            stats.time_elapsed_ms = start.elapsed().as_millis() as u64;
            return Ok(Solution {
                presses: reconstruct(puzzle, &nodes, index),
                stats,
            });
        }

        stats.states_expanded += 1;

        for (button_index, button) in puzzle.buttons().iter().enumerate() {
            let next = button.apply(&nodes[index].board, puzzle.modulus());
            if visited.contains(&next.fingerprint()) {
                continue;
            }
            if let Some(limit) = config.max_presses {
                if depth >= limit {
                    truncated = true;
                    continue;
                }
            }
            visited.insert(next.fingerprint());
            stats.states_seen += 1;
            nodes.push(SearchNode {
                board: next,
                depth: depth + 1,
                via: Some((index, button_index)),
            });
            frontier.push_back(nodes.len() - 1);
        }
    }

    stats.time_elapsed_ms = start.elapsed().as_millis() as u64;
    match (truncated, config.max_presses) {
        (true, Some(limit)) => Err(SolverError::BudgetExceeded { limit, stats }),
        _ => Err(SolverError::NoSolution { stats }),
    }
}

/// Walk parent links back to the initial board and return the presses in
/// forward order.
fn reconstruct(puzzle: &Puzzle, nodes: &[SearchNode], index: usize) -> Vec<String> {
    let mut presses = Vec::with_capacity(nodes[index].depth);
    let mut cursor = index;
    while let Some((parent, button_index)) = nodes[cursor].via {
        presses.push(puzzle.buttons()[button_index].name().to_string());
        cursor = parent;
    }
    presses.reverse();
    presses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{ButtonDef, ButtonEffect, PuzzleDef};

    fn button(name: &str, effects: &[(usize, u32)]) -> ButtonDef {
        ButtonDef {
            name: name.to_string(),
            effects: effects
                .iter()
                .map(|&(clock, amount)| ButtonEffect { clock, amount })
                .collect(),
        }
    }

    fn puzzle(modulus: u32, clocks: &[u32], buttons: Vec<ButtonDef>) -> Puzzle {
        Puzzle::new(&PuzzleDef {
            name: None,
            modulus,
            clocks: clocks.to_vec(),
            buttons,
            target: None,
            max_presses: None,
        })
        .unwrap()
    }

    fn double_dial() -> Puzzle {
        puzzle(
            12,
            &[3, 9],
            vec![button("A", &[(0, 1), (1, 1)]), button("B", &[(0, 2)])],
        )
    }

    fn unlimited() -> SolverConfig {
        SolverConfig { max_presses: None }
    }

    fn budget(limit: usize) -> SolverConfig {
        SolverConfig {
            max_presses: Some(limit),
        }
    }

    #[test]
    fn test_already_solved_returns_empty_sequence() {
        let puzzle = puzzle(12, &[0, 0], vec![button("A", &[(0, 1)])]);

        let solution = solve(&puzzle, &unlimited()).unwrap();
        assert!(solution.presses.is_empty());
        assert_eq!(solution.stats.states_seen, 1);
        assert_eq!(solution.stats.states_expanded, 0);
        assert_eq!(solution.stats.depth_reached, 0);
    }

    #[test]
    fn test_single_press_solution() {
        // Both buttons lead somewhere, but only B lands on the target.
        let puzzle = puzzle(
            12,
            &[9],
            vec![button("A", &[(0, 1)]), button("B", &[(0, 3)])],
        );

        let solution = solve(&puzzle, &unlimited()).unwrap();
        assert_eq!(solution.presses, vec!["B"]);
        assert_eq!(solution.stats.depth_reached, 1);
    }

    #[test]
    fn test_regression_double_dial_minimal_length_six() {
        // Clock 1 is only moved by A, so any solution needs exactly
        // 3 + 12k presses of A; with 3 As, clock 0 needs 3 more Bs.
        let puzzle = double_dial();

        let solution = solve(&puzzle, &unlimited()).unwrap();
        assert_eq!(solution.presses.len(), 6);

        let a_count = solution.presses.iter().filter(|name| *name == "A").count();
        let b_count = solution.presses.iter().filter(|name| *name == "B").count();
        assert_eq!(a_count, 3);
        assert_eq!(b_count, 3);

        let replayed = puzzle.replay(&solution.presses).unwrap();
        assert!(puzzle.is_solved(&replayed));
        assert_eq!(solution.stats.depth_reached, 6);
    }

    #[test]
    fn test_budget_below_minimum_is_exceeded_not_unsolvable() {
        let puzzle = double_dial();

        let error = solve(&puzzle, &budget(5)).unwrap_err();
        assert!(matches!(error, SolverError::BudgetExceeded { limit: 5, .. }));
    }

    #[test]
    fn test_budget_equal_to_minimum_still_solves() {
        let puzzle = double_dial();

        let solution = solve(&puzzle, &budget(6)).unwrap();
        assert_eq!(solution.presses.len(), 6);
    }

    #[test]
    fn test_parity_puzzle_is_unsolvable() {
        // From 1, a +2 button only ever reaches the six odd positions;
        // the visited set must equal that reachable set.
        let puzzle = puzzle(12, &[1], vec![button("A", &[(0, 2)])]);

        let error = solve(&puzzle, &unlimited()).unwrap_err();
        assert!(matches!(error, SolverError::NoSolution { .. }));
        assert_eq!(error.stats().states_seen, 6);
        assert_eq!(error.stats().states_expanded, 6);
        assert_eq!(error.stats().depth_reached, 5);
    }

    #[test]
    fn test_unsolvable_reports_no_solution_even_with_budget() {
        // The odd cycle closes after 6 states, well inside the budget,
        // so nothing was truncated and the verdict is final.
        let puzzle = puzzle(12, &[1], vec![button("A", &[(0, 2)])]);

        let error = solve(&puzzle, &budget(50)).unwrap_err();
        assert!(matches!(error, SolverError::NoSolution { .. }));
    }

    #[test]
    fn test_tight_budget_on_unsolvable_puzzle_is_exceeded() {
        // Truncation happens before the cycle closes, so the search
        // cannot rule out a deeper solution.
        let puzzle = puzzle(12, &[1], vec![button("A", &[(0, 2)])]);

        let error = solve(&puzzle, &budget(2)).unwrap_err();
        assert!(matches!(error, SolverError::BudgetExceeded { limit: 2, .. }));
    }

    #[test]
    fn test_zero_budget_with_moves_available() {
        let puzzle = puzzle(12, &[3], vec![button("A", &[(0, 1)])]);

        let error = solve(&puzzle, &budget(0)).unwrap_err();
        assert!(matches!(error, SolverError::BudgetExceeded { limit: 0, .. }));
        assert_eq!(error.stats().states_seen, 1);
    }

    #[test]
    fn test_no_buttons_is_unsolvable() {
        let puzzle = puzzle(12, &[3], vec![]);

        let error = solve(&puzzle, &unlimited()).unwrap_err();
        assert!(matches!(error, SolverError::NoSolution { .. }));
        assert_eq!(error.stats().states_expanded, 0);
    }

    #[test]
    fn test_noop_button_explores_nothing_new() {
        // A button with no effects maps every state to itself.
        let puzzle = puzzle(12, &[3], vec![button("A", &[])]);

        let error = solve(&puzzle, &unlimited()).unwrap_err();
        assert!(matches!(error, SolverError::NoSolution { .. }));
        assert_eq!(error.stats().states_seen, 1);
    }

    #[test]
    fn test_cycle_walk_counts_each_state_once() {
        // From 2, the +2 button laps the six even positions and lands on
        // 0 after exactly five presses; dedup stops the lap there.
        let puzzle = puzzle(12, &[2], vec![button("A", &[(0, 2)])]);

        let solution = solve(&puzzle, &unlimited()).unwrap();
        assert_eq!(solution.presses.len(), 5);
        assert_eq!(solution.stats.states_seen, 6);
    }

    #[test]
    fn test_ties_resolve_to_declaration_order() {
        // Both buttons solve in one press; A is declared first.
        let puzzle = puzzle(
            4,
            &[2],
            vec![button("A", &[(0, 2)]), button("B", &[(0, 2)])],
        );

        let solution = solve(&puzzle, &unlimited()).unwrap();
        assert_eq!(solution.presses, vec!["A"]);
    }

    #[test]
    fn test_search_is_deterministic() {
        let puzzle = double_dial();

        let first = solve(&puzzle, &unlimited()).unwrap();
        let second = solve(&puzzle, &unlimited()).unwrap();
        assert_eq!(first.presses, second.presses);
        assert_eq!(first.stats.states_seen, second.stats.states_seen);
        assert_eq!(first.stats.states_expanded, second.stats.states_expanded);
    }

    #[test]
    fn test_empty_board_is_trivially_solved() {
        let puzzle = puzzle(12, &[], vec![button("A", &[])]);

        let solution = solve(&puzzle, &unlimited()).unwrap();
        assert!(solution.presses.is_empty());
    }
}
