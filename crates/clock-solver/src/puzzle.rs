//! Clock board and button representation types.
//!
//! A puzzle is a row of clocks on a shared modulus plus a set of named
//! buttons, each advancing a fixed subset of clocks by fixed amounts.
//! These types deserialize directly from the puzzle JSON format and are
//! validated into a [`Puzzle`] before any solving happens.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

/// Boards up to this many clocks are stored inline without heap allocation.
const INLINE_CLOCKS: usize = 16;

/// Clock positions in board order, each reduced modulo the board modulus.
pub type Positions = SmallVec<[u8; INLINE_CLOCKS]>;

/// Canonical hashable key identifying a board for visited-state
/// deduplication. Boards with identical positions have identical
/// fingerprints.
pub type Fingerprint = Positions;

/// A validation failure in a puzzle definition.
///
/// Raised at construction time by [`Puzzle::new`], never during a search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedPuzzle {
    /// The modulus does not fit the supported clock-face range.
    #[error("modulus {modulus} is outside the supported range 1..=255")]
    InvalidModulus { modulus: u32 },

    /// A button effect targets a clock the board does not have.
    #[error("button `{button}` references clock {clock}, but the board has {clocks} clocks")]
    ClockIndexOutOfRange {
        button: String,
        clock: usize,
        clocks: usize,
    },

    /// A button lists the same clock in more than one effect entry.
    #[error("button `{button}` lists clock {clock} more than once")]
    DuplicateEffect { button: String, clock: usize },

    /// Two buttons share a name, so a press sequence would be ambiguous.
    #[error("duplicate button name `{name}`")]
    DuplicateButton { name: String },

    /// The target lists a different number of positions than the board.
    #[error("target has {target} positions, but the board has {clocks} clocks")]
    TargetLengthMismatch { target: usize, clocks: usize },
}

/// The positions of every clock at one point in time.
///
/// Boards are immutable values: pressing a button produces a new board
/// (see [`Button::apply`]). Two boards are equal iff all positions match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    positions: Positions,
}

impl Board {
    /// Build a board from raw positions, reducing each modulo `modulus`.
    ///
    /// A raw position of 12 on a 12-hour board therefore loads as 0.
    pub fn new(raw: &[u32], modulus: u8) -> Self {
        let positions = raw
            .iter()
            .map(|&position| (position % u32::from(modulus)) as u8)
            .collect();
        Self { positions }
    }

    /// A board with every clock at position 0.
    pub fn zeros(clocks: usize) -> Self {
        Self {
            positions: smallvec![0; clocks],
        }
    }

    /// Positions in board order.
    pub fn positions(&self) -> &[u8] {
        &self.positions
    }

    /// Number of clocks on the board.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True for the degenerate zero-clock board.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Canonical deduplication key: the position tuple itself.
    pub fn fingerprint(&self) -> Fingerprint {
        self.positions.clone()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (index, position) in self.positions.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", position)?;
        }
        write!(f, "]")
    }
}

/// A named button with one increment per clock (0 for untouched clocks).
///
/// Buttons are defined once per puzzle and shared read-only by the solver;
/// the sparse effect list of the definition is densified at validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    name: String,
    increments: Positions,
}

impl Button {
    /// The name reported in solutions.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Per-clock increments in board order, each reduced modulo `M`.
    pub fn increments(&self) -> &[u8] {
        &self.increments
    }

    /// Press this button: advance every affected clock, wrapping at the
    /// modulus. Pure; the input board is untouched.
    pub fn apply(&self, board: &Board, modulus: u8) -> Board {
        let positions = board
            .positions
            .iter()
            .zip(self.increments.iter())
            .map(|(&position, &increment)| {
                ((u16::from(position) + u16::from(increment)) % u16::from(modulus)) as u8
            })
            .collect();
        Board { positions }
    }
}

/// One sparse button effect: advance `clock` by `amount` per press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonEffect {
    pub clock: usize,
    pub amount: u32,
}

/// Raw button definition as it appears in puzzle JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonDef {
    pub name: String,
    /// Clocks not listed here are unaffected by the button.
    #[serde(default)]
    pub effects: Vec<ButtonEffect>,
}

/// The complete raw puzzle definition as it appears in puzzle JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleDef {
    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Clock face size; positions live on `[0, modulus)`. 12 when omitted.
    #[serde(default = "default_modulus")]
    pub modulus: u32,
    /// Initial raw position of every clock, in board order.
    pub clocks: Vec<u32>,
    /// Buttons in declaration order - the order the solver tries them.
    pub buttons: Vec<ButtonDef>,
    /// Raw positions that count as solved; all zeros when omitted.
    #[serde(default)]
    pub target: Option<Vec<u32>>,
    /// Maximum presses allowed in a solution; unlimited when omitted.
    #[serde(default)]
    pub max_presses: Option<usize>,
}

fn default_modulus() -> u32 {
    12
}

/// A validated puzzle: initial board, button set, and target.
///
/// Construction is the only place validation happens; a `Puzzle` value is
/// always well formed, so the solver never re-checks indices or moduli.
#[derive(Debug, Clone)]
pub struct Puzzle {
    name: Option<String>,
    modulus: u8,
    initial: Board,
    buttons: Vec<Button>,
    target: Board,
    max_presses: Option<usize>,
}

impl Puzzle {
    /// Validate a raw definition into a solvable puzzle.
    ///
    /// All raw positions, increments, and target values are reduced modulo
    /// the modulus here, at load time.
    pub fn new(def: &PuzzleDef) -> Result<Self, MalformedPuzzle> {
        if def.modulus == 0 || def.modulus > u32::from(u8::MAX) {
            return Err(MalformedPuzzle::InvalidModulus {
                modulus: def.modulus,
            });
        }
        let modulus = def.modulus as u8;
        let clocks = def.clocks.len();
        let initial = Board::new(&def.clocks, modulus);

        let mut buttons: Vec<Button> = Vec::with_capacity(def.buttons.len());
        for button_def in &def.buttons {
            if buttons.iter().any(|button| button.name == button_def.name) {
                return Err(MalformedPuzzle::DuplicateButton {
                    name: button_def.name.clone(),
                });
            }

            let mut increments: Positions = smallvec![0; clocks];
            for (index, effect) in button_def.effects.iter().enumerate() {
                if effect.clock >= clocks {
                    return Err(MalformedPuzzle::ClockIndexOutOfRange {
                        button: button_def.name.clone(),
                        clock: effect.clock,
                        clocks,
                    });
                }
                if button_def.effects[..index]
                    .iter()
                    .any(|earlier| earlier.clock == effect.clock)
                {
                    return Err(MalformedPuzzle::DuplicateEffect {
                        button: button_def.name.clone(),
                        clock: effect.clock,
                    });
                }
                increments[effect.clock] = (effect.amount % u32::from(modulus)) as u8;
            }

            buttons.push(Button {
                name: button_def.name.clone(),
                increments,
            });
        }

        let target = match &def.target {
            Some(raw) => {
                if raw.len() != clocks {
                    return Err(MalformedPuzzle::TargetLengthMismatch {
                        target: raw.len(),
                        clocks,
                    });
                }
                Board::new(raw, modulus)
            }
            None => Board::zeros(clocks),
        };

        Ok(Self {
            name: def.name.clone(),
            modulus,
            initial,
            buttons,
            target,
            max_presses: def.max_presses,
        })
    }

    /// Display name from the definition, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The shared clock-face size.
    pub fn modulus(&self) -> u8 {
        self.modulus
    }

    /// Number of clocks on the board.
    pub fn clock_count(&self) -> usize {
        self.initial.len()
    }

    /// The starting board.
    pub fn initial(&self) -> &Board {
        &self.initial
    }

    /// The board state that counts as solved.
    pub fn target(&self) -> &Board {
        &self.target
    }

    /// Buttons in declaration order.
    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    /// Press limit carried by the definition, if any.
    pub fn max_presses(&self) -> Option<usize> {
        self.max_presses
    }

    /// Exact equality against the target over all clock positions.
    pub fn is_solved(&self, board: &Board) -> bool {
        *board == self.target
    }

    /// Look up a button by its name.
    pub fn button_by_name(&self, name: &str) -> Option<&Button> {
        self.buttons.iter().find(|button| button.name == name)
    }

    /// Re-apply a press sequence from the initial board.
    ///
    /// Returns the resulting board, or `None` if a name is unknown. Used
    /// to check that a reported solution actually reaches the target.
    pub fn replay(&self, presses: &[String]) -> Option<Board> {
        let mut board = self.initial.clone();
        for name in presses {
            let button = self.button_by_name(name)?;
            board = button.apply(&board, self.modulus);
        }
        Some(board)
    }
}
