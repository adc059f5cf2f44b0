//! This module defines the core data structures and types shared by the scanner and the
//! execution engine: symbols, directions, transitions, step outcomes and error types.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::diagnostic::Diagnostics;
use crate::table::TransitionTable;
use crate::tape::Tape;

/// The blank symbol used to pad the tape.
pub const BLANK_SYMBOL: char = '_';
/// The wildcard symbol. Matches any symbol when read, leaves the cell untouched when written,
/// and means "stay" when used as a direction.
pub const ANY_SYMBOL: char = '*';
/// Direction symbol for moving the head one cell to the left.
pub const LEFT_SYMBOL: char = 'L';
/// Direction symbol for moving the head one cell to the right.
pub const RIGHT_SYMBOL: char = 'R';
/// Name of the state that always halts the machine, whether declared or not.
pub const HALT_STATE: &str = "HALT";
/// The maximum allowed size for a program source in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// Default pause between two steps of a batch in the run loop, in milliseconds.
pub const DEFAULT_BATCH_DELAY_MS: u64 = 10;

/// A validated machine description, as produced by the parser.
///
/// Holds everything needed to construct a [`crate::TuringMachine`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    /// Every state and transition.
    pub table: TransitionTable,
    /// Qualified name of the initial state.
    pub initial_state: String,
    /// Qualified names of the halting states. Always starts with [`HALT_STATE`].
    pub halt_states: Vec<String>,
    /// The tape alphabet in declaration order. Always contains [`BLANK_SYMBOL`].
    pub alphabet: Vec<char>,
    /// The initial tape, head on the first cell.
    pub tape: Tape,
}

impl Program {
    /// Names of all states of the table in declaration order, the anonymous root state
    /// excluded.
    pub fn state_names(&self) -> Vec<&str> {
        self.table
            .states()
            .iter()
            .filter(|s| !s.is_anonymous())
            .map(|s| s.name())
            .collect()
    }

    /// Number of transitions over all states.
    pub fn transition_count(&self) -> usize {
        self.table.transitions().count()
    }
}

/// A symbol in a read or write position of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Symbol {
    /// A concrete tape symbol.
    Char(char),
    /// The wildcard symbol.
    Any,
}

impl Symbol {
    /// Returns `true` if this symbol, used as a read symbol, accepts `c`.
    pub fn matches(&self, c: char) -> bool {
        match self {
            Symbol::Any => true,
            Symbol::Char(s) => *s == c,
        }
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        if c == ANY_SYMBOL {
            Symbol::Any
        } else {
            Symbol::Char(c)
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Char(c) => write!(f, "{c}"),
            Symbol::Any => write!(f, "{ANY_SYMBOL}"),
        }
    }
}

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// Parses a direction symbol: `L`, `R` or the wildcard.
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            LEFT_SYMBOL => Some(Direction::Left),
            RIGHT_SYMBOL => Some(Direction::Right),
            ANY_SYMBOL => Some(Direction::Stay),
            _ => None,
        }
    }

    /// Returns the source symbol of this direction.
    pub fn symbol(&self) -> char {
        match self {
            Direction::Left => LEFT_SYMBOL,
            Direction::Right => RIGHT_SYMBOL,
            Direction::Stay => ANY_SYMBOL,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A single transition rule: in `state` reading `read`, write `write`, move `direction`
/// and continue in `target`.
///
/// Two transitions describe the same rule when their source state and read symbol are equal,
/// see [`Transition::same_rule`]. That relation only detects re-registration; the engine picks
/// transitions by declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// Qualified name of the source state.
    pub state: String,
    /// Symbol to read, or the wildcard.
    pub read: Symbol,
    /// Qualified name of the next state.
    pub target: String,
    /// Symbol to write, or the wildcard to leave the cell unchanged.
    pub write: Symbol,
    /// Head movement after writing.
    pub direction: Direction,
}

impl Transition {
    pub fn new(
        state: impl Into<String>,
        read: Symbol,
        target: impl Into<String>,
        write: Symbol,
        direction: Direction,
    ) -> Self {
        Self {
            state: state.into(),
            read,
            target: target.into(),
            write,
            direction,
        }
    }

    /// Returns `true` if both transitions are registered under the same (state, read) key.
    pub fn same_rule(&self, other: &Transition) -> bool {
        self.state == other.state && self.read == other.read
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{}:{}",
            self.state, self.read, self.target, self.write, self.direction
        )
    }
}

/// Represents the outcome of a single execution step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A transition matched and was applied.
    Applied(Transition),
    /// No transition of the current state accepts the symbol under the head.
    /// Nothing was mutated.
    NoTransition { state: String, symbol: char },
}

impl Step {
    /// Returns `true` if a transition was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, Step::Applied(_))
    }
}

/// Represents various errors that can occur while loading, parsing or running a program.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// The source contained one or more errors. Carries every diagnostic of the scan.
    #[error("Program parsing error:\n{0}")]
    ParseError(Diagnostics),
    /// Indicates that a program is structurally unusable.
    #[error("Program validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serialization() {
        let left_json = serde_json::to_string(&Direction::Left).unwrap();
        assert_eq!(left_json, "\"Left\"");

        let write = serde_json::to_value(Symbol::Char('1')).unwrap();
        assert_eq!(write, serde_json::json!({ "Char": "1" }));
    }

    #[test]
    fn test_direction_symbols() {
        assert_eq!(Direction::from_symbol('L'), Some(Direction::Left));
        assert_eq!(Direction::from_symbol('R'), Some(Direction::Right));
        assert_eq!(Direction::from_symbol('*'), Some(Direction::Stay));
        assert_eq!(Direction::from_symbol('l'), None);
        assert_eq!(Direction::Stay.to_string(), "*");
    }

    #[test]
    fn test_symbol_matching() {
        assert!(Symbol::Any.matches('x'));
        assert!(Symbol::Char('0').matches('0'));
        assert!(!Symbol::Char('0').matches('1'));
        assert_eq!(Symbol::from('*'), Symbol::Any);
        assert_eq!(Symbol::from('_'), Symbol::Char('_'));
    }

    #[test]
    fn test_transition_same_rule() {
        let a = Transition::new("q0", Symbol::Char('0'), "q1", Symbol::Any, Direction::Right);
        let b = Transition::new("q0", Symbol::Char('0'), "q2", Symbol::Char('1'), Direction::Left);
        let c = Transition::new("q0", Symbol::Any, "q1", Symbol::Any, Direction::Right);

        assert!(a.same_rule(&b));
        assert!(!a.same_rule(&c));
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "q0:0 -> q1:*:R");
    }

    #[test]
    fn test_error_display() {
        let error = TuringMachineError::ValidationError("Initial state 'q0' is undefined".into());

        let error_msg = format!("{}", error);
        assert!(error_msg.starts_with("Program validation error"));
        assert!(error_msg.contains("q0"));
    }
}
