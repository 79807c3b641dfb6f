//! This module defines the core data structures and types used throughout the Turing Machine
//! simulator, including transition actions, execution results, snapshots, and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::Rule;

/// The default blank symbol used on the Turing Machine tape.
pub const DEFAULT_BLANK_SYMBOL: char = ' ';
/// A special input symbol that may stand for the blank symbol in instructions and CLI tapes,
/// as long as it is not a working symbol itself.
pub const INPUT_BLANK_SYMBOL: char = '_';
/// The maximum number of states a machine may declare.
pub const MAX_STATE_COUNT: usize = 10_000;
/// The shortest deadline accepted for a full run, in milliseconds.
pub const MIN_DEADLINE_MS: u64 = 1;
/// The longest deadline accepted for a full run, in milliseconds.
pub const MAX_DEADLINE_MS: u64 = 1_000_000;
/// The deadline used when the caller does not choose one, in milliseconds.
pub const DEFAULT_DEADLINE_MS: u64 = 10_000;

/// A state identifier in `[0, state_count)`.
pub type State = usize;

/// Represents the possible directions a Turing Machine head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// Returns the head offset produced by this direction.
    pub fn offset(self) -> i64 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Stay => 0,
        }
    }
}

/// Where the head is placed on the input tape before the first step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadStart {
    /// Start on the first written symbol.
    #[default]
    FromLeftmostSymbol,
    /// Start on the last written symbol.
    FromRightmostSymbol,
}

/// The compiled behaviour of a single (state, symbol) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Write a symbol, move the head and switch state.
    Move {
        next_state: State,
        write: char,
        direction: Direction,
    },
    /// No instruction was authored for the cell.
    Undefined,
}

/// A (state, read symbol) coordinate of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub state: State,
    pub symbol: char,
}

impl Cell {
    pub fn new(state: State, symbol: char) -> Self {
        Self { state, symbol }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(q{}, {:?})", self.state, self.symbol)
    }
}

/// Column/row position of a cell in the editor's table, used for highlighting.
///
/// The column is the state index and the row is the index of the symbol in
/// [`crate::TuringMachine::table_rows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCoordinates {
    pub column: usize,
    pub row: usize,
}

/// The execution status of an engine or of a finished run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// The machine can take another step.
    #[default]
    Running,
    /// The machine reached a final state.
    Accepted,
    /// The machine found no transition in a non-final state.
    Rejected,
    /// The run was cancelled before the machine halted on its own.
    TimedOut,
}

impl Status {
    /// Returns `true` for statuses reached by the machine itself.
    pub fn is_halted(self) -> bool {
        matches!(self, Status::Accepted | Status::Rejected)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Status::Running => "running",
            Status::Accepted => "accepted",
            Status::Rejected => "rejected",
            Status::TimedOut => "timed out",
        };
        f.write_str(text)
    }
}

/// A point-in-time view of an execution, produced after every step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionSnapshot {
    /// The written window of the tape, left to right.
    pub tape: String,
    /// Logical index of the first character of `tape`.
    pub tape_start: i64,
    /// Logical head index; may lie outside the written window.
    pub head: i64,
    /// The current state.
    pub state: State,
    /// Whether the machine reached a terminal status.
    pub halted: bool,
    pub status: Status,
    /// Number of steps taken since the last reset.
    pub steps: usize,
}

/// The record handed back to the caller once a run ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramResult {
    /// Final written window of the tape.
    pub tape: String,
    /// The state the run finished in.
    pub state: State,
    /// Display label of `state`, e.g. `q2`.
    pub state_label: String,
    /// Head index at the end of the run.
    pub head: i64,
    pub status: Status,
    pub steps: usize,
    /// Table cell for the final (state, symbol under head), if the symbol has a row.
    pub highlight: Option<CellCoordinates>,
}

/// Errors found while compiling a machine definition into a transition table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The instruction does not consist of exactly three `/`-separated fields.
    #[error("Instruction {instruction:?} at {cell} is malformed: {source}")]
    Syntax {
        cell: Cell,
        instruction: String,
        #[source]
        source: Box<pest::error::Error<Rule>>,
    },
    /// The next-state field is not a number.
    #[error("Instruction at {cell} names a non-numeric state {found:?}")]
    InvalidState { cell: Cell, found: String },
    /// The next-state field is outside `[0, state_count)`.
    #[error("Instruction at {cell} targets state q{target}, but the machine has {state_count} states")]
    StateOutOfRange {
        cell: Cell,
        target: usize,
        state_count: usize,
    },
    /// The write field is not exactly one character.
    #[error("Instruction at {cell} must write a single symbol, found {found:?}")]
    InvalidWriteSymbol { cell: Cell, found: String },
    /// The write symbol is neither a working symbol nor the blank.
    #[error("Instruction at {cell} writes {symbol:?}, which is not in the alphabet")]
    SymbolOutsideAlphabet { cell: Cell, symbol: char },
    /// The direction field is not a recognised token.
    #[error("Instruction at {cell} has unknown direction {found:?}")]
    UnknownDirection { cell: Cell, found: String },
    /// A potential transition refers to a state or symbol that has no cell in the table.
    #[error("Transition {cell} lies outside the transition table")]
    CellOutsideTable { cell: Cell },
    /// The same cell appears more than once in the potential transitions.
    #[error("Transition {cell} is defined more than once")]
    DuplicateCell { cell: Cell },
    #[error("State count must be between 1 and {max}, got {0}", max = MAX_STATE_COUNT)]
    InvalidStateCount(usize),
    #[error("Start state q{start} is out of range for {state_count} states")]
    StartStateOutOfRange { start: State, state_count: usize },
    #[error("Final state q{state} is out of range for {state_count} states")]
    FinalStateOutOfRange { state: State, state_count: usize },
    #[error("Blank symbol {0:?} must not be part of the alphabet")]
    BlankInAlphabet(char),
}

/// Reasons an input tape is refused before execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("The tape is empty")]
    EmptyTape,
    #[error("The tape contains symbols outside the alphabet: {0:?}")]
    ForeignSymbols(Vec<char>),
}

/// Represents various errors that can occur during Turing Machine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// The machine definition could not be compiled.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// The input tape was refused.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationFailure),
    /// The caller invoked an operation the engine cannot perform in its current state.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    /// A run is already in flight for this machine.
    #[error("A run is already in progress")]
    RunInProgress,
    #[error("Deadline must be between {min} and {max} ms, got {0}", min = MIN_DEADLINE_MS, max = MAX_DEADLINE_MS)]
    InvalidDeadline(u64),
    /// The background worker ended without delivering a result.
    #[error("Run worker failed: {0}")]
    WorkerFailed(String),
}
