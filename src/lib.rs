//! This crate provides the core logic for a single-tape Turing Machine simulator.
//! It includes modules for validating machine definitions and input tapes, compiling
//! user-authored instructions into a transition table, executing the machine step by step
//! or to completion, and supervising full runs under a deadline on a background thread.

pub mod compiler;
pub mod controller;
pub mod engine;
pub mod formal;
pub mod machine;
pub mod samples;
pub mod tape;
pub mod types;
pub mod validator;

/// Re-exports the `Rule` enum from the compiler module, used by the `pest` grammar.
pub use crate::compiler::Rule;
/// Re-exports the `compile` function and the `TransitionTable` it produces.
pub use compiler::{compile, TransitionTable};
/// Re-exports the background run types from the controller module.
pub use controller::{check_deadline, CancelToken, RunController, RunHandle};
/// Re-exports the `ExecutionEngine` struct from the engine module.
pub use engine::ExecutionEngine;
/// Re-exports the machine definition types from the machine module.
pub use machine::{CompiledMachine, PotentialTransition, Rgb, TuringMachine};
/// Re-exports the `Tape` struct from the tape module.
pub use tape::Tape;
/// Re-exports various types related to machine definition and execution from the types module.
pub use types::{
    Action, Cell, CellCoordinates, ConfigError, Direction, ExecutionSnapshot, HeadStart,
    ProgramResult, State, Status, TuringMachineError, ValidationFailure,
};
/// Re-exports the pre-run checks from the validator module.
pub use validator::{readiness, should_simulation_be_enabled, validate, validate_tape, Readiness};
