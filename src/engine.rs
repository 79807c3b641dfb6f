//! This module defines the `ExecutionEngine`, which simulates a compiled single-tape Turing
//! Machine. It owns the tape, head and current state of one execution and implements
//! single steps, cooperative run-to-completion and the accept/reject halting rules.

use std::sync::Arc;

use crate::machine::CompiledMachine;
use crate::tape::Tape;
use crate::types::{
    Action, ExecutionSnapshot, ProgramResult, State, Status, TuringMachineError,
};
use crate::validator::validate_tape;

/// Mutable execution state of one input tape.
#[derive(Debug, Clone)]
struct Session {
    tape: Tape,
    head: i64,
    state: State,
    status: Status,
    steps: usize,
}

/// Executes a compiled machine against an input tape.
///
/// A fresh engine has no tape; [`ExecutionEngine::reset`] must be called before stepping.
/// The engine is not shared between threads: whoever drives it owns it.
#[derive(Debug, Clone)]
pub struct ExecutionEngine {
    program: Arc<CompiledMachine>,
    session: Option<Session>,
}

impl ExecutionEngine {
    /// Creates an uninitialized engine for `program`.
    pub fn new(program: Arc<CompiledMachine>) -> Self {
        Self {
            program,
            session: None,
        }
    }

    /// Creates an engine and loads `tape` into it.
    pub fn with_tape(program: Arc<CompiledMachine>, tape: &str) -> Result<Self, TuringMachineError> {
        let mut engine = Self::new(program);
        engine.reset(tape)?;
        Ok(engine)
    }

    /// Reinitializes tape, head and state from a new input, discarding any progress.
    ///
    /// The tape is validated first; on failure the engine is left untouched.
    pub fn reset(&mut self, input: &str) -> Result<(), TuringMachineError> {
        let machine = self.program.machine();
        validate_tape(input, machine)?;

        let tape = Tape::from_string(input, machine.blank);
        let head = tape.start_index(machine.head_start);

        tracing::debug!(input, head, state = machine.start_state, "engine reset");

        self.session = Some(Session {
            tape,
            head,
            state: machine.start_state,
            status: Status::Running,
            steps: 0,
        });

        Ok(())
    }

    /// Executes a single step of the machine's computation.
    ///
    /// Reads the symbol under the head, looks up the action for the current state and
    /// applies it. A step taken in a final state accepts without executing anything, and
    /// an undefined action in a non-final state rejects.
    ///
    /// # Returns
    ///
    /// * `Ok(ExecutionSnapshot)` describing the machine after the step.
    /// * `Err(TuringMachineError::InvalidOperation)` if the engine has no tape or has halted.
    pub fn step(&mut self) -> Result<ExecutionSnapshot, TuringMachineError> {
        let program = Arc::clone(&self.program);
        let session = self.session.as_mut().ok_or_else(|| {
            TuringMachineError::InvalidOperation(
                "cannot step before a tape is loaded".to_string(),
            )
        })?;

        if session.status.is_halted() {
            return Err(TuringMachineError::InvalidOperation(format!(
                "cannot step a machine that has already {}",
                session.status
            )));
        }

        let symbol = session.tape.read(session.head);

        session.status = if program.is_final(session.state) {
            Status::Accepted
        } else {
            match program.action(session.state, symbol) {
                Action::Move {
                    next_state,
                    write,
                    direction,
                } => {
                    session.tape.write(session.head, write);
                    session.state = next_state;
                    session.head += direction.offset();

                    if program.is_final(next_state) {
                        Status::Accepted
                    } else {
                        Status::Running
                    }
                }
                Action::Undefined => Status::Rejected,
            }
        };
        session.steps += 1;

        tracing::trace!(
            step = session.steps,
            read = %symbol,
            state = session.state,
            head = session.head,
            status = %session.status,
            "step"
        );

        Ok(Self::snapshot_of(session))
    }

    /// Steps until the machine halts or `cancelled` returns `true`.
    ///
    /// Cancellation is checked before every step, so the result always reflects the last
    /// completed step. A cancelled run reports [`Status::TimedOut`] while the engine itself
    /// stays `Running`.
    pub fn run_to_completion<F>(&mut self, cancelled: F) -> Result<ProgramResult, TuringMachineError>
    where
        F: Fn() -> bool,
    {
        if self.session.is_none() {
            return Err(TuringMachineError::InvalidOperation(
                "cannot run before a tape is loaded".to_string(),
            ));
        }

        let mut timed_out = false;
        while !self.status().is_halted() {
            if cancelled() {
                timed_out = true;
                break;
            }
            self.step()?;
        }

        let status = if timed_out {
            Status::TimedOut
        } else {
            self.status()
        };

        let result = self.result(status)?;
        if timed_out {
            tracing::warn!(steps = result.steps, head = result.head, "run cancelled");
        } else {
            tracing::debug!(
                steps = result.steps,
                state = result.state,
                status = %result.status,
                "run finished"
            );
        }

        Ok(result)
    }

    /// Builds the result record for the current execution, reported with `status`.
    pub fn result(&self, status: Status) -> Result<ProgramResult, TuringMachineError> {
        let session = self.session()?;
        let machine = self.program.machine();
        let symbol = session.tape.read(session.head);

        Ok(ProgramResult {
            tape: session.tape.render(),
            state: session.state,
            state_label: machine.state_label(session.state),
            head: session.head,
            status,
            steps: session.steps,
            highlight: machine.coordinates(session.state, symbol),
        })
    }

    /// Returns a snapshot of the current execution.
    pub fn snapshot(&self) -> Result<ExecutionSnapshot, TuringMachineError> {
        self.session().map(Self::snapshot_of)
    }

    /// Returns `true` once the head lies outside the written window of the tape.
    pub fn is_head_beyond_written_tape(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| !session.tape.contains(session.head))
    }

    /// The current status; `Running` for an engine without a tape.
    pub fn status(&self) -> Status {
        self.session
            .as_ref()
            .map_or(Status::Running, |session| session.status)
    }

    pub fn is_halted(&self) -> bool {
        self.status().is_halted()
    }

    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    pub fn state(&self) -> Option<State> {
        self.session.as_ref().map(|session| session.state)
    }

    pub fn head(&self) -> Option<i64> {
        self.session.as_ref().map(|session| session.head)
    }

    /// Returns the total number of steps executed since the last reset.
    pub fn step_count(&self) -> usize {
        self.session.as_ref().map_or(0, |session| session.steps)
    }

    pub fn program(&self) -> &Arc<CompiledMachine> {
        &self.program
    }

    fn session(&self) -> Result<&Session, TuringMachineError> {
        self.session.as_ref().ok_or_else(|| {
            TuringMachineError::InvalidOperation("no tape has been loaded".to_string())
        })
    }

    fn snapshot_of(session: &Session) -> ExecutionSnapshot {
        ExecutionSnapshot {
            tape: session.tape.render(),
            tape_start: session.tape.start(),
            head: session.head,
            state: session.state,
            halted: session.status.is_halted(),
            status: session.status,
            steps: session.steps,
        }
    }
}
