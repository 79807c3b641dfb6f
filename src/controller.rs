//! Background execution of full runs under a wall-clock deadline.
//!
//! A run is split into two threads that share nothing but a [`CancelToken`]: the worker,
//! which owns its `ExecutionEngine` and checks the token before every step, and the
//! deadline timer, which sets the token if the worker has not finished in time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::engine::ExecutionEngine;
use crate::machine::CompiledMachine;
use crate::types::{ProgramResult, TuringMachineError, MAX_DEADLINE_MS, MIN_DEADLINE_MS};

pub type RunOutcome = Result<ProgramResult, TuringMachineError>;

/// A monotonic cancellation flag shared between a run and whoever may cancel it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Once set, the flag is never cleared.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Starts deadline-bounded runs of one compiled machine, at most one at a time.
#[derive(Debug)]
pub struct RunController {
    program: Arc<CompiledMachine>,
    in_flight: Arc<AtomicBool>,
}

impl RunController {
    pub fn new(program: Arc<CompiledMachine>) -> Self {
        Self {
            program,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns `true` while a run started by this controller has not delivered its result.
    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn program(&self) -> &Arc<CompiledMachine> {
        &self.program
    }

    /// Runs the machine on `tape` in the background, cancelling it after `deadline_ms`.
    ///
    /// The tape is validated before anything is spawned.
    ///
    /// # Returns
    ///
    /// * `Ok(RunHandle)` for the started run.
    /// * `Err(TuringMachineError::InvalidDeadline)` if the deadline is out of range.
    /// * `Err(TuringMachineError::RunInProgress)` if another run has not finished yet.
    /// * `Err(TuringMachineError::Validation)` if the tape is refused.
    pub fn start_run(&self, tape: &str, deadline_ms: u64) -> Result<RunHandle, TuringMachineError> {
        check_deadline(deadline_ms)?;

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(TuringMachineError::RunInProgress);
        }
        let guard = InFlight(Arc::clone(&self.in_flight));

        let engine = ExecutionEngine::with_tape(Arc::clone(&self.program), tape)?;

        let cancel = CancelToken::new();
        let (result_tx, result_rx) = mpsc::channel::<RunOutcome>();
        let (done_tx, done_rx) = mpsc::channel::<()>();

        // Deadline timer: exits early once the worker drops `done_tx`
        let timer_cancel = cancel.clone();
        let deadline = Duration::from_millis(deadline_ms);
        thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = done_rx.recv_timeout(deadline) {
                tracing::debug!(deadline_ms, "deadline expired, cancelling run");
                timer_cancel.cancel();
            }
        });

        let worker_cancel = cancel.clone();
        let worker = thread::spawn(move || {
            let mut engine = engine;
            let outcome = engine.run_to_completion(|| worker_cancel.is_cancelled());

            drop(done_tx);
            // Clear the in-flight flag before delivering, so the receiver can start again
            drop(guard);
            let _ = result_tx.send(outcome);
        });

        tracing::debug!(tape, deadline_ms, "run started");

        Ok(RunHandle {
            cancel,
            result: result_rx,
            worker: Some(worker),
            delivered: false,
        })
    }
}

/// Checks that `deadline_ms` lies in `MIN_DEADLINE_MS..=MAX_DEADLINE_MS`.
pub fn check_deadline(deadline_ms: u64) -> Result<(), TuringMachineError> {
    if (MIN_DEADLINE_MS..=MAX_DEADLINE_MS).contains(&deadline_ms) {
        Ok(())
    } else {
        Err(TuringMachineError::InvalidDeadline(deadline_ms))
    }
}

/// Clears the controller's in-flight flag when dropped, including on worker panic.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The caller's side of a background run.
///
/// Dropping the handle cancels the run, so an abandoned run frees its controller at the
/// worker's next step instead of at the deadline.
#[derive(Debug)]
pub struct RunHandle {
    cancel: CancelToken,
    result: Receiver<RunOutcome>,
    worker: Option<JoinHandle<()>>,
    delivered: bool,
}

impl RunHandle {
    /// Makes the next cancellation check of the run observe `true`.
    pub fn force_cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Returns the result if the run has finished, without blocking.
    ///
    /// The outcome is handed out once; later calls return `None`.
    pub fn try_result(&mut self) -> Option<RunOutcome> {
        if self.delivered {
            return None;
        }

        let outcome = match self.result.try_recv() {
            Ok(outcome) => {
                self.join();
                outcome
            }
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(self.worker_failure()),
        };
        self.delivered = true;
        Some(outcome)
    }

    /// Blocks until the run delivers its result.
    pub fn wait(mut self) -> RunOutcome {
        match self.result.recv() {
            Ok(outcome) => {
                self.join();
                outcome
            }
            Err(_) => Err(self.worker_failure()),
        }
    }

    fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    fn worker_failure(&mut self) -> TuringMachineError {
        let reason = match self.worker.take().map(JoinHandle::join) {
            Some(Err(panic)) => panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "worker panicked".to_string()),
            _ => "worker exited without a result".to_string(),
        };
        TuringMachineError::WorkerFailed(reason)
    }
}

impl Drop for RunHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
