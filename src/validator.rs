//! This module provides the checks run before a machine executes: whether an input tape
//! fits the machine's alphabet, and whether the machine definition is complete enough to
//! be simulated at all.

use std::fmt;

use crate::compiler::compile;
use crate::machine::TuringMachine;
use crate::types::{Cell, ConfigError, ValidationFailure, MAX_STATE_COUNT};

/// How many incomplete cells are listed before the status text summarises the rest.
const LISTED_CELLS: usize = 5;

/// Returns `true` if `tape` may be used as input for `machine`.
pub fn validate(tape: &str, machine: &TuringMachine) -> bool {
    validate_tape(tape, machine).is_ok()
}

/// Checks that `tape` is non-empty and only holds working symbols or the blank.
///
/// # Returns
///
/// * `Ok(())` if the tape is acceptable.
/// * `Err(ValidationFailure::EmptyTape)` for an empty tape.
/// * `Err(ValidationFailure::ForeignSymbols)` listing the offending symbols, sorted.
pub fn validate_tape(tape: &str, machine: &TuringMachine) -> Result<(), ValidationFailure> {
    if tape.is_empty() {
        return Err(ValidationFailure::EmptyTape);
    }

    let mut foreign: Vec<char> = tape
        .chars()
        .filter(|&c| !machine.accepts_symbol(c))
        .collect();

    if !foreign.is_empty() {
        foreign.sort_unstable();
        foreign.dedup();
        return Err(ValidationFailure::ForeignSymbols(foreign));
    }

    Ok(())
}

/// A piece of configuration still missing before the machine can be simulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// The alphabet is empty.
    Symbols,
    /// No state is marked final.
    FinalStates,
    /// The state count is outside `[1, MAX_STATE_COUNT]`.
    StateCount,
    /// The start state does not exist.
    StartState,
    /// Cells of non-final states with no instruction.
    Instructions(Vec<Cell>),
    /// The table does not compile; holds the compiler's message.
    Compiles(String),
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Symbols => f.write_str("at least one input symbol"),
            Requirement::FinalStates => f.write_str("at least one final state"),
            Requirement::StateCount => {
                write!(f, "a state count between 1 and {MAX_STATE_COUNT}")
            }
            Requirement::StartState => f.write_str("a start state within the state range"),
            Requirement::Instructions(cells) => {
                let listed = cells
                    .iter()
                    .take(LISTED_CELLS)
                    .map(Cell::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "instructions for {listed}")?;
                if cells.len() > LISTED_CELLS {
                    write!(f, " and {} more", cells.len() - LISTED_CELLS)?;
                }
                Ok(())
            }
            Requirement::Compiles(message) => write!(f, "a valid transition table ({message})"),
        }
    }
}

/// The outcome of [`readiness`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Readiness {
    pub missing: Vec<Requirement>,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        self.missing.is_empty()
    }

    /// A human-readable summary of what is still missing.
    pub fn status(&self) -> String {
        if self.is_ready() {
            return "Ready to simulate".to_string();
        }

        let missing = self
            .missing
            .iter()
            .map(Requirement::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        format!("Missing: {missing}")
    }
}

/// Reports every requirement `machine` does not yet meet.
pub fn readiness(machine: &TuringMachine) -> Readiness {
    let missing = [
        check_symbols,
        check_final_states,
        check_state_count,
        check_start_state,
        check_instructions,
        check_compiles,
    ]
    .iter()
    .filter_map(|check| check(machine).err())
    .collect();

    Readiness { missing }
}

/// Returns whether `machine` may be simulated, with the status text describing why not.
pub fn should_simulation_be_enabled(machine: &TuringMachine) -> (bool, String) {
    let readiness = readiness(machine);
    (readiness.is_ready(), readiness.status())
}

fn check_symbols(machine: &TuringMachine) -> Result<(), Requirement> {
    if machine.alphabet.is_empty() {
        return Err(Requirement::Symbols);
    }
    Ok(())
}

fn check_final_states(machine: &TuringMachine) -> Result<(), Requirement> {
    if machine.final_states.is_empty() {
        return Err(Requirement::FinalStates);
    }
    Ok(())
}

fn check_state_count(machine: &TuringMachine) -> Result<(), Requirement> {
    if machine.state_count == 0 || machine.state_count > MAX_STATE_COUNT {
        return Err(Requirement::StateCount);
    }
    Ok(())
}

fn check_start_state(machine: &TuringMachine) -> Result<(), Requirement> {
    if machine.start_state >= machine.state_count {
        return Err(Requirement::StartState);
    }
    Ok(())
}

/// Every cell of a non-final state needs an instruction; final states halt and need none.
fn check_instructions(machine: &TuringMachine) -> Result<(), Requirement> {
    let incomplete: Vec<Cell> = machine
        .cells()
        .into_iter()
        .filter(|cell| !machine.is_final(cell.state))
        .filter(|cell| {
            machine
                .instruction(cell.state, cell.symbol)
                .is_none_or(|instruction| instruction.trim().is_empty())
        })
        .collect();

    if !incomplete.is_empty() {
        return Err(Requirement::Instructions(incomplete));
    }
    Ok(())
}

fn check_compiles(machine: &TuringMachine) -> Result<(), Requirement> {
    match compile(machine) {
        Ok(_) => Ok(()),
        // Already reported by the state checks
        Err(ConfigError::InvalidStateCount(_) | ConfigError::StartStateOutOfRange { .. }) => {
            Ok(())
        }
        Err(e) => Err(Requirement::Compiles(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_machine() -> TuringMachine {
        let mut machine = TuringMachine::new();
        machine.add_symbol('0');
        machine.add_symbol('1');
        machine.set_state_count(3).unwrap();
        machine.set_final_states([2]);
        machine
    }

    fn complete_machine() -> TuringMachine {
        let mut machine = create_test_machine();
        machine.set_instruction(0, '0', "1/1/Right");
        machine.set_instruction(0, '1', "0/1/Right");
        machine.set_instruction(1, '0', "1/0/Left");
        machine.set_instruction(1, '1', "2/0/Stay");
        machine
    }

    #[test]
    fn test_validate_accepts_alphabet_and_blank() {
        let machine = create_test_machine();

        assert!(validate("0110", &machine));
        assert!(validate("0 1", &machine));
    }

    #[test]
    fn test_validate_rejects_empty_tape() {
        let machine = create_test_machine();

        assert!(!validate("", &machine));
        assert_eq!(
            validate_tape("", &machine),
            Err(ValidationFailure::EmptyTape)
        );
    }

    #[test]
    fn test_validate_rejects_foreign_symbols() {
        let machine = create_test_machine();

        assert!(!validate("2", &machine));
        assert_eq!(
            validate_tape("0a2a1", &machine),
            Err(ValidationFailure::ForeignSymbols(vec!['2', 'a']))
        );
    }

    #[test]
    fn test_validate_does_not_mutate_machine() {
        let machine = create_test_machine();
        let before = machine.clone();

        let _ = validate("012", &machine);

        assert_eq!(machine, before);
    }

    #[test]
    fn test_complete_machine_is_ready() {
        let (enabled, status) = should_simulation_be_enabled(&complete_machine());

        assert!(enabled);
        assert_eq!(status, "Ready to simulate");
    }

    #[test]
    fn test_empty_machine_lists_requirements() {
        let readiness = readiness(&TuringMachine::new());

        assert!(!readiness.is_ready());
        assert_eq!(
            readiness.missing,
            vec![Requirement::Symbols, Requirement::FinalStates]
        );
        assert_eq!(
            readiness.status(),
            "Missing: at least one input symbol; at least one final state"
        );
    }

    #[test]
    fn test_final_states_need_no_instructions() {
        let machine = complete_machine();

        assert_eq!(machine.instruction(2, '0'), None);
        assert!(check_instructions(&machine).is_ok());
    }

    #[test]
    fn test_missing_instructions_on_non_final_state() {
        let mut machine = complete_machine();
        machine.set_instruction(1, '0', "");

        let readiness = readiness(&machine);

        assert_eq!(
            readiness.missing,
            vec![Requirement::Instructions(vec![Cell::new(1, '0')])]
        );
        assert!(readiness.status().contains("instructions for (q1, '0')"));
    }

    #[test]
    fn test_blank_row_required_when_blank_is_not_space() {
        let mut machine = complete_machine();
        machine.set_blank('_');

        match readiness(&machine).missing.as_slice() {
            [Requirement::Instructions(cells)] => {
                assert_eq!(cells, &vec![Cell::new(0, '_'), Cell::new(1, '_')]);
            }
            other => panic!("Expected missing blank row instructions, got {other:?}"),
        }
    }

    #[test]
    fn test_long_instruction_list_is_summarised() {
        let mut machine = TuringMachine::new();
        machine.add_symbol('a');
        machine.set_state_count(8).unwrap();
        machine.set_final_states([7]);

        let status = readiness(&machine).status();

        assert!(status.contains("(q4, 'a')"));
        assert!(!status.contains("(q5, 'a')"));
        assert!(status.contains("and 2 more"));
    }

    #[test]
    fn test_compile_errors_block_simulation() {
        let mut machine = complete_machine();
        machine.set_instruction(0, '0', "7/1/Right");

        let readiness = readiness(&machine);

        assert!(matches!(
            readiness.missing.as_slice(),
            [Requirement::Compiles(message)] if message.contains("q7")
        ));
    }

    #[test]
    fn test_start_state_out_of_range_reported_once() {
        let mut machine = complete_machine();
        machine.start_state = 9;

        assert_eq!(readiness(&machine).missing, vec![Requirement::StartState]);
    }
}
