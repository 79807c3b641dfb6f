use std::sync::Arc;

use proptest::prelude::*;
use tmsim::samples;
use tmsim::{ExecutionEngine, HeadStart, Status, Tape};

/// Steps allowed to machines that may never halt.
const STEP_BUDGET: usize = 200;

/// Maps every symbol outside `alphabet` to its first symbol.
fn onto_alphabet(raw: &str, alphabet: &[char]) -> String {
    raw.chars()
        .map(|c| if alphabet.contains(&c) { c } else { alphabet[0] })
        .collect()
}

#[test]
fn every_outcome_is_reachable_from_samples() {
    let run = |name: &str, input: &str| {
        let program = Arc::new(samples::by_name(name).unwrap().machine.compile().unwrap());
        let mut engine = ExecutionEngine::with_tape(program, input).unwrap();
        let checks = std::cell::Cell::new(0);
        engine
            .run_to_completion(|| {
                checks.set(checks.get() + 1);
                checks.get() > STEP_BUDGET
            })
            .unwrap()
            .status
    };

    assert_eq!(run("binary-increment", "101"), Status::Accepted);
    assert_eq!(run("even-ones", "100"), Status::Rejected);
    assert_eq!(run("endless-walker", "1"), Status::TimedOut);
}

proptest! {
    #[test]
    fn read_is_total(input in "[01]{0,16}", index in -1_000i64..1_000) {
        let tape = Tape::from_string(&input, '_');
        let symbol = tape.read(index);

        if tape.contains(index) {
            prop_assert!(symbol == '0' || symbol == '1');
        } else {
            prop_assert_eq!(symbol, '_');
        }
    }

    #[test]
    fn write_keeps_window_contiguous(input in "[01]{1,8}", index in -20i64..20) {
        let mut tape = Tape::from_string(&input, '_');
        tape.write(index, '1');

        prop_assert!(tape.contains(index));
        prop_assert_eq!(tape.read(index), '1');
        prop_assert_eq!(tape.len() as i64, tape.end() - tape.start());
    }

    #[test]
    fn start_index_lies_on_tape(input in "[01]{1,16}", rightmost in any::<bool>()) {
        let tape = Tape::from_string(&input, '_');
        let policy = if rightmost {
            HeadStart::FromRightmostSymbol
        } else {
            HeadStart::FromLeftmostSymbol
        };

        prop_assert!(tape.contains(tape.start_index(policy)));
    }

    #[test]
    fn compile_is_idempotent(name in prop::sample::select(samples::names())) {
        let machine = &samples::by_name(name).unwrap().machine;

        let first = machine.compile().unwrap();
        let second = machine.compile().unwrap();

        prop_assert_eq!(first.table(), second.table());
    }

    #[test]
    fn stepping_agrees_with_running(
        name in prop::sample::select(samples::names()),
        raw in "[01]{1,12}",
    ) {
        let machine = &samples::by_name(name).unwrap().machine;
        let program = Arc::new(machine.compile().unwrap());
        let input = onto_alphabet(&raw, &machine.alphabet);

        let mut stepped = ExecutionEngine::with_tape(Arc::clone(&program), &input).unwrap();
        while !stepped.is_halted() && stepped.step_count() < STEP_BUDGET {
            stepped.step().unwrap();
        }
        let status = if stepped.is_halted() {
            stepped.status()
        } else {
            Status::TimedOut
        };

        let mut run = ExecutionEngine::with_tape(program, &input).unwrap();
        let checks = std::cell::Cell::new(0);
        let result = run
            .run_to_completion(|| {
                checks.set(checks.get() + 1);
                checks.get() > STEP_BUDGET
            })
            .unwrap();

        prop_assert_eq!(stepped.result(status).unwrap(), result);
    }
}
