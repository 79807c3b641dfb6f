//! This module renders a machine in textbook notation: the formal tuple
//! `M=<Q,Σ,Γ,δ,q0,B,F>` and one line per defined transition of δ.

use crate::machine::{CompiledMachine, TuringMachine};
use crate::types::{Action, Direction};

/// How a space blank is shown, since a bare space is invisible in a set listing.
const VISIBLE_SPACE: &str = "␣";
/// State sets larger than this are abbreviated with an ellipsis.
const MAX_LISTED_STATES: usize = 6;

/// Describes `machine` as a formal tuple.
///
/// For example: `M=<{q0, q1, q2}, {0, 1}, {0, 1, ␣}, δ, q0, ␣, {q2}>`.
pub fn describe(machine: &TuringMachine) -> String {
    let states = describe_states(machine);
    let input = describe_set(machine.alphabet.iter().map(|&c| display_symbol(c)));
    let tape = describe_set(
        machine
            .alphabet
            .iter()
            .chain(std::iter::once(&machine.blank))
            .map(|&c| display_symbol(c)),
    );
    let finals = describe_set(machine.final_states.iter().map(|&s| machine.state_label(s)));

    format!(
        "M=<{states}, {input}, {tape}, δ, {start}, {blank}, {finals}>",
        start = machine.state_label(machine.start_state),
        blank = display_symbol(machine.blank),
    )
}

/// Lists every `Move` of the transition function, e.g. `δ(q0, 0) = (q1, 1, R)`.
pub fn describe_transitions(program: &CompiledMachine) -> Vec<String> {
    let machine = program.machine();
    program
        .table()
        .iter()
        .filter_map(|(cell, action)| match *action {
            Action::Move {
                next_state,
                write,
                direction,
            } => Some(format!(
                "δ({}, {}) = ({}, {}, {})",
                machine.state_label(cell.state),
                display_symbol(cell.symbol),
                machine.state_label(next_state),
                display_symbol(write),
                direction_code(direction)
            )),
            Action::Undefined => None,
        })
        .collect()
}

fn describe_states(machine: &TuringMachine) -> String {
    let count = machine.state_count;
    if count > MAX_LISTED_STATES {
        return format!(
            "{{{}, {}, …, {}}}",
            machine.state_label(0),
            machine.state_label(1),
            machine.state_label(count - 1)
        );
    }
    describe_set((0..count).map(|state| machine.state_label(state)))
}

fn describe_set(items: impl Iterator<Item = String>) -> String {
    format!("{{{}}}", items.collect::<Vec<_>>().join(", "))
}

fn display_symbol(symbol: char) -> String {
    if symbol == ' ' {
        VISIBLE_SPACE.to_string()
    } else {
        symbol.to_string()
    }
}

fn direction_code(direction: Direction) -> &'static str {
    match direction {
        Direction::Left => "L",
        Direction::Right => "R",
        Direction::Stay => "S",
    }
}
