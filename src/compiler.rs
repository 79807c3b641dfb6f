//! This module compiles the raw instructions of a `TuringMachine` into a `TransitionTable`,
//! utilizing the `pest` crate for the instruction syntax. Every malformed cell is reported
//! as a `ConfigError`; nothing is silently defaulted.

use pest::Parser as PestParser;
use pest_derive::Parser as PestParser;
use std::collections::{BTreeMap, HashSet};

use crate::machine::TuringMachine;
use crate::types::{
    Action, Cell, ConfigError, Direction, State, INPUT_BLANK_SYMBOL, MAX_STATE_COUNT,
};

/// Derives a `PestParser` for the instruction grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct InstructionParser;

/// The compiled mapping from (state, symbol) to the action taken.
///
/// Cells that were never authored read as [`Action::Undefined`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTable {
    actions: BTreeMap<Cell, Action>,
}

impl TransitionTable {
    /// Returns the action for `(state, symbol)`.
    pub fn action(&self, state: State, symbol: char) -> Action {
        self.actions
            .get(&Cell::new(state, symbol))
            .copied()
            .unwrap_or(Action::Undefined)
    }

    /// Iterates over every recorded cell in (state, symbol) order.
    pub fn iter(&self) -> impl Iterator<Item = (&Cell, &Action)> {
        self.actions.iter()
    }

    /// Number of cells with a `Move` action.
    pub fn move_count(&self) -> usize {
        self.actions
            .values()
            .filter(|action| matches!(action, Action::Move { .. }))
            .count()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Compiles the potential transitions of `machine` into a `TransitionTable`.
///
/// The machine-level settings are checked first, then every potential transition is
/// parsed in list order; the first failure aborts compilation.
///
/// # Returns
///
/// * `Ok(TransitionTable)` if every cell compiles.
/// * `Err(ConfigError)` describing the first invalid setting or cell.
pub fn compile(machine: &TuringMachine) -> Result<TransitionTable, ConfigError> {
    check_machine(machine)?;

    let mut seen = HashSet::new();
    let mut actions = BTreeMap::new();

    for transition in &machine.transitions {
        let cell = transition.cell();

        if cell.state >= machine.state_count || !machine.accepts_symbol(cell.symbol) {
            return Err(ConfigError::CellOutsideTable { cell });
        }

        // Prevent a cell from being authored twice
        if !seen.insert(cell) {
            return Err(ConfigError::DuplicateCell { cell });
        }

        actions.insert(cell, parse_instruction(cell, &transition.instruction, machine)?);
    }

    let table = TransitionTable { actions };
    tracing::debug!(
        cells = table.len(),
        moves = table.move_count(),
        states = machine.state_count,
        "compiled transition table"
    );

    Ok(table)
}

/// Checks the settings that every executable machine must satisfy.
fn check_machine(machine: &TuringMachine) -> Result<(), ConfigError> {
    if machine.state_count == 0 || machine.state_count > MAX_STATE_COUNT {
        return Err(ConfigError::InvalidStateCount(machine.state_count));
    }

    if machine.start_state >= machine.state_count {
        return Err(ConfigError::StartStateOutOfRange {
            start: machine.start_state,
            state_count: machine.state_count,
        });
    }

    if let Some(&state) = machine
        .final_states
        .iter()
        .find(|&&state| state >= machine.state_count)
    {
        return Err(ConfigError::FinalStateOutOfRange {
            state,
            state_count: machine.state_count,
        });
    }

    if machine.alphabet.contains(&machine.blank) {
        return Err(ConfigError::BlankInAlphabet(machine.blank));
    }

    Ok(())
}

/// Parses the instruction authored for `cell`.
///
/// An empty (or whitespace-only) instruction compiles to [`Action::Undefined`].
pub fn parse_instruction(
    cell: Cell,
    instruction: &str,
    machine: &TuringMachine,
) -> Result<Action, ConfigError> {
    if instruction.trim().is_empty() {
        return Ok(Action::Undefined);
    }

    let pairs = InstructionParser::parse(Rule::instruction, instruction).map_err(|e| {
        ConfigError::Syntax {
            cell,
            instruction: instruction.to_string(),
            source: Box::new(e),
        }
    })?;

    let (mut next_state, mut write, mut direction) = ("", "", "");
    for pair in pairs.flat_map(|p| p.into_inner()) {
        match pair.as_rule() {
            Rule::next_state => next_state = pair.as_str(),
            Rule::write => write = pair.as_str(),
            Rule::direction => direction = pair.as_str(),
            _ => {} // EOI
        }
    }

    Ok(Action::Move {
        next_state: parse_state(cell, next_state.trim(), machine)?,
        write: parse_write(cell, write, machine)?,
        direction: parse_direction(cell, direction.trim())?,
    })
}

/// Parses the next-state field as an index in `[0, state_count)`.
fn parse_state(cell: Cell, input: &str, machine: &TuringMachine) -> Result<State, ConfigError> {
    let target = input
        .parse::<usize>()
        .map_err(|_| ConfigError::InvalidState {
            cell,
            found: input.to_string(),
        })?;

    if target >= machine.state_count {
        return Err(ConfigError::StateOutOfRange {
            cell,
            target,
            state_count: machine.state_count,
        });
    }

    Ok(target)
}

/// Parses the write field as exactly one symbol of the alphabet or the blank.
///
/// `INPUT_BLANK_SYMBOL` stands for the blank unless it is a tape symbol itself.
fn parse_write(cell: Cell, input: &str, machine: &TuringMachine) -> Result<char, ConfigError> {
    let mut chars = input.chars();
    let symbol = match (chars.next(), chars.next()) {
        (Some(symbol), None) => symbol,
        _ => {
            return Err(ConfigError::InvalidWriteSymbol {
                cell,
                found: input.to_string(),
            })
        }
    };

    if machine.accepts_symbol(symbol) {
        Ok(symbol)
    } else if symbol == INPUT_BLANK_SYMBOL {
        Ok(machine.blank)
    } else {
        Err(ConfigError::SymbolOutsideAlphabet { cell, symbol })
    }
}

/// Parses a direction token.
///
/// Supports `Left`/`L`/`<`, `Right`/`R`/`>` and `Stay`/`S`/`-`, ignoring letter case.
fn parse_direction(cell: Cell, input: &str) -> Result<Direction, ConfigError> {
    match input.to_ascii_lowercase().as_str() {
        "left" | "l" | "<" => Ok(Direction::Left),
        "right" | "r" | ">" => Ok(Direction::Right),
        "stay" | "s" | "-" => Ok(Direction::Stay),
        _ => Err(ConfigError::UnknownDirection {
            cell,
            found: input.to_string(),
        }),
    }
}
