//! This module defines the `TuringMachine` definition edited by the caller and the
//! `CompiledMachine` that pairs a definition with its transition table for execution.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::compiler::{compile, TransitionTable};
use crate::types::{
    Action, Cell, CellCoordinates, ConfigError, HeadStart, State, DEFAULT_BLANK_SYMBOL,
    MAX_STATE_COUNT,
};

/// A raw, user-authored table cell, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotentialTransition {
    pub state: State,
    pub symbol: char,
    /// Either empty or `<next state>/<write symbol>/<direction>`.
    pub instruction: String,
}

impl PotentialTransition {
    pub fn new(state: State, symbol: char, instruction: impl Into<String>) -> Self {
        Self {
            state,
            symbol,
            instruction: instruction.into(),
        }
    }

    pub fn cell(&self) -> Cell {
        Cell::new(self.state, self.symbol)
    }
}

/// An RGB colour forwarded untouched to whoever renders the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// A single-tape Turing machine definition.
///
/// This is plain data: the editor mutates it freely and the transition table is only
/// derived from it by [`TuringMachine::compile`], so a definition may be incomplete or
/// invalid between edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuringMachine {
    /// Working symbols in table order. Never contains `blank`.
    pub alphabet: Vec<char>,
    pub blank: char,
    pub state_count: usize,
    pub start_state: State,
    pub final_states: BTreeSet<State>,
    pub head_start: HeadStart,
    pub transitions: Vec<PotentialTransition>,
    pub head_color: Rgb,
    pub state_color: Rgb,
}

impl Default for TuringMachine {
    fn default() -> Self {
        Self {
            alphabet: Vec::new(),
            blank: DEFAULT_BLANK_SYMBOL,
            state_count: 1,
            start_state: 0,
            final_states: BTreeSet::new(),
            head_start: HeadStart::default(),
            transitions: Vec::new(),
            head_color: Rgb(220, 50, 47),
            state_color: Rgb(38, 139, 210),
        }
    }
}

impl TuringMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a working symbol. The blank and duplicates are ignored.
    pub fn add_symbol(&mut self, symbol: char) {
        if symbol != self.blank && !self.alphabet.contains(&symbol) {
            self.alphabet.push(symbol);
        }
    }

    /// Removes a working symbol together with the transitions of its row.
    pub fn remove_symbol(&mut self, symbol: char) {
        self.alphabet.retain(|&s| s != symbol);
        self.transitions.retain(|t| t.symbol != symbol);
    }

    /// Sets the blank symbol, dropping it from the alphabet if it was a working symbol.
    pub fn set_blank(&mut self, blank: char) {
        self.blank = blank;
        self.remove_symbol(blank);
    }

    /// Resizes the machine to `count` states.
    ///
    /// The start state is clamped into range; final states and transitions of removed
    /// states are dropped.
    pub fn set_state_count(&mut self, count: usize) -> Result<(), ConfigError> {
        if count == 0 || count > MAX_STATE_COUNT {
            return Err(ConfigError::InvalidStateCount(count));
        }

        self.state_count = count;
        self.start_state = self.start_state.min(count - 1);
        self.final_states.retain(|&s| s < count);
        self.transitions.retain(|t| t.state < count);
        Ok(())
    }

    pub fn set_start_state(&mut self, state: State) -> Result<(), ConfigError> {
        if state >= self.state_count {
            return Err(ConfigError::StartStateOutOfRange {
                start: state,
                state_count: self.state_count,
            });
        }

        self.start_state = state;
        Ok(())
    }

    pub fn set_final_states(&mut self, states: impl IntoIterator<Item = State>) {
        self.final_states = states.into_iter().collect();
    }

    pub fn set_head_start(&mut self, policy: HeadStart) {
        self.head_start = policy;
    }

    /// Inserts or replaces the instruction authored for `(state, symbol)`.
    pub fn set_instruction(&mut self, state: State, symbol: char, instruction: impl Into<String>) {
        let instruction = instruction.into();
        match self
            .transitions
            .iter_mut()
            .find(|t| t.state == state && t.symbol == symbol)
        {
            Some(existing) => existing.instruction = instruction,
            None => self
                .transitions
                .push(PotentialTransition::new(state, symbol, instruction)),
        }
    }

    /// Returns the instruction authored for `(state, symbol)`, if any.
    pub fn instruction(&self, state: State, symbol: char) -> Option<&str> {
        self.transitions
            .iter()
            .find(|t| t.state == state && t.symbol == symbol)
            .map(|t| t.instruction.as_str())
    }

    pub fn is_final(&self, state: State) -> bool {
        self.final_states.contains(&state)
    }

    /// Returns `true` if `symbol` may appear on the tape: a working symbol or the blank.
    pub fn accepts_symbol(&self, symbol: char) -> bool {
        symbol == self.blank || self.alphabet.contains(&symbol)
    }

    /// Row symbols of the transition table: the blank first when it is not a space,
    /// then the alphabet in order.
    pub fn table_rows(&self) -> Vec<char> {
        let mut rows = Vec::with_capacity(self.alphabet.len() + 1);
        if self.blank != DEFAULT_BLANK_SYMBOL {
            rows.push(self.blank);
        }
        rows.extend(self.alphabet.iter().copied());
        rows
    }

    /// Every cell of the table, one state column at a time.
    pub fn cells(&self) -> Vec<Cell> {
        let rows = self.table_rows();
        (0..self.state_count)
            .flat_map(|state| rows.iter().map(move |&symbol| Cell::new(state, symbol)))
            .collect()
    }

    /// Table coordinates of `(state, symbol)`, or `None` when the symbol has no row.
    pub fn coordinates(&self, state: State, symbol: char) -> Option<CellCoordinates> {
        self.table_rows()
            .iter()
            .position(|&s| s == symbol)
            .map(|row| CellCoordinates { column: state, row })
    }

    pub fn state_label(&self, state: State) -> String {
        format!("q{state}")
    }

    /// Compiles this definition into an executable machine.
    pub fn compile(&self) -> Result<CompiledMachine, ConfigError> {
        CompiledMachine::new(self.clone())
    }
}

/// A definition together with the transition table compiled from it.
///
/// Only obtainable through successful compilation, so the table always matches the
/// definition it carries.
#[derive(Debug, Clone)]
pub struct CompiledMachine {
    machine: TuringMachine,
    table: TransitionTable,
}

impl CompiledMachine {
    pub fn new(machine: TuringMachine) -> Result<Self, ConfigError> {
        let table = compile(&machine)?;
        Ok(Self { machine, table })
    }

    pub fn machine(&self) -> &TuringMachine {
        &self.machine
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub fn action(&self, state: State, symbol: char) -> Action {
        self.table.action(state, symbol)
    }

    pub fn is_final(&self, state: State) -> bool {
        self.machine.is_final(state)
    }
}
