//! The single tape of the machine: a written window of symbols that grows one cell at a time
//! as the head writes past either end, with the blank symbol implied everywhere else.

use std::collections::VecDeque;

use crate::types::HeadStart;

/// A logically infinite tape.
///
/// Only the contiguous written window is stored; every index outside it reads as the blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: VecDeque<char>,
    /// Logical index of `cells[0]`.
    origin: i64,
    blank: char,
}

impl Tape {
    /// Creates a tape whose written window is exactly `input`, starting at index `0`.
    pub fn from_string(input: &str, blank: char) -> Self {
        Self {
            cells: input.chars().collect(),
            origin: 0,
            blank,
        }
    }

    /// Returns the head index prescribed by `policy` for this tape's input.
    ///
    /// An empty window yields `0` under either policy.
    pub fn start_index(&self, policy: HeadStart) -> i64 {
        match policy {
            HeadStart::FromLeftmostSymbol => self.origin,
            HeadStart::FromRightmostSymbol => self.end().saturating_sub(1).max(self.origin),
        }
    }

    /// Reads the symbol at `index`, returning the blank outside the written window.
    pub fn read(&self, index: i64) -> char {
        self.offset(index)
            .and_then(|offset| self.cells.get(offset).copied())
            .unwrap_or(self.blank)
    }

    /// Writes `symbol` at `index`, extending the window with blanks as needed.
    pub fn write(&mut self, index: i64, symbol: char) {
        if self.cells.is_empty() {
            self.origin = index;
            self.cells.push_back(symbol);
            return;
        }

        while index < self.origin {
            self.cells.push_front(self.blank);
            self.origin -= 1;
        }
        while index >= self.end() {
            self.cells.push_back(self.blank);
        }

        if let Some(offset) = self.offset(index) {
            self.cells[offset] = symbol;
        }
    }

    /// Returns the written window, left to right.
    pub fn render(&self) -> String {
        self.cells.iter().collect()
    }

    /// Returns `true` if `index` lies inside the written window.
    pub fn contains(&self, index: i64) -> bool {
        index >= self.origin && index < self.end()
    }

    /// Logical index of the first written cell.
    pub fn start(&self) -> i64 {
        self.origin
    }

    /// Logical index one past the last written cell.
    pub fn end(&self) -> i64 {
        self.origin + self.cells.len() as i64
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn blank(&self) -> char {
        self.blank
    }

    fn offset(&self, index: i64) -> Option<usize> {
        if self.contains(index) {
            usize::try_from(index - self.origin).ok()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_string_window() {
        let tape = Tape::from_string("abc", '_');

        assert_eq!(tape.render(), "abc");
        assert_eq!(tape.start(), 0);
        assert_eq!(tape.end(), 3);
        assert_eq!(tape.read(1), 'b');
    }

    #[test]
    fn test_start_index_policies() {
        let tape = Tape::from_string("abc", '_');

        assert_eq!(tape.start_index(HeadStart::FromLeftmostSymbol), 0);
        assert_eq!(tape.start_index(HeadStart::FromRightmostSymbol), 2);

        let empty = Tape::from_string("", '_');
        assert_eq!(empty.start_index(HeadStart::FromRightmostSymbol), 0);
    }

    #[test]
    fn test_read_outside_window_is_blank() {
        let tape = Tape::from_string("ab", '_');

        assert_eq!(tape.read(-1), '_');
        assert_eq!(tape.read(2), '_');
        assert_eq!(tape.read(i64::MIN), '_');
        assert_eq!(tape.read(i64::MAX), '_');
    }

    #[test]
    fn test_write_extends_right() {
        let mut tape = Tape::from_string("ab", '_');
        tape.write(2, 'c');

        assert_eq!(tape.render(), "abc");

        tape.write(5, 'z');
        assert_eq!(tape.render(), "abc__z");
        assert_eq!(tape.end(), 6);
    }

    #[test]
    fn test_write_extends_left() {
        let mut tape = Tape::from_string("ab", '_');
        tape.write(-1, 'x');

        assert_eq!(tape.render(), "xab");
        assert_eq!(tape.start(), -1);
        assert_eq!(tape.read(-1), 'x');
        assert_eq!(tape.read(0), 'a');

        tape.write(-3, 'y');
        assert_eq!(tape.render(), "y_xab");
    }

    #[test]
    fn test_write_inside_window_overwrites() {
        let mut tape = Tape::from_string("abc", '_');
        tape.write(1, 'x');

        assert_eq!(tape.render(), "axc");
        assert_eq!(tape.len(), 3);
    }

    #[test]
    fn test_write_on_empty_tape_anchors_window() {
        let mut tape = Tape::from_string("", '_');
        tape.write(-4, 'a');

        assert_eq!(tape.render(), "a");
        assert_eq!(tape.start(), -4);
        assert!(tape.contains(-4));
        assert!(!tape.contains(-3));
    }
}
