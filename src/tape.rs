//! This module defines the `Tape`, an unbounded sequence of symbols that grows in both
//! directions on demand, together with the position of the read/write head.

use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

use crate::types::{Direction, Symbol, BLANK_SYMBOL};

/// A bidirectionally extensible tape.
///
/// Every cell that has ever been addressed exists in `cells`. Addressing a position beyond
/// either end pads the tape with blanks first, one cell at a time. Growth on the left shifts
/// `head` so that it keeps pointing at the same cell. The tape is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tape {
    cells: VecDeque<char>,
    head: usize,
}

impl Tape {
    /// Creates a tape holding `content` with the head on the first cell.
    /// An empty `content` yields a single blank cell.
    pub fn new(content: &str) -> Self {
        let mut cells: VecDeque<char> = content.chars().collect();
        if cells.is_empty() {
            cells.push_back(BLANK_SYMBOL);
        }

        Self { cells, head: 0 }
    }

    /// Index of the head into the current cells.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Number of cells backed so far.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The symbol under the head, without addressing anything new.
    pub fn peek(&self) -> char {
        self.cells.get(self.head).copied().unwrap_or(BLANK_SYMBOL)
    }

    /// Reads the symbol under the head.
    pub fn read(&mut self) -> char {
        self.get(0)
    }

    /// Writes `symbol` under the head. The wildcard leaves the cell unchanged.
    pub fn write(&mut self, symbol: Symbol) {
        self.set(0, symbol);
    }

    /// Reads the cell at `offset` relative to the head, extending the tape if needed.
    pub fn get(&mut self, offset: isize) -> char {
        let index = self.ensure(self.head as isize + offset);
        self.cells[index]
    }

    /// Writes the cell at `offset` relative to the head, extending the tape if needed.
    /// The wildcard only extends.
    pub fn set(&mut self, offset: isize, symbol: Symbol) {
        let index = self.ensure(self.head as isize + offset);
        if let Symbol::Char(c) = symbol {
            self.cells[index] = c;
        }
    }

    /// Moves the head to the absolute `index`; negative indices grow the tape on the left.
    pub fn set_head(&mut self, index: isize) {
        self.head = self.ensure(index);
    }

    /// Moves the head one cell in `direction`.
    pub fn move_head(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.set_head(self.head as isize - 1),
            Direction::Right => self.set_head(self.head as isize + 1),
            Direction::Stay => {}
        }
    }

    /// Returns `2 * radius + 1` symbols centered on the head, without extending the tape.
    /// Positions that are not backed yet read as blank.
    pub fn window(&self, radius: usize) -> Vec<char> {
        let center = self.head as isize;
        let radius = radius as isize;

        (center - radius..=center + radius)
            .map(|i| {
                usize::try_from(i)
                    .ok()
                    .and_then(|i| self.cells.get(i).copied())
                    .unwrap_or(BLANK_SYMBOL)
            })
            .collect()
    }

    /// Pads the tape until `index` is backed by a cell and returns its (possibly shifted)
    /// position.
    fn ensure(&mut self, mut index: isize) -> usize {
        while index < 0 {
            self.cells.push_front(BLANK_SYMBOL);
            self.head += 1;
            index += 1;
        }

        let index = index as usize;
        while index >= self.cells.len() {
            self.cells.push_back(BLANK_SYMBOL);
        }

        index
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new("")
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.cells.iter().try_for_each(|c| write!(f, "{c}"))
    }
}
