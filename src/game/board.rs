use std::fmt;

use serde::{Deserialize, Serialize};

use super::Mark;
use crate::error::{InvalidMove, MoveError};

/// Side length of the square grid.
pub const SIZE: usize = 4;
/// Total number of cells, addressed row-major as `row * SIZE + col`.
pub const CELLS: usize = SIZE * SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    /// The mark occupying this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Mark::X),
            Cell::O => Some(Mark::O),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; CELLS],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Board {
            cells: [Cell::Empty; CELLS],
        }
    }

    /// Get the cell at an index, or `None` if the index is off the board
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// All cells in row-major order
    pub fn cells(&self) -> &[Cell; CELLS] {
        &self.cells
    }

    /// Map an index to its (row, col) position
    pub fn row_col(index: usize) -> (usize, usize) {
        (index / SIZE, index % SIZE)
    }

    /// Check whether a cell holds a mark
    pub fn is_occupied(&self, index: usize) -> Result<bool, MoveError> {
        self.get(index)
            .map(|cell| cell != Cell::Empty)
            .ok_or(MoveError::InvalidIndex(index))
    }

    /// Put a mark on an empty cell. Out-of-range and occupied cells are
    /// rejected and the board is left unchanged.
    pub fn place(&mut self, index: usize, mark: Mark) -> Result<(), MoveError> {
        if self.is_occupied(index)? {
            return Err(InvalidMove::Occupied(index).into());
        }
        self.cells[index] = mark.to_cell();
        Ok(())
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&cell| cell != Cell::Empty)
    }

    /// Indices of all empty cells, ascending
    pub fn empty_cells(&self) -> Vec<usize> {
        (0..CELLS)
            .filter(|&index| self.cells[index] == Cell::Empty)
            .collect()
    }

    /// Count cells of the given kind
    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Text grid; empty cells show their index so a console player can type it.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..SIZE {
            if row > 0 {
                writeln!(f, "----+----+----+----")?;
            }
            let line: Vec<String> = (0..SIZE)
                .map(|col| {
                    let index = row * SIZE + col;
                    match self.cells[index].mark() {
                        Some(mark) => format!("  {mark} "),
                        None => format!(" {index:2} "),
                    }
                })
                .collect();
            writeln!(f, "{}", line.join("|"))?;
        }
        Ok(())
    }
}
