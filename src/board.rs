//! Board: locked cells, collision, locking and line clears.

use crate::piece::{Piece, SPAWN_X};
use crate::shapes::BlockColor;
use std::collections::VecDeque;

/// Default board size in cells.
pub const DEFAULT_WIDTH: usize = 10;
pub const DEFAULT_HEIGHT: usize = 20;

/// Narrowest board where every shape fits at the spawn column.
pub const MIN_WIDTH: usize = SPAWN_X as usize + 3;

/// Single cell: empty or holding a locked block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Locked(BlockColor),
}

impl Cell {
    pub fn is_locked(self) -> bool {
        matches!(self, Self::Locked(_))
    }
}

/// Grid of cells. y=0 is top; rows[0] is the top row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    rows: VecDeque<Vec<Cell>>,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "board must have at least one cell");
        let rows = (0..height).map(|_| vec![Cell::Empty; width]).collect();
        Self {
            width,
            height,
            rows,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Panics when (x, y) is off the board.
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.rows[y][x]
    }

    /// Panics when (x, y) is off the board.
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        self.rows[y][x] = cell;
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Empty every cell.
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(Cell::Empty);
        }
    }

    /// True if any filled cell of the piece is off the sides, at or below the floor,
    /// or on a locked cell. Cells above the top edge never collide.
    pub fn collides(&self, piece: &Piece) -> bool {
        piece.cells().any(|(x, y)| {
            if x < 0 || x >= self.width as i32 || y >= self.height as i32 {
                return true;
            }
            if y < 0 {
                return false;
            }
            self.cell(x as usize, y as usize).is_locked()
        })
    }

    /// Copy the piece into the grid. Cells outside the board are dropped.
    pub fn lock(&mut self, piece: &Piece) {
        let color = piece.color();
        for (x, y) in piece.cells() {
            if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
                self.set(x as usize, y as usize, Cell::Locked(color));
            }
        }
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows[y].iter().all(|c| c.is_locked())
    }

    /// Remove every full row, top to bottom, pushing an empty row in at the top
    /// for each one. Returns the indices of the cleared rows.
    pub fn clear_lines(&mut self) -> Vec<usize> {
        let mut cleared = Vec::new();
        for y in 0..self.height {
            if self.is_row_full(y) {
                // Rows above y shift down by one; rows below keep their index.
                self.rows.remove(y);
                self.rows.push_front(vec![Cell::Empty; self.width]);
                cleared.push(y);
            }
        }
        cleared
    }

    /// Game over once anything is locked in the top row.
    pub fn is_game_over(&self) -> bool {
        self.rows[0].iter().any(|c| c.is_locked())
    }
}
