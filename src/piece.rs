//! Active piece: shape matrix, colour and origin, with speculative transforms.

use crate::shapes::{BlockColor, ShapeKind};

/// Column where new pieces appear.
pub const SPAWN_X: i32 = 3;

/// A player move that can be applied to the active piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Left,
    Right,
    Down,
    Rotate,
}

/// Occupancy matrix. `rows[y][x]` is true when the cell is filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    rows: Vec<Vec<bool>>,
}

impl Shape {
    pub fn of(kind: ShapeKind) -> Self {
        let rows = kind
            .pattern()
            .iter()
            .map(|row| row.iter().map(|&b| b == 1).collect())
            .collect();
        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Quarter turn clockwise: transpose, then reverse every row.
    pub fn rotated(&self) -> Self {
        let (h, w) = (self.height(), self.width());
        let rows = (0..w)
            .map(|x| (0..h).rev().map(|y| self.rows[y][x]).collect())
            .collect();
        Self { rows }
    }

    /// (dx, dy) offsets of the filled cells.
    pub fn filled(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.rows.iter().enumerate().flat_map(|(dy, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &on)| on)
                .map(move |(dx, _)| (dx as i32, dy as i32))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub kind: ShapeKind,
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// Piece in spawn orientation at the spawn origin.
    pub fn spawn(kind: ShapeKind) -> Self {
        Self::at(kind, SPAWN_X, 0)
    }

    pub fn at(kind: ShapeKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            shape: Shape::of(kind),
            x,
            y,
        }
    }

    pub fn color(&self) -> BlockColor {
        self.kind.color()
    }

    /// Absolute board coordinates of every filled cell.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape.filled().map(|(dx, dy)| (self.x + dx, self.y + dy))
    }

    pub fn move_down(&mut self) {
        self.y += 1;
    }

    /// Inverse of `move_down`.
    pub fn move_up(&mut self) {
        self.y -= 1;
    }

    pub fn move_left(&mut self) {
        self.x -= 1;
    }

    pub fn move_right(&mut self) {
        self.x += 1;
    }

    pub fn rotate(&mut self) {
        self.shape = self.shape.rotated();
    }

    /// Apply a move without any validation.
    pub fn apply(&mut self, m: Move) {
        match m {
            Move::Left => self.move_left(),
            Move::Right => self.move_right(),
            Move::Down => self.move_down(),
            Move::Rotate => self.rotate(),
        }
    }

    /// Undo a move made with `apply`. There is no counter-rotation, so three more turns.
    pub fn revert(&mut self, m: Move) {
        match m {
            Move::Left => self.move_right(),
            Move::Right => self.move_left(),
            Move::Down => self.move_up(),
            Move::Rotate => {
                for _ in 0..3 {
                    self.rotate();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_rotations_restore_every_shape() {
        for kind in ShapeKind::ALL {
            let mut p = Piece::spawn(kind);
            let original = p.clone();
            for _ in 0..4 {
                p.rotate();
            }
            assert_eq!(p, original, "{kind:?}");
        }
    }

    #[test]
    fn rotate_i_turns_column_into_row() {
        let mut p = Piece::spawn(ShapeKind::I);
        assert_eq!((p.shape.width(), p.shape.height()), (1, 4));
        p.rotate();
        assert_eq!((p.shape.width(), p.shape.height()), (4, 1));
    }

    #[test]
    fn rotate_t_clockwise() {
        // 010    10
        // 111 -> 11
        //        10
        let rotated = Shape::of(ShapeKind::T).rotated();
        let cells: Vec<_> = rotated.filled().collect();
        assert_eq!(cells, vec![(0, 0), (0, 1), (1, 1), (0, 2)]);
    }

    #[test]
    fn revert_undoes_apply() {
        for m in [Move::Left, Move::Right, Move::Down, Move::Rotate] {
            let mut p = Piece::spawn(ShapeKind::L);
            let before = p.clone();
            p.apply(m);
            assert_ne!(p, before, "{m:?}");
            p.revert(m);
            assert_eq!(p, before, "{m:?}");
        }
    }

    #[test]
    fn cells_are_offset_by_origin() {
        let p = Piece::at(ShapeKind::O, 4, 7);
        let cells: Vec<_> = p.cells().collect();
        assert_eq!(cells, vec![(4, 7), (5, 7), (4, 8), (5, 8)]);
    }

    #[test]
    fn spawn_uses_shape_colour() {
        let p = Piece::spawn(ShapeKind::Z);
        assert_eq!((p.x, p.y), (SPAWN_X, 0));
        assert_eq!(p.color(), BlockColor::Red);
    }
}
