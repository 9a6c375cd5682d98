//! Shape catalog: the seven tetrominoes and their colours.

/// Tetromino kinds (I, O, T, L, J, S, Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeKind {
    I,
    O,
    T,
    L,
    J,
    S,
    Z,
}

/// Block colour, fixed by shape identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockColor {
    Cyan,
    Yellow,
    Purple,
    Orange,
    Blue,
    Green,
    Red,
}

impl BlockColor {
    /// Stable index 0..7, used by the theme's colour table.
    pub fn index(self) -> usize {
        match self {
            Self::Cyan => 0,
            Self::Yellow => 1,
            Self::Purple => 2,
            Self::Orange => 3,
            Self::Blue => 4,
            Self::Green => 5,
            Self::Red => 6,
        }
    }
}

impl ShapeKind {
    pub const ALL: [Self; 7] = [Self::I, Self::O, Self::T, Self::L, Self::J, Self::S, Self::Z];

    /// Spawn orientation, row-major; `1` marks an occupied cell.
    pub fn pattern(self) -> &'static [&'static [u8]] {
        match self {
            Self::I => &[&[1], &[1], &[1], &[1]],
            Self::O => &[&[1, 1], &[1, 1]],
            Self::T => &[&[0, 1, 0], &[1, 1, 1]],
            Self::L => &[&[1, 0], &[1, 0], &[1, 1]],
            Self::J => &[&[0, 1], &[0, 1], &[1, 1]],
            Self::S => &[&[0, 1, 1], &[1, 1, 0]],
            Self::Z => &[&[1, 1, 0], &[0, 1, 1]],
        }
    }

    pub fn color(self) -> BlockColor {
        match self {
            Self::I => BlockColor::Cyan,
            Self::O => BlockColor::Yellow,
            Self::T => BlockColor::Purple,
            Self::L => BlockColor::Orange,
            Self::J => BlockColor::Blue,
            Self::S => BlockColor::Green,
            Self::Z => BlockColor::Red,
        }
    }
}
