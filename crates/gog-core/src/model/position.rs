use core::fmt;
use serde::{Deserialize, Serialize};

pub const ROWS: usize = 8;
pub const COLS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub const fn in_bounds(self) -> bool {
        (self.row as usize) < ROWS && (self.col as usize) < COLS
    }

    /// Squares one orthogonal step away that lie on the board.
    pub fn neighbours(self) -> impl Iterator<Item = Position> {
        const STEPS: [(i8, i8); 4] = [(0, 1), (1, 0), (-1, 0), (0, -1)];
        STEPS.into_iter().filter_map(move |(dr, dc)| {
            let row = self.row as i8 + dr;
            let col = self.col as i8 + dc;
            if row < 0 || col < 0 {
                return None;
            }
            let next = Position::new(row as u8, col as u8);
            next.in_bounds().then_some(next)
        })
    }

    pub const fn is_adjacent(self, other: Position) -> bool {
        self.row.abs_diff(other.row) as u16 + self.col.abs_diff(other.col) as u16 == 1
    }

    /// Same square seen from the other side of the table.
    pub const fn mirrored(self) -> Position {
        Position::new((ROWS - 1) as u8 - self.row, (COLS - 1) as u8 - self.col)
    }

    pub fn all() -> impl Iterator<Item = Position> {
        (0..ROWS as u8).flat_map(|row| (0..COLS as u8).map(move |col| Position::new(row, col)))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// A single step of one piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
}

impl Move {
    pub const fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}
