use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Player {
    One = 0,
    Two = 1,
}

impl Player {
    pub const BOTH: [Player; 2] = [Player::One, Player::Two];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Player::One),
            1 => Some(Player::Two),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Row of this player's own back rank.
    pub const fn home_row(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => super::position::ROWS - 1,
        }
    }

    /// Row a flag of this player must reach to win by advance.
    pub const fn goal_row(self) -> usize {
        self.opponent().home_row()
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Player::One => "Player One",
            Player::Two => "Player Two",
        };
        f.write_str(label)
    }
}
