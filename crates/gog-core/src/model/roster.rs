use super::board::Board;
use super::piece::{Piece, PieceId};
use super::player::Player;
use super::position::{COLS, Position};
use super::rank::Rank;
use core::fmt;
use rand::Rng;
use rand::seq::SliceRandom;

/// Rows each side fills during placement.
pub const FORMATION_ROWS: usize = 3;

/// The full army of one side, in rank order.
pub const ARMY: [Rank; Rank::ARMY_SIZE] = build_army();

const fn build_army() -> [Rank; Rank::ARMY_SIZE] {
    let mut army = [Rank::Flag; Rank::ARMY_SIZE];
    let mut slot = 0;
    let mut rank_index = 0;
    while rank_index < Rank::COUNT {
        let rank = Rank::ORDERED[rank_index];
        let mut copies = 0;
        while copies < rank.quota() {
            army[slot] = rank;
            slot += 1;
            copies += 1;
        }
        rank_index += 1;
    }
    army
}

/// Initial placement, listed from the owner's back row forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formation {
    rows: [[Option<Rank>; COLS]; FORMATION_ROWS],
}

impl Formation {
    pub fn new(rows: [[Option<Rank>; COLS]; FORMATION_ROWS]) -> Result<Self, FormationError> {
        let formation = Self { rows };
        formation.validate()?;
        Ok(formation)
    }

    /// Uniform random permutation of the army over the three home rows.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut slots: Vec<Option<Rank>> = ARMY.iter().copied().map(Some).collect();
        slots.resize(FORMATION_ROWS * COLS, None);
        slots.shuffle(rng);
        let mut rows = [[None; COLS]; FORMATION_ROWS];
        for (index, slot) in slots.into_iter().enumerate() {
            rows[index / COLS][index % COLS] = slot;
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[[Option<Rank>; COLS]; FORMATION_ROWS] {
        &self.rows
    }

    pub fn validate(&self) -> Result<(), FormationError> {
        let mut counts = [0u8; Rank::COUNT];
        for rank in self.rows.iter().flatten().flatten() {
            counts[rank.index()] += 1;
        }
        for rank in Rank::ORDERED {
            let found = counts[rank.index()];
            if found != rank.quota() {
                return Err(FormationError::WrongCount {
                    rank,
                    expected: rank.quota(),
                    found,
                });
            }
        }
        Ok(())
    }

    /// Places the formation for `owner`, handing out ids from `first_id`.
    ///
    /// Player One's back row is board row 0; Player Two's formation is
    /// mirrored onto rows 7..5.
    pub fn deploy(&self, owner: Player, first_id: u8, board: &mut Board<Piece>) -> u8 {
        let mut next_id = first_id;
        for (row_index, row) in self.rows.iter().enumerate() {
            for (col_index, slot) in row.iter().enumerate() {
                let Some(rank) = *slot else {
                    continue;
                };
                let pos = Position::new(row_index as u8, col_index as u8);
                let pos = match owner {
                    Player::One => pos,
                    Player::Two => pos.mirrored(),
                };
                board.set(pos, Some(Piece::new(PieceId(next_id), owner, rank)));
                next_id += 1;
            }
        }
        next_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormationError {
    WrongCount { rank: Rank, expected: u8, found: u8 },
}

impl fmt::Display for FormationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormationError::WrongCount {
                rank,
                expected,
                found,
            } => write!(f, "formation holds {found} of {rank}, expected {expected}"),
        }
    }
}

impl std::error::Error for FormationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn army_matches_quotas() {
        for rank in Rank::ORDERED {
            let count = ARMY.iter().filter(|r| **r == rank).count();
            assert_eq!(count, rank.quota() as usize);
        }
    }

    #[test]
    fn random_formations_are_valid() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..64 {
            let formation = Formation::random(&mut rng);
            assert!(formation.validate().is_ok());
            let empty = formation.rows().iter().flatten().filter(|s| s.is_none()).count();
            assert_eq!(empty, FORMATION_ROWS * COLS - Rank::ARMY_SIZE);
        }
    }

    #[test]
    fn missing_flag_is_rejected() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut rows = *Formation::random(&mut rng).rows();
        for slot in rows.iter_mut().flatten() {
            if *slot == Some(Rank::Flag) {
                *slot = None;
            }
        }
        assert_eq!(
            Formation::new(rows),
            Err(FormationError::WrongCount {
                rank: Rank::Flag,
                expected: 1,
                found: 0
            })
        );
    }

    #[test]
    fn deploy_mirrors_second_player() {
        let mut rng = SmallRng::seed_from_u64(11);
        let formation = Formation::random(&mut rng);
        let mut board = Board::empty();
        let after_one = formation.deploy(Player::One, 0, &mut board);
        let after_two = formation.deploy(Player::Two, after_one, &mut board);
        assert_eq!(after_one as usize, Rank::ARMY_SIZE);
        assert_eq!(after_two as usize, 2 * Rank::ARMY_SIZE);

        for (row, cols) in formation.rows().iter().enumerate() {
            for (col, slot) in cols.iter().enumerate() {
                let near = board.get(Position::new(row as u8, col as u8));
                let far = board.get(Position::new(row as u8, col as u8).mirrored());
                assert_eq!(near.map(|p| p.rank), *slot);
                assert_eq!(far.map(|p| p.rank), *slot);
                if let Some(piece) = far {
                    assert_eq!(piece.owner, Player::Two);
                }
            }
        }
    }
}
