use super::board::Board;
use super::piece::{Piece, PieceId};
use super::player::Player;
use super::position::Move;
use super::rank::{DuelOutcome, Rank};
use core::fmt;

/// Pieces removed by one move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eliminated {
    None,
    One(PieceId),
    /// Attacker first, defender second.
    Both(PieceId, PieceId),
}

impl Eliminated {
    pub const fn count(self) -> usize {
        match self {
            Eliminated::None => 0,
            Eliminated::One(_) => 1,
            Eliminated::Both(_, _) => 2,
        }
    }

    pub const fn contains(self, id: PieceId) -> bool {
        match self {
            Eliminated::None => false,
            Eliminated::One(a) => a.0 == id.0,
            Eliminated::Both(a, b) => a.0 == id.0 || b.0 == id.0,
        }
    }
}

/// Authoritative board that validates and applies moves.
#[derive(Debug, Clone)]
pub struct BoardRules {
    board: Board<Piece>,
    victor: Option<Player>,
    // Flag sitting on the far row with an enemy beside it.
    pending: [bool; 2],
}

impl BoardRules {
    pub fn new(board: Board<Piece>) -> Result<Self, RulesError> {
        let mut counts = [[0u8; Rank::COUNT]; 2];
        for (_, piece) in board.occupants() {
            counts[piece.owner.index()][piece.rank.index()] += 1;
        }
        for player in Player::BOTH {
            for rank in Rank::ORDERED {
                let found = counts[player.index()][rank.index()];
                if found > rank.quota() || (rank == Rank::Flag && found == 0) {
                    return Err(RulesError::InvalidBoard {
                        player,
                        rank,
                        found,
                    });
                }
            }
        }
        Ok(Self {
            board,
            victor: None,
            pending: [false; 2],
        })
    }

    pub fn board(&self) -> &Board<Piece> {
        &self.board
    }

    pub fn victor(&self) -> Option<Player> {
        self.victor
    }

    pub fn legal_moves(&self, player: Player) -> Vec<Move> {
        if self.victor.is_some() {
            return Vec::new();
        }
        self.board.legal_moves(player)
    }

    /// Applies one move and reports which pieces were removed.
    pub fn apply(&mut self, mv: Move) -> Result<Eliminated, RulesError> {
        if self.victor.is_some() {
            return Err(RulesError::GameOver);
        }
        if !mv.from.in_bounds() || !mv.to.in_bounds() || !mv.from.is_adjacent(mv.to) {
            return Err(RulesError::IllegalMove { mv });
        }
        let Some(mover) = self.board.get(mv.from) else {
            return Err(RulesError::IllegalMove { mv });
        };
        let player = mover.owner;

        let eliminated = match self.board.get(mv.to) {
            Some(target) if target.owner == player => {
                return Err(RulesError::IllegalMove { mv });
            }
            Some(target) => self.resolve_combat(mv, mover, target),
            None => {
                self.board.take(mv.from);
                self.board.set(mv.to, Some(mover));
                if mover.rank == Rank::Flag && mv.to.row as usize == player.goal_row() {
                    self.flag_reached_goal(mv, player);
                }
                Eliminated::None
            }
        };

        let other = player.opponent();
        if self.victor.is_none() && self.pending[other.index()] {
            self.victor = Some(other);
        }
        Ok(eliminated)
    }

    fn resolve_combat(&mut self, mv: Move, mover: Piece, target: Piece) -> Eliminated {
        self.board.take(mv.from);
        match mover.rank.duel(target.rank) {
            DuelOutcome::AttackerWins => {
                if target.rank == Rank::Flag {
                    self.victor = Some(mover.owner);
                }
                self.board.set(mv.to, Some(mover));
                Eliminated::One(target.id)
            }
            DuelOutcome::Draw => {
                self.board.take(mv.to);
                Eliminated::Both(mover.id, target.id)
            }
            DuelOutcome::AttackerLoses => {
                if mover.rank == Rank::Flag {
                    self.victor = Some(target.owner);
                }
                Eliminated::One(mover.id)
            }
        }
    }

    fn flag_reached_goal(&mut self, mv: Move, player: Player) {
        let threatened = mv.to.neighbours().any(|pos| {
            pos.row == mv.to.row
                && self
                    .board
                    .get(pos)
                    .is_some_and(|piece| piece.owner != player)
        });
        if threatened {
            self.pending[player.index()] = true;
        } else {
            self.victor = Some(player);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    InvalidBoard {
        player: Player,
        rank: Rank,
        found: u8,
    },
    IllegalMove {
        mv: Move,
    },
    GameOver,
}

impl fmt::Display for RulesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RulesError::InvalidBoard {
                player,
                rank,
                found,
            } => write!(f, "{player} fields {found} of {rank}, which breaks the army quota"),
            RulesError::IllegalMove { mv } => write!(f, "illegal move {mv}"),
            RulesError::GameOver => f.write_str("the game has already been decided"),
        }
    }
}

impl std::error::Error for RulesError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::position::Position;

    fn at(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    fn board_with(pieces: &[(Position, u8, Player, Rank)]) -> Board<Piece> {
        let mut board = Board::empty();
        for &(pos, id, owner, rank) in pieces {
            board.set(pos, Some(Piece::new(PieceId(id), owner, rank)));
        }
        board
    }

    fn with_flags(mut extra: Vec<(Position, u8, Player, Rank)>) -> BoardRules {
        extra.push((at(0, 8), 40, Player::One, Rank::Flag));
        extra.push((at(7, 0), 41, Player::Two, Rank::Flag));
        BoardRules::new(board_with(&extra)).expect("valid board")
    }

    #[test]
    fn board_without_flag_is_rejected() {
        let board = board_with(&[
            (at(0, 0), 0, Player::One, Rank::Flag),
            (at(7, 7), 21, Player::Two, Rank::Major),
        ]);
        assert!(matches!(
            BoardRules::new(board),
            Err(RulesError::InvalidBoard {
                player: Player::Two,
                rank: Rank::Flag,
                found: 0
            })
        ));
    }

    #[test]
    fn board_over_quota_is_rejected() {
        let board = board_with(&[
            (at(0, 0), 0, Player::One, Rank::Flag),
            (at(0, 1), 1, Player::One, Rank::Major),
            (at(0, 2), 2, Player::One, Rank::Major),
            (at(7, 7), 21, Player::Two, Rank::Flag),
        ]);
        assert!(matches!(
            BoardRules::new(board),
            Err(RulesError::InvalidBoard { rank: Rank::Major, found: 2, .. })
        ));
    }

    #[test]
    fn higher_rank_captures_defender() {
        let mut rules = with_flags(vec![
            (at(3, 3), 0, Player::One, Rank::Colonel),
            (at(4, 3), 21, Player::Two, Rank::Major),
        ]);
        let eliminated = rules.apply(Move::new(at(3, 3), at(4, 3))).unwrap();
        assert_eq!(eliminated, Eliminated::One(PieceId(21)));
        assert_eq!(rules.board().get(at(4, 3)).unwrap().id, PieceId(0));
        assert!(rules.board().get(at(3, 3)).is_none());
        assert_eq!(rules.victor(), None);
    }

    #[test]
    fn equal_ranks_remove_both() {
        let mut rules = with_flags(vec![
            (at(3, 3), 0, Player::One, Rank::Private),
            (at(4, 3), 21, Player::Two, Rank::Private),
        ]);
        let eliminated = rules.apply(Move::new(at(3, 3), at(4, 3))).unwrap();
        assert_eq!(eliminated, Eliminated::Both(PieceId(0), PieceId(21)));
        assert!(rules.board().get(at(3, 3)).is_none());
        assert!(rules.board().get(at(4, 3)).is_none());
    }

    #[test]
    fn losing_attacker_is_removed() {
        let mut rules = with_flags(vec![
            (at(3, 3), 0, Player::One, Rank::Spy),
            (at(4, 3), 21, Player::Two, Rank::Private),
        ]);
        let eliminated = rules.apply(Move::new(at(3, 3), at(4, 3))).unwrap();
        assert_eq!(eliminated, Eliminated::One(PieceId(0)));
        assert_eq!(rules.board().get(at(4, 3)).unwrap().id, PieceId(21));
    }

    #[test]
    fn capturing_the_flag_wins() {
        let mut rules = with_flags(vec![(at(6, 0), 0, Player::One, Rank::Private)]);
        rules.apply(Move::new(at(6, 0), at(7, 0))).unwrap();
        assert_eq!(rules.victor(), Some(Player::One));
        assert_eq!(
            rules.apply(Move::new(at(7, 0), at(6, 0))),
            Err(RulesError::GameOver)
        );
    }

    #[test]
    fn flag_attacking_and_losing_concedes() {
        let mut rules = with_flags(vec![(at(1, 8), 21, Player::Two, Rank::Sergeant)]);
        rules.apply(Move::new(at(0, 8), at(1, 8))).unwrap();
        assert_eq!(rules.victor(), Some(Player::Two));
    }

    #[test]
    fn flag_attacking_flag_wins() {
        let mut rules = BoardRules::new(board_with(&[
            (at(3, 3), 0, Player::One, Rank::Flag),
            (at(4, 3), 21, Player::Two, Rank::Flag),
        ]))
        .unwrap();
        let eliminated = rules.apply(Move::new(at(4, 3), at(3, 3))).unwrap();
        assert_eq!(eliminated, Eliminated::One(PieceId(0)));
        assert_eq!(rules.victor(), Some(Player::Two));
    }

    #[test]
    fn unguarded_flag_on_far_row_wins_at_once() {
        let mut rules = BoardRules::new(board_with(&[
            (at(6, 4), 0, Player::One, Rank::Flag),
            (at(0, 0), 21, Player::Two, Rank::Flag),
        ]))
        .unwrap();
        rules.apply(Move::new(at(6, 4), at(7, 4))).unwrap();
        assert_eq!(rules.victor(), Some(Player::One));
    }

    #[test]
    fn guarded_flag_wins_after_surviving_a_turn() {
        let mut rules = BoardRules::new(board_with(&[
            (at(6, 4), 0, Player::One, Rank::Flag),
            (at(7, 5), 21, Player::Two, Rank::Private),
            (at(0, 0), 22, Player::Two, Rank::Flag),
        ]))
        .unwrap();
        rules.apply(Move::new(at(6, 4), at(7, 4))).unwrap();
        assert_eq!(rules.victor(), None);
        // Player Two wanders off instead of capturing.
        rules.apply(Move::new(at(0, 0), at(1, 0))).unwrap();
        assert_eq!(rules.victor(), Some(Player::One));
    }

    #[test]
    fn guarded_flag_can_still_be_captured() {
        let mut rules = BoardRules::new(board_with(&[
            (at(6, 4), 0, Player::One, Rank::Flag),
            (at(7, 5), 21, Player::Two, Rank::Private),
            (at(0, 0), 22, Player::Two, Rank::Flag),
        ]))
        .unwrap();
        rules.apply(Move::new(at(6, 4), at(7, 4))).unwrap();
        rules.apply(Move::new(at(7, 5), at(7, 4))).unwrap();
        assert_eq!(rules.victor(), Some(Player::Two));
    }

    #[test]
    fn illegal_steps_are_rejected() {
        let mut rules = with_flags(vec![
            (at(3, 3), 0, Player::One, Rank::Major),
            (at(3, 4), 1, Player::One, Rank::Captain),
        ]);
        let diagonal = Move::new(at(3, 3), at(4, 4));
        let onto_own = Move::new(at(3, 3), at(3, 4));
        let from_empty = Move::new(at(5, 5), at(5, 6));
        let off_board = Move::new(at(0, 8), at(0, 9));
        for mv in [diagonal, onto_own, from_empty, off_board] {
            assert_eq!(rules.apply(mv), Err(RulesError::IllegalMove { mv }));
        }
    }
}
