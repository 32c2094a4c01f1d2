use super::piece::{Occupant, Piece, PieceId, PieceView};
use super::player::Player;
use super::position::{COLS, Move, Position, ROWS};
use core::fmt;

/// An 8×9 grid of optional occupants.
#[derive(Clone, PartialEq, Eq)]
pub struct Board<T> {
    cells: [[Option<T>; COLS]; ROWS],
}

/// A board as one player sees it.
pub type PovBoard = Board<PieceView>;

impl<T: Occupant> Board<T> {
    pub fn empty() -> Self {
        Self {
            cells: [[None; COLS]; ROWS],
        }
    }

    pub fn get(&self, pos: Position) -> Option<T> {
        if !pos.in_bounds() {
            return None;
        }
        self.cells[pos.row as usize][pos.col as usize]
    }

    pub fn set(&mut self, pos: Position, occupant: Option<T>) {
        debug_assert!(pos.in_bounds(), "square {pos} is off the board");
        self.cells[pos.row as usize][pos.col as usize] = occupant;
    }

    pub fn take(&mut self, pos: Position) -> Option<T> {
        self.cells[pos.row as usize][pos.col as usize].take()
    }

    /// Occupied squares in row-major order.
    pub fn occupants(&self) -> impl Iterator<Item = (Position, T)> + '_ {
        Position::all().filter_map(move |pos| self.get(pos).map(|occupant| (pos, occupant)))
    }

    pub fn pieces_of(&self, player: Player) -> impl Iterator<Item = (Position, T)> + '_ {
        self.occupants()
            .filter(move |(_, occupant)| occupant.owner() == player)
    }

    pub fn locate(&self, id: PieceId) -> Option<Position> {
        self.occupants()
            .find(|(_, occupant)| occupant.id() == id)
            .map(|(pos, _)| pos)
    }

    /// Single orthogonal steps onto empty or enemy-held squares.
    pub fn legal_moves(&self, player: Player) -> Vec<Move> {
        let mut moves = Vec::new();
        for (from, _) in self.pieces_of(player) {
            for to in from.neighbours() {
                let open = match self.get(to) {
                    None => true,
                    Some(other) => other.owner() != player,
                };
                if open {
                    moves.push(Move::new(from, to));
                }
            }
        }
        moves
    }

    pub fn has_legal_move(&self, player: Player) -> bool {
        self.pieces_of(player).any(|(from, _)| {
            from.neighbours().any(|to| match self.get(to) {
                None => true,
                Some(other) => other.owner() != player,
            })
        })
    }
}

impl Board<Piece> {
    /// Hides every rank that `viewer` does not own.
    pub fn pov(&self, viewer: Player) -> PovBoard {
        let mut view = Board::empty();
        for (pos, piece) in self.occupants() {
            view.set(pos, Some(piece.seen_by(viewer)));
        }
        view
    }
}

impl<T: Occupant> Default for Board<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Board<Piece> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.iter() {
            for cell in row.iter() {
                match cell {
                    Some(piece) => write!(f, "{}{} ", piece.owner.index() + 1, piece.rank)?,
                    None => f.write_str(" ... ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board<PieceView> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.iter() {
            for cell in row.iter() {
                match cell {
                    Some(PieceView {
                        owner,
                        rank: Some(rank),
                        ..
                    }) => write!(f, "{}{} ", owner.index() + 1, rank)?,
                    Some(PieceView { owner, .. }) => write!(f, "{}??? ", owner.index() + 1)?,
                    None => f.write_str(" ... ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::rank::Rank;

    fn piece(id: u8, owner: Player, rank: Rank) -> Piece {
        Piece::new(PieceId(id), owner, rank)
    }

    #[test]
    fn lone_piece_in_corner_has_two_moves() {
        let mut board = Board::empty();
        board.set(Position::new(0, 0), Some(piece(0, Player::One, Rank::Major)));
        let moves = board.legal_moves(Player::One);
        assert_eq!(moves.len(), 2);
        assert!(board.legal_moves(Player::Two).is_empty());
        assert!(!board.has_legal_move(Player::Two));
    }

    #[test]
    fn own_pieces_block_and_enemies_are_targets() {
        let mut board = Board::empty();
        board.set(Position::new(0, 0), Some(piece(0, Player::One, Rank::Major)));
        board.set(Position::new(0, 1), Some(piece(1, Player::One, Rank::Private)));
        board.set(Position::new(1, 0), Some(piece(21, Player::Two, Rank::Spy)));
        let from_corner: Vec<_> = board
            .legal_moves(Player::One)
            .into_iter()
            .filter(|mv| mv.from == Position::new(0, 0))
            .collect();
        assert_eq!(
            from_corner,
            vec![Move::new(Position::new(0, 0), Position::new(1, 0))]
        );
    }

    #[test]
    fn pov_hides_enemy_ranks_only() {
        let mut board = Board::empty();
        board.set(Position::new(0, 0), Some(piece(0, Player::One, Rank::Major)));
        board.set(Position::new(7, 8), Some(piece(21, Player::Two, Rank::Flag)));
        let view = board.pov(Player::One);
        assert_eq!(view.get(Position::new(0, 0)).unwrap().rank, Some(Rank::Major));
        assert_eq!(view.get(Position::new(7, 8)).unwrap().rank, None);
        assert_eq!(view.locate(PieceId(21)), Some(Position::new(7, 8)));
    }
}
