use gog_core::model::player::Player;
use gog_core::model::rules::{BoardRules, RulesError};
use rand::Rng;
use rand::seq::SliceRandom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayoutOutcome {
    Won(Player),
    /// Ply cap reached with no victor.
    Stalled,
}

impl PlayoutOutcome {
    pub fn winner(self) -> Option<Player> {
        match self {
            PlayoutOutcome::Won(player) => Some(player),
            PlayoutOutcome::Stalled => None,
        }
    }
}

/// Plays uniformly random legal moves from `to_move` until the game is
/// decided or `ply_cap` moves have been made.
///
/// A side left without a legal move loses. Rejections from `rules` can only
/// come from a bug in move generation and are passed back to the caller.
pub fn random_playout<R: Rng + ?Sized>(
    rules: &mut BoardRules,
    to_move: Player,
    ply_cap: u32,
    rng: &mut R,
) -> Result<PlayoutOutcome, RulesError> {
    let mut side = to_move;
    for _ in 0..ply_cap {
        if let Some(victor) = rules.victor() {
            return Ok(PlayoutOutcome::Won(victor));
        }
        let moves = rules.legal_moves(side);
        let Some(&mv) = moves.choose(rng) else {
            return Ok(PlayoutOutcome::Won(side.opponent()));
        };
        rules.apply(mv)?;
        side = side.opponent();
    }
    Ok(rules
        .victor()
        .map_or(PlayoutOutcome::Stalled, PlayoutOutcome::Won))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gog_core::game::Match;
    use gog_core::model::board::Board;
    use gog_core::model::piece::{Piece, PieceId};
    use gog_core::model::position::{Move, Position};
    use gog_core::model::rank::Rank;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn two_flags() -> BoardRules {
        let mut board = Board::empty();
        board.set(
            Position::new(3, 3),
            Some(Piece::new(PieceId(0), Player::One, Rank::Flag)),
        );
        board.set(
            Position::new(4, 3),
            Some(Piece::new(PieceId(21), Player::Two, Rank::Flag)),
        );
        BoardRules::new(board).unwrap()
    }

    #[test]
    fn decided_games_report_their_victor() {
        let mut rules = two_flags();
        rules
            .apply(Move::new(Position::new(3, 3), Position::new(4, 3)))
            .unwrap();
        let outcome =
            random_playout(&mut rules, Player::Two, 10, &mut SmallRng::seed_from_u64(0)).unwrap();
        assert_eq!(outcome, PlayoutOutcome::Won(Player::One));
    }

    #[test]
    fn zero_cap_stalls() {
        let mut rules = two_flags();
        let outcome =
            random_playout(&mut rules, Player::One, 0, &mut SmallRng::seed_from_u64(0)).unwrap();
        assert_eq!(outcome, PlayoutOutcome::Stalled);
        assert_eq!(outcome.winner(), None);
    }

    #[test]
    fn random_games_end_with_the_rules_victor() {
        let mut rng = SmallRng::seed_from_u64(21);
        let mut decided = 0;
        for _ in 0..8 {
            let game = Match::random(&mut rng).unwrap();
            let mut rules = BoardRules::new(game.board().clone()).unwrap();
            let outcome = random_playout(&mut rules, Player::One, 2000, &mut rng).unwrap();
            if let PlayoutOutcome::Won(player) = outcome {
                assert_eq!(rules.victor(), Some(player));
                decided += 1;
            }
        }
        assert!(decided > 0);
    }
}
