use crate::model::board::{Board, PovBoard};
use crate::model::event::CombatEvent;
use crate::model::piece::Piece;
use crate::model::player::Player;
use crate::model::position::Move;
use crate::model::roster::{Formation, FormationError};
use crate::model::rules::{BoardRules, RulesError};
use core::fmt;
use rand::Rng;

/// One game between two placed armies, with turn order enforced.
#[derive(Debug, Clone)]
pub struct Match {
    rules: BoardRules,
    turn: Player,
    plies: u32,
}

impl Match {
    pub fn new(first: &Formation, second: &Formation) -> Result<Self, MatchError> {
        first
            .validate()
            .map_err(|source| MatchError::Formation {
                player: Player::One,
                source,
            })?;
        second
            .validate()
            .map_err(|source| MatchError::Formation {
                player: Player::Two,
                source,
            })?;

        let mut board = Board::empty();
        let next_id = first.deploy(Player::One, 0, &mut board);
        second.deploy(Player::Two, next_id, &mut board);
        let rules = BoardRules::new(board).map_err(MatchError::Rules)?;

        Ok(Self {
            rules,
            turn: Player::One,
            plies: 0,
        })
    }

    /// Both sides placed uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Result<Self, MatchError> {
        let first = Formation::random(rng);
        let second = Formation::random(rng);
        Self::new(&first, &second)
    }

    pub fn board(&self) -> &Board<Piece> {
        self.rules.board()
    }

    pub fn pov(&self, viewer: Player) -> PovBoard {
        self.rules.board().pov(viewer)
    }

    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn plies(&self) -> u32 {
        self.plies
    }

    pub fn victor(&self) -> Option<Player> {
        self.rules.victor()
    }

    pub fn is_over(&self) -> bool {
        self.rules.victor().is_some()
    }

    pub fn legal_moves(&self, player: Player) -> Vec<Move> {
        self.rules.legal_moves(player)
    }

    /// Plays `mv` for `player` and returns what both sides observe.
    pub fn play(&mut self, player: Player, mv: Move) -> Result<CombatEvent, MatchError> {
        if player != self.turn {
            return Err(MatchError::OutOfTurn {
                expected: self.turn,
                found: player,
            });
        }
        let Some(attacker) = self.rules.board().get(mv.from) else {
            return Err(MatchError::Rules(RulesError::IllegalMove { mv }));
        };
        if attacker.owner != player {
            return Err(MatchError::Rules(RulesError::IllegalMove { mv }));
        }
        let defender = self.rules.board().get(mv.to).map(|piece| piece.id);

        let eliminated = self.rules.apply(mv).map_err(MatchError::Rules)?;
        self.turn = player.opponent();
        self.plies += 1;

        Ok(CombatEvent {
            mv,
            attacker: attacker.id,
            defender,
            eliminated,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    Formation {
        player: Player,
        source: FormationError,
    },
    OutOfTurn {
        expected: Player,
        found: Player,
    },
    Rules(RulesError),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::Formation { player, source } => {
                write!(f, "{player} submitted an invalid formation: {source}")
            }
            MatchError::OutOfTurn { expected, found } => {
                write!(f, "{found} moved out of turn; {expected} is to move")
            }
            MatchError::Rules(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for MatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MatchError::Formation { source, .. } => Some(source),
            MatchError::Rules(err) => Some(err),
            MatchError::OutOfTurn { .. } => None,
        }
    }
}
