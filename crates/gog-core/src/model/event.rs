use super::piece::PieceId;
use super::position::Move;
use super::rules::Eliminated;

/// What both players learn from one move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatEvent {
    pub mv: Move,
    pub attacker: PieceId,
    /// Occupant of the destination square before the move, if any.
    pub defender: Option<PieceId>,
    pub eliminated: Eliminated,
}

impl CombatEvent {
    pub const fn quiet(mv: Move, attacker: PieceId) -> Self {
        Self {
            mv,
            attacker,
            defender: None,
            eliminated: Eliminated::None,
        }
    }

    pub const fn is_combat(&self) -> bool {
        self.defender.is_some()
    }

    /// Piece that stayed on the board after a one-sided exchange.
    pub fn survivor(&self) -> Option<PieceId> {
        let defender = self.defender?;
        match self.eliminated {
            Eliminated::One(lost) if lost == self.attacker => Some(defender),
            Eliminated::One(_) => Some(self.attacker),
            _ => None,
        }
    }
}
