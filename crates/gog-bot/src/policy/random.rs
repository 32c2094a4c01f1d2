use super::Strategy;
use crate::error::StrategyError;
use gog_core::model::board::PovBoard;
use gog_core::model::event::CombatEvent;
use gog_core::model::player::Player;
use gog_core::model::position::Move;
use gog_core::model::roster::Formation;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

/// Picks a uniformly random legal move and remembers nothing.
#[derive(Debug)]
pub struct RandomMover {
    rng: SmallRng,
    player: Option<Player>,
}

impl RandomMover {
    pub fn new(rng: SmallRng) -> Self {
        Self { rng, player: None }
    }
}

impl Strategy for RandomMover {
    fn name(&self) -> &'static str {
        "random"
    }

    fn initial_formation(&mut self) -> Formation {
        Formation::random(&mut self.rng)
    }

    fn enemy_placed(&mut self, player: Player, _pov: &PovBoard) -> Result<(), StrategyError> {
        self.player = Some(player);
        Ok(())
    }

    fn observe(&mut self, _event: &CombatEvent) -> Result<(), StrategyError> {
        Ok(())
    }

    fn choose_move(&mut self, pov: &PovBoard) -> Result<Option<Move>, StrategyError> {
        let player = self.player.ok_or(StrategyError::NotStarted)?;
        Ok(pov.legal_moves(player).choose(&mut self.rng).copied())
    }
}
