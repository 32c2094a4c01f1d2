mod monte_carlo;
mod random;

pub use monte_carlo::BeliefDrivenMonteCarlo;
pub use random::RandomMover;

use crate::bot::{BotConfig, BotDifficulty};
use crate::error::StrategyError;
use gog_core::model::board::PovBoard;
use gog_core::model::event::CombatEvent;
use gog_core::model::player::Player;
use gog_core::model::position::Move;
use gog_core::model::roster::Formation;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// One side's decision maker for a whole match.
pub trait Strategy: Send {
    fn name(&self) -> &'static str;

    /// Placement of the army before the match starts.
    fn initial_formation(&mut self) -> Formation;

    /// Called once both armies are on the board, with `player`'s view of it.
    fn enemy_placed(&mut self, player: Player, pov: &PovBoard) -> Result<(), StrategyError>;

    /// Called after every move, by either side.
    fn observe(&mut self, event: &CombatEvent) -> Result<(), StrategyError>;

    /// Next move, or `None` when no legal move exists.
    fn choose_move(&mut self, pov: &PovBoard) -> Result<Option<Move>, StrategyError>;
}

/// Builds the strategy `config` asks for.
pub fn from_config(config: &BotConfig) -> Box<dyn Strategy> {
    let rng = match config.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    match config.difficulty {
        BotDifficulty::Random => Box::new(RandomMover::new(rng)),
        BotDifficulty::MonteCarlo => Box::new(BeliefDrivenMonteCarlo::new(config.budget, rng)),
    }
}
