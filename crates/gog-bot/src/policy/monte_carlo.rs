use super::Strategy;
use crate::bot::{MoveSelector, SearchBudget, SearchReport};
use crate::error::StrategyError;
use gog_core::belief::{BeliefMetrics, BeliefState};
use gog_core::model::board::PovBoard;
use gog_core::model::event::CombatEvent;
use gog_core::model::piece::PieceId;
use gog_core::model::player::Player;
use gog_core::model::position::Move;
use gog_core::model::rank::Rank;
use gog_core::model::roster::Formation;
use rand::rngs::SmallRng;
use tracing::{Level, event};

/// Tracks what combat has revealed about enemy ranks and picks moves by
/// Monte-Carlo playouts over boards consistent with that knowledge.
#[derive(Debug)]
pub struct BeliefDrivenMonteCarlo {
    rng: SmallRng,
    selector: MoveSelector,
    belief: Option<BeliefState>,
    own_ranks: [Option<Rank>; PieceId::LIMIT],
    last_report: Option<SearchReport>,
}

impl BeliefDrivenMonteCarlo {
    pub fn new(budget: SearchBudget, rng: SmallRng) -> Self {
        Self {
            rng,
            selector: MoveSelector::new(budget),
            belief: None,
            own_ranks: [None; PieceId::LIMIT],
            last_report: None,
        }
    }

    pub fn belief(&self) -> Option<&BeliefState> {
        self.belief.as_ref()
    }

    /// Counters from the most recent search.
    pub fn last_report(&self) -> Option<&SearchReport> {
        self.last_report.as_ref()
    }

    fn own_rank(&self, id: PieceId) -> Option<Rank> {
        self.own_ranks.get(id.index()).copied().flatten()
    }
}

impl Strategy for BeliefDrivenMonteCarlo {
    fn name(&self) -> &'static str {
        "monte_carlo"
    }

    fn initial_formation(&mut self) -> Formation {
        Formation::random(&mut self.rng)
    }

    fn enemy_placed(&mut self, player: Player, pov: &PovBoard) -> Result<(), StrategyError> {
        self.own_ranks = [None; PieceId::LIMIT];
        for (_, view) in pov.pieces_of(player) {
            self.own_ranks[view.id.index()] = view.rank;
        }
        self.belief = Some(BeliefState::from_pov(player, pov));
        self.last_report = None;
        Ok(())
    }

    fn observe(&mut self, event: &CombatEvent) -> Result<(), StrategyError> {
        let Some(defender) = event.defender else {
            return Ok(());
        };
        let own_piece = if self.own_rank(event.attacker).is_some() {
            event.attacker
        } else {
            defender
        };
        let own_rank = self
            .own_rank(own_piece)
            .ok_or(StrategyError::UnknownOwnPiece { piece: own_piece })?;
        let belief = self.belief.as_mut().ok_or(StrategyError::NotStarted)?;
        belief.observe(event, own_rank)?;

        if tracing::enabled!(Level::DEBUG) {
            let metrics = BeliefMetrics::from_belief(belief);
            event!(
                target: "gog_bot::belief",
                Level::DEBUG,
                player = ?belief.perspective(),
                mv = %event.mv,
                own_rank = %own_rank,
                on_board = metrics.on_board,
                confirmed = metrics.confirmed,
                mean_candidates = metrics.mean_candidates,
                entropy = metrics.entropy,
            );
        }
        Ok(())
    }

    fn choose_move(&mut self, pov: &PovBoard) -> Result<Option<Move>, StrategyError> {
        let belief = self.belief.as_ref().ok_or(StrategyError::NotStarted)?;
        let selection = self.selector.select(pov, belief, &mut self.rng)?;
        self.last_report = Some(selection.report);
        Ok(selection.mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::{BotConfig, BotDifficulty};
    use crate::policy::{from_config, tests::play_out};
    use gog_core::game::Match;
    use rand::SeedableRng;

    fn small_budget() -> SearchBudget {
        SearchBudget {
            trials: 12,
            ply_cap: 200,
            ..SearchBudget::default()
        }
    }

    #[test]
    fn observing_combat_narrows_the_belief() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut game = Match::random(&mut rng).unwrap();
        let mut bot = BeliefDrivenMonteCarlo::new(small_budget(), rng.clone());
        bot.enemy_placed(Player::One, &game.pov(Player::One)).unwrap();

        let mut combats = 0;
        while !game.is_over() && combats < 3 && game.plies() < 2_000 {
            let player = game.turn();
            let moves = game.legal_moves(player);
            let mv = moves[(game.plies() as usize * 7) % moves.len()];
            let event = game.play(player, mv).unwrap();
            bot.observe(&event).unwrap();
            if event.eliminated.count() > 0 {
                combats += 1;
            }
        }
        assert!(combats > 0);

        let belief = bot.belief().unwrap();
        belief.check_consistency().unwrap();
        for (_, piece) in game.board().pieces_of(Player::Two) {
            assert!(belief.candidates(piece.id).unwrap().contains(piece.rank));
        }
        let narrowed = belief
            .tracked()
            .iter()
            .any(|id| belief.candidates(id).unwrap().len() < Rank::COUNT);
        assert!(narrowed);
    }

    #[test]
    fn search_report_is_kept() {
        let mut rng = SmallRng::seed_from_u64(12);
        let game = Match::random(&mut rng).unwrap();
        let mut bot = BeliefDrivenMonteCarlo::new(small_budget(), rng);
        assert!(matches!(
            bot.choose_move(&game.pov(Player::One)),
            Err(StrategyError::NotStarted)
        ));
        bot.enemy_placed(Player::One, &game.pov(Player::One)).unwrap();
        let mv = bot.choose_move(&game.pov(Player::One)).unwrap().unwrap();
        assert!(game.legal_moves(Player::One).contains(&mv));
        assert_eq!(bot.last_report().unwrap().trials_run, 12);
    }

    #[test]
    fn plays_a_whole_match_against_a_random_mover() {
        let mc = from_config(&BotConfig {
            difficulty: BotDifficulty::MonteCarlo,
            budget: SearchBudget {
                trials: 6,
                ply_cap: 150,
                ..SearchBudget::default()
            },
            seed: Some(5),
        });
        let random = from_config(&BotConfig {
            difficulty: BotDifficulty::Random,
            seed: Some(6),
            ..BotConfig::default()
        });
        // Either side may win; the match must simply run without errors.
        let _ = play_out(mc, random, 600);
    }
}
