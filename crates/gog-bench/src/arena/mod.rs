mod standings;

pub use standings::{AgentStanding, Standings};

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use gog_bot::policy::from_config;
use gog_bot::{Strategy, StrategyError};
use gog_core::game::{Match, MatchError};
use gog_core::model::player::Player;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{AgentConfig, ArenaConfig, ResolvedOutputs};

/// Plays the configured number of games between the two agents.
pub struct ArenaRunner {
    config: ArenaConfig,
    outputs: ResolvedOutputs,
}

/// Summary details returned after a run.
#[derive(Debug)]
pub struct RunSummary {
    pub games_played: usize,
    pub rows_written: usize,
    pub standings: Standings,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
}

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEnd {
    /// Flag captured or carried home.
    Victory,
    /// The side to move had no legal move.
    Forfeit,
    /// Ply limit reached.
    PlyLimit,
}

#[derive(Debug, Clone)]
pub struct GameOutcome {
    /// Agent index seated as Player One and Player Two.
    pub seating: [usize; 2],
    pub winner: Option<Player>,
    pub end: GameEnd,
    pub plies: u32,
    pub captures: u32,
    pub decisions: [DecisionSummary; 2],
}

impl GameOutcome {
    /// Index into the agent list of the winning agent, if any.
    pub fn winning_agent(&self) -> Option<usize> {
        self.winner.map(|player| self.seating[player.index()])
    }
}

#[derive(Default)]
struct DecisionMetrics {
    total: Duration,
    decisions: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) {
        self.total += duration;
        self.decisions += 1;
    }

    fn finalize(self) -> DecisionSummary {
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / f64::from(self.decisions)
        };
        DecisionSummary {
            decisions: self.decisions,
            avg_ms_per_decision: avg_ms,
            total_ms: self.total.as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

#[derive(Serialize)]
struct GameLogRow<'a> {
    run_id: &'a str,
    game_id: String,
    game_index: usize,
    game_seed: u64,
    player_one: &'a str,
    player_two: &'a str,
    winner: Option<&'a str>,
    end: GameEnd,
    plies: u32,
    captures: u32,
    decisions_one: u32,
    decisions_two: u32,
    ms_per_decision_one: f64,
    ms_per_decision_two: f64,
}

impl ArenaRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: ArenaConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        if config.agents.len() != 2 {
            return Err(RunnerError::AgentCount {
                found: config.agents.len(),
            });
        }
        Ok(Self { config, outputs })
    }

    /// Execute every game, streaming one JSONL row per game to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.matches.seed.unwrap_or(0));
        let mut standings = Standings::new(&self.config.agents);
        let mut rows_written = 0usize;

        for game_index in 0..self.config.matches.games {
            let game_seed = rng.next_u64();
            let seating = if self.config.matches.swap_sides && game_index % 2 == 1 {
                [1, 0]
            } else {
                [0, 1]
            };

            let outcome = self.play_game(game_seed, seating)?;
            standings.record(&outcome);
            self.write_row(&mut writer, game_index, game_seed, &outcome)?;
            rows_written += 1;

            event!(
                target: "gog_bench::arena",
                Level::INFO,
                run_id = %self.config.run_id,
                game = game_index,
                seed = game_seed,
                player_one = %self.config.agents[seating[0]].name,
                player_two = %self.config.agents[seating[1]].name,
                winner = ?outcome.winning_agent().map(|i| &self.config.agents[i].name),
                end = ?outcome.end,
                plies = outcome.plies,
                captures = outcome.captures,
            );
        }

        writer.flush()?;
        standings.write_markdown(&self.config.run_id, &self.outputs.summary_md)?;

        Ok(RunSummary {
            games_played: self.config.matches.games,
            rows_written,
            standings,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
        })
    }

    fn play_game(&self, game_seed: u64, seating: [usize; 2]) -> Result<GameOutcome, RunnerError> {
        let mut seed_rng = StdRng::seed_from_u64(game_seed);
        let mut sides: Vec<Box<dyn Strategy>> = seating
            .iter()
            .map(|&agent| spawn(&self.config.agents[agent], seed_rng.next_u64()))
            .collect();

        let first = sides[0].initial_formation();
        let second = sides[1].initial_formation();
        let mut game = Match::new(&first, &second)?;
        for player in Player::BOTH {
            sides[player.index()].enemy_placed(player, &game.pov(player))?;
        }

        let mut metrics = [DecisionMetrics::default(), DecisionMetrics::default()];
        let mut captures = 0u32;
        let mut forfeited = None;

        while !game.is_over() && game.plies() < self.config.matches.max_plies {
            let player = game.turn();
            let pov = game.pov(player);
            let started = Instant::now();
            let choice = sides[player.index()].choose_move(&pov)?;
            metrics[player.index()].record(started.elapsed());

            let Some(mv) = choice else {
                forfeited = Some(player);
                break;
            };
            let event = game.play(player, mv)?;
            if event.eliminated.count() > 0 {
                captures += 1;
            }
            for side in sides.iter_mut() {
                side.observe(&event)?;
            }
        }

        let (winner, end) = match (game.victor(), forfeited) {
            (Some(victor), _) => (Some(victor), GameEnd::Victory),
            (None, Some(loser)) => (Some(loser.opponent()), GameEnd::Forfeit),
            (None, None) => (None, GameEnd::PlyLimit),
        };
        let [one, two] = metrics;

        Ok(GameOutcome {
            seating,
            winner,
            end,
            plies: game.plies(),
            captures,
            decisions: [one.finalize(), two.finalize()],
        })
    }

    fn write_row(
        &self,
        writer: &mut BufWriter<File>,
        game_index: usize,
        game_seed: u64,
        outcome: &GameOutcome,
    ) -> Result<(), RunnerError> {
        let agents = &self.config.agents;
        let row = GameLogRow {
            run_id: &self.config.run_id,
            game_id: format!("G{game_index:05}"),
            game_index,
            game_seed,
            player_one: &agents[outcome.seating[0]].name,
            player_two: &agents[outcome.seating[1]].name,
            winner: outcome.winning_agent().map(|i| agents[i].name.as_str()),
            end: outcome.end,
            plies: outcome.plies,
            captures: outcome.captures,
            decisions_one: outcome.decisions[0].decisions,
            decisions_two: outcome.decisions[1].decisions,
            ms_per_decision_one: outcome.decisions[0].avg_ms_per_decision,
            ms_per_decision_two: outcome.decisions[1].avg_ms_per_decision,
        };
        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

fn spawn(agent: &AgentConfig, seed: u64) -> Box<dyn Strategy> {
    from_config(&agent.bot_config(seed))
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("match rejected a move: {0}")]
    Match(#[from] MatchError),
    #[error("strategy failed: {0}")]
    Strategy(#[from] StrategyError),
    #[error("configuration requires exactly 2 agents but found {found}")]
    AgentCount { found: usize },
}
