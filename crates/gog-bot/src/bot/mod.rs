mod playout;
mod search;

pub use playout::{PlayoutOutcome, random_playout};
pub use search::{MoveSelector, SearchBudget, SearchReport, Selection};

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BotDifficulty {
    Random,
    #[default]
    MonteCarlo,
}

impl BotDifficulty {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "random" | "easy" => Some(BotDifficulty::Random),
            "monte_carlo" | "montecarlo" | "mc" | "hard" => Some(BotDifficulty::MonteCarlo),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BotDifficulty::Random => "random",
            BotDifficulty::MonteCarlo => "monte_carlo",
        }
    }
}

/// Everything needed to build a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BotConfig {
    pub difficulty: BotDifficulty,
    pub budget: SearchBudget,
    /// Seed for the strategy's own RNG; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl BotConfig {
    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = SearchBudget::default();

        let difficulty = read("GOG_BOT_DIFFICULTY")
            .and_then(|raw| BotDifficulty::parse(&raw))
            .unwrap_or_default();

        let trials = read("GOG_MC_TRIALS")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(defaults.trials);

        let ply_cap = read("GOG_MC_PLY_CAP")
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(defaults.ply_cap);

        let time_cap = read("GOG_MC_TIME_CAP_MS")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|value| *value > 0)
            .map(Duration::from_millis);

        let threads = read("GOG_MC_THREADS")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|value| (1..=64).contains(value))
            .unwrap_or(defaults.threads);

        let sample_attempts = read("GOG_MC_SAMPLE_ATTEMPTS")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(defaults.sample_attempts);

        let seed = read("GOG_BOT_SEED").and_then(|raw| raw.trim().parse::<u64>().ok());

        Self {
            difficulty,
            budget: SearchBudget {
                trials,
                ply_cap,
                time_cap,
                threads,
                sample_attempts,
            },
            seed,
        }
    }
}
