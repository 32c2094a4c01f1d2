pub mod bot;
pub mod error;
pub mod policy;

pub use bot::{BotConfig, BotDifficulty, MoveSelector, SearchBudget, SearchReport, Selection};
pub use error::StrategyError;
pub use policy::{BeliefDrivenMonteCarlo, RandomMover, Strategy};
