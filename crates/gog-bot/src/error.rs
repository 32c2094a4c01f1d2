use gog_core::belief::{BeliefError, SamplingError};
use gog_core::model::piece::PieceId;
use gog_core::model::rules::RulesError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("belief became contradictory: {0}")]
    Belief(#[from] BeliefError),
    #[error("board sampling failed: {0}")]
    Sampling(#[from] SamplingError),
    #[error("simulated move was rejected: {0}")]
    Simulation(#[from] RulesError),
    #[error("strategy asked to move before the armies were placed")]
    NotStarted,
    #[error("event names piece {piece}, which is not one of ours")]
    UnknownOwnPiece { piece: PieceId },
    #[error("a search worker panicked")]
    WorkerPanicked,
}
