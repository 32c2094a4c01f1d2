use super::state::BeliefState;
use crate::model::rank::Rank;

/// Snapshot of how much a belief has narrowed down.
#[derive(Debug, Clone, PartialEq)]
pub struct BeliefMetrics {
    pub tracked: usize,
    pub on_board: usize,
    pub confirmed: usize,
    pub mean_candidates: f32,
    /// Sum over live pieces of ln(candidate count), in nats.
    pub entropy: f32,
}

impl BeliefMetrics {
    pub fn from_belief(belief: &BeliefState) -> Self {
        let live = belief.on_board();
        let mut confirmed = 0;
        let mut total = 0usize;
        let mut entropy = 0.0_f32;
        for id in live.iter() {
            let count = belief.candidates(id).map_or(0, |set| set.len());
            if count == 1 {
                confirmed += 1;
            }
            total += count;
            if count > 0 {
                entropy += (count as f32).ln();
            }
        }
        let mean_candidates = if live.is_empty() {
            0.0
        } else {
            total as f32 / live.len() as f32
        };

        Self {
            tracked: belief.tracked().len(),
            on_board: live.len(),
            confirmed,
            mean_candidates,
            entropy,
        }
    }

    /// Entropy of a belief that knows nothing about a full army.
    pub fn max_entropy() -> f32 {
        Rank::ARMY_SIZE as f32 * (Rank::COUNT as f32).ln()
    }
}
