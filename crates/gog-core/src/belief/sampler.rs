//! Determinisation: fill in every hidden enemy rank consistently with a belief.

use super::state::BeliefState;
use crate::model::board::{Board, PovBoard};
use crate::model::piece::{Piece, PieceId};
use crate::model::position::Position;
use crate::model::rank::Rank;
use crate::model::rank_set::RankSet;
use rand::Rng;
use std::fmt;

/// Draws fully specified boards from a [`BeliefState`].
#[derive(Debug, Default)]
pub struct BoardSampler;

impl BoardSampler {
    /// Samples one board, failing on the first dead end.
    pub fn sample<R: Rng + ?Sized>(
        pov: &PovBoard,
        belief: &BeliefState,
        rng: &mut R,
    ) -> Result<SampledBoard, SamplingError> {
        Self::sample_with_retries(pov, belief, rng, 1, None)
    }

    /// Samples a board, retrying up to `max_attempts` times on dead ends.
    ///
    /// Errors that no retry can fix (an untracked enemy piece, an own piece
    /// without a visible rank) are returned immediately.
    pub fn sample_with_retries<R: Rng + ?Sized>(
        pov: &PovBoard,
        belief: &BeliefState,
        rng: &mut R,
        max_attempts: usize,
        stats: Option<&mut SamplingStats>,
    ) -> Result<SampledBoard, SamplingError> {
        let attempts = max_attempts.max(1);
        let mut stats = stats;
        let mut last_error = None;

        for _ in 0..attempts {
            if let Some(inner) = stats.as_deref_mut() {
                inner.attempts += 1;
            }
            match sample_once(pov, belief, rng) {
                Ok(board) => {
                    if let Some(inner) = stats.as_deref_mut() {
                        inner.succeeded += 1;
                    }
                    return Ok(board);
                }
                Err(err) if err.is_retryable() => {
                    if let Some(inner) = stats.as_deref_mut() {
                        inner.rejections += 1;
                    }
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error.unwrap_or(SamplingError::FlagUnplaced))
    }
}

#[derive(Clone, Copy)]
struct Pending {
    /// `None` for an eliminated piece: it takes a rank but no square.
    pos: Option<Position>,
    id: PieceId,
    options: RankSet,
}

fn sample_once<R: Rng + ?Sized>(
    pov: &PovBoard,
    belief: &BeliefState,
    rng: &mut R,
) -> Result<SampledBoard, SamplingError> {
    let viewer = belief.perspective();
    let enemy = viewer.opponent();
    let mut board = Board::empty();

    // Ranks already confirmed dead no longer need a square.
    let mut remaining = [0u8; Rank::COUNT];
    for rank in Rank::ORDERED {
        let dead = belief
            .confirmed_as(rank)
            .intersection(belief.eliminated())
            .len() as u8;
        remaining[rank.index()] = rank.quota().saturating_sub(dead);
    }

    let mut pending = Vec::new();
    for (pos, view) in pov.occupants() {
        if view.owner == viewer {
            let rank = view.rank.ok_or(SamplingError::MissingOwnRank { pos })?;
            board.set(pos, Some(Piece::new(view.id, viewer, rank)));
        } else {
            let options = belief
                .candidates(view.id)
                .ok_or(SamplingError::UntrackedPiece { piece: view.id })?;
            pending.push(Pending {
                pos: Some(pos),
                id: view.id,
                options,
            });
        }
    }

    // Dead pieces of unknown rank still use up one slot of some rank. A
    // captured flag ends the match, so none of them was the flag.
    for id in belief.eliminated().iter() {
        if belief.confirmed(id).is_some() {
            continue;
        }
        let options = belief
            .candidates(id)
            .ok_or(SamplingError::UntrackedPiece { piece: id })?;
        pending.push(Pending {
            pos: None,
            id,
            options: options.without(Rank::Flag),
        });
    }

    for entry in pending.iter_mut() {
        entry.options = available(entry.options, &remaining);
    }
    pending.sort_by_key(|entry| entry.options.len());

    let mut live_left = pending.iter().filter(|entry| entry.pos.is_some()).count();
    let mut flag_placed = false;
    for index in 0..pending.len() {
        let Pending { pos, id, options } = pending[index];
        let last_live = pos.is_some() && live_left == 1;

        let rank = if last_live && !flag_placed {
            if !options.contains(Rank::Flag) {
                return Err(SamplingError::FlagUnplaced);
            }
            Rank::Flag
        } else {
            if options.is_empty() {
                return Err(SamplingError::NoFeasibleRank { piece: id });
            }
            options
                .nth(rng.gen_range(0..options.len()))
                .ok_or(SamplingError::NoFeasibleRank { piece: id })?
        };

        remaining[rank.index()] -= 1;
        if let Some(pos) = pos {
            live_left -= 1;
            flag_placed |= rank == Rank::Flag;
            board.set(pos, Some(Piece::new(id, enemy, rank)));
        }

        if remaining[rank.index()] == 0 {
            let rest = &mut pending[index + 1..];
            for entry in rest.iter_mut() {
                entry.options.remove(rank);
            }
            rest.sort_by_key(|entry| entry.options.len());
        }
    }

    if !flag_placed {
        return Err(SamplingError::FlagUnplaced);
    }
    Ok(SampledBoard { board })
}

fn available(options: RankSet, remaining: &[u8; Rank::COUNT]) -> RankSet {
    options
        .iter()
        .filter(|rank| remaining[rank.index()] > 0)
        .collect()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SamplingStats {
    pub attempts: usize,
    pub succeeded: usize,
    pub rejections: usize,
}

impl SamplingStats {
    pub fn merge(&mut self, other: SamplingStats) {
        self.attempts += other.attempts;
        self.succeeded += other.succeeded;
        self.rejections += other.rejections;
    }
}

/// A board with every rank filled in.
#[derive(Debug, Clone)]
pub struct SampledBoard {
    board: Board<Piece>,
}

impl SampledBoard {
    pub fn board(&self) -> &Board<Piece> {
        &self.board
    }

    pub fn into_board(self) -> Board<Piece> {
        self.board
    }
}

/// Errors that can arise while determinising a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SamplingError {
    MissingOwnRank { pos: Position },
    UntrackedPiece { piece: PieceId },
    NoFeasibleRank { piece: PieceId },
    FlagUnplaced,
}

impl SamplingError {
    /// Dead ends that a fresh draw may avoid.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SamplingError::NoFeasibleRank { .. } | SamplingError::FlagUnplaced
        )
    }
}

impl fmt::Display for SamplingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplingError::MissingOwnRank { pos } => {
                write!(f, "own piece at {pos} has no visible rank")
            }
            SamplingError::UntrackedPiece { piece } => {
                write!(f, "enemy piece {piece} is not tracked by the belief")
            }
            SamplingError::NoFeasibleRank { piece } => {
                write!(f, "no rank left to assign to enemy piece {piece}")
            }
            SamplingError::FlagUnplaced => f.write_str("sampled board has no enemy flag"),
        }
    }
}

impl std::error::Error for SamplingError {}
