//! Hard constraints on the ranks of opaque enemy pieces.

use crate::model::board::PovBoard;
use crate::model::event::CombatEvent;
use crate::model::piece::{PieceId, PieceSet};
use crate::model::player::Player;
use crate::model::rank::{DuelOutcome, Rank};
use crate::model::rank_set::RankSet;
use crate::model::rules::Eliminated;
use core::fmt;

/// Which ranks each enemy piece may still hold, and which pieces each rank
/// may still be hiding behind.
///
/// The two views are kept mirror images of each other: a piece is listed
/// under a rank exactly when that rank is among the piece's candidates.
#[derive(Debug, Clone)]
pub struct BeliefState {
    perspective: Player,
    tracked: PieceSet,
    eliminated: PieceSet,
    rank_candidates: [RankSet; PieceId::LIMIT],
    piece_candidates: [PieceSet; Rank::COUNT],
}

impl BeliefState {
    /// Creates an empty belief for `perspective`; no enemy piece is tracked yet.
    pub fn new(perspective: Player) -> Self {
        Self {
            perspective,
            tracked: PieceSet::EMPTY,
            eliminated: PieceSet::EMPTY,
            rank_candidates: [RankSet::EMPTY; PieceId::LIMIT],
            piece_candidates: [PieceSet::EMPTY; Rank::COUNT],
        }
    }

    /// Tracks every enemy piece visible on `pov` with all ranks open.
    pub fn from_pov(perspective: Player, pov: &PovBoard) -> Self {
        let mut belief = Self::new(perspective);
        for (_, view) in pov.pieces_of(perspective.opponent()) {
            belief.track(view.id);
        }
        belief
    }

    /// Starts tracking `id` with every rank possible.
    pub fn track(&mut self, id: PieceId) {
        if !self.tracked.insert(id) {
            return;
        }
        self.rank_candidates[id.index()] = RankSet::ALL;
        for rank in Rank::ORDERED {
            self.piece_candidates[rank.index()].insert(id);
        }
    }

    pub fn perspective(&self) -> Player {
        self.perspective
    }

    pub fn tracked(&self) -> PieceSet {
        self.tracked
    }

    pub fn is_tracked(&self, id: PieceId) -> bool {
        self.tracked.contains(id)
    }

    /// True once the whole enemy army is being tracked.
    pub fn is_complete(&self) -> bool {
        self.tracked.len() == Rank::ARMY_SIZE
    }

    pub fn eliminated(&self) -> PieceSet {
        self.eliminated
    }

    /// Tracked pieces still standing on the board.
    pub fn on_board(&self) -> PieceSet {
        self.tracked.difference(self.eliminated)
    }

    pub fn candidates(&self, id: PieceId) -> Option<RankSet> {
        self.is_tracked(id)
            .then(|| self.rank_candidates[id.index()])
    }

    pub fn pieces_for(&self, rank: Rank) -> PieceSet {
        self.piece_candidates[rank.index()]
    }

    /// The rank of `id` once only one remains.
    pub fn confirmed(&self, id: PieceId) -> Option<Rank> {
        self.candidates(id).and_then(RankSet::only)
    }

    /// Pieces confirmed as `rank`.
    pub fn confirmed_as(&self, rank: Rank) -> PieceSet {
        self.pieces_for(rank)
            .iter()
            .filter(|id| self.rank_candidates[id.index()].len() == 1)
            .collect()
    }

    /// Drops `rank` from the candidates of `id`, keeping both views in step.
    pub fn remove_candidate(&mut self, id: PieceId, rank: Rank) -> Result<bool, BeliefError> {
        if !self.is_tracked(id) {
            return Err(BeliefError::UnknownPiece { piece: id });
        }
        let removed = self.rank_candidates[id.index()].remove(rank);
        self.piece_candidates[rank.index()].remove(id);
        if self.rank_candidates[id.index()].is_empty() {
            return Err(BeliefError::EmptyCandidates { piece: id });
        }
        Ok(removed)
    }

    /// Keeps only the ranks of `id` that are also in `allowed`.
    pub fn restrict(&mut self, id: PieceId, allowed: RankSet) -> Result<bool, BeliefError> {
        let current = self
            .candidates(id)
            .ok_or(BeliefError::UnknownPiece { piece: id })?;
        let mut changed = false;
        for rank in current.iter().filter(|rank| !allowed.contains(*rank)) {
            self.rank_candidates[id.index()].remove(rank);
            self.piece_candidates[rank.index()].remove(id);
            changed = true;
        }
        if self.rank_candidates[id.index()].is_empty() {
            return Err(BeliefError::EmptyCandidates { piece: id });
        }
        Ok(changed)
    }

    /// Narrows the enemy participant of `event`, then propagates.
    ///
    /// `own_rank` is the rank of this side's piece in the exchange. Events
    /// that remove nothing reveal nothing and leave the belief untouched.
    pub fn observe(&mut self, event: &CombatEvent, own_rank: Rank) -> Result<(), BeliefError> {
        let Some(defender) = event.defender else {
            return Ok(());
        };
        if event.eliminated == Eliminated::None {
            return Ok(());
        }

        let (enemy, enemy_attacked) = if self.is_tracked(event.attacker) {
            (event.attacker, true)
        } else if self.is_tracked(defender) {
            (defender, false)
        } else {
            return Err(BeliefError::UnknownPiece { piece: defender });
        };

        match event.eliminated {
            Eliminated::None => {}
            Eliminated::Both(_, _) => {
                self.restrict(enemy, RankSet::single(own_rank))?;
                self.eliminated.insert(enemy);
            }
            Eliminated::One(lost) => {
                let observed = if lost == event.attacker {
                    DuelOutcome::AttackerLoses
                } else {
                    DuelOutcome::AttackerWins
                };
                let mut allowed: RankSet = Rank::ORDERED
                    .into_iter()
                    .filter(|&rank| {
                        let outcome = if enemy_attacked {
                            rank.duel(own_rank)
                        } else {
                            own_rank.duel(rank)
                        };
                        outcome == observed
                    })
                    .collect();
                if lost == enemy {
                    self.eliminated.insert(enemy);
                } else if own_rank != Rank::Flag {
                    // Only a flag capturing a flag survives as a flag.
                    allowed = allowed.without(Rank::Flag);
                }
                self.restrict(enemy, allowed)?;
            }
        }

        self.propagate()?;
        Ok(())
    }

    /// Verifies the mirror invariant and the quota ceiling.
    pub fn check_consistency(&self) -> Result<(), BeliefError> {
        for index in 0..PieceId::LIMIT {
            let id = PieceId(index as u8);
            let ranks = self.rank_candidates[index];
            if !self.is_tracked(id) {
                if let Some(rank) = Rank::ORDERED
                    .into_iter()
                    .find(|rank| self.piece_candidates[rank.index()].contains(id))
                {
                    return Err(BeliefError::Desynchronised { piece: id, rank });
                }
                continue;
            }
            if ranks.is_empty() {
                return Err(BeliefError::EmptyCandidates { piece: id });
            }
            for rank in Rank::ORDERED {
                if ranks.contains(rank) != self.piece_candidates[rank.index()].contains(id) {
                    return Err(BeliefError::Desynchronised { piece: id, rank });
                }
            }
        }
        for rank in Rank::ORDERED {
            let confirmed = self.confirmed_as(rank).len();
            if confirmed > rank.quota() as usize {
                return Err(BeliefError::QuotaExceeded { rank, confirmed });
            }
        }
        Ok(())
    }
}

/// A contradiction in the belief: no assignment of ranks fits what was seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeliefError {
    EmptyCandidates { piece: PieceId },
    QuotaExceeded { rank: Rank, confirmed: usize },
    RankUnderfilled { rank: Rank, candidates: usize },
    UnknownPiece { piece: PieceId },
    Desynchronised { piece: PieceId, rank: Rank },
}

impl fmt::Display for BeliefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeliefError::EmptyCandidates { piece } => {
                write!(f, "piece {piece} has no candidate rank left")
            }
            BeliefError::QuotaExceeded { rank, confirmed } => write!(
                f,
                "{confirmed} pieces confirmed as {rank}, quota is {}",
                rank.quota()
            ),
            BeliefError::RankUnderfilled { rank, candidates } => write!(
                f,
                "only {candidates} pieces can still be {rank}, quota is {}",
                rank.quota()
            ),
            BeliefError::UnknownPiece { piece } => {
                write!(f, "piece {piece} is not tracked by this belief")
            }
            BeliefError::Desynchronised { piece, rank } => {
                write!(f, "piece {piece} and rank {rank} disagree about candidacy")
            }
        }
    }
}

impl std::error::Error for BeliefError {}
