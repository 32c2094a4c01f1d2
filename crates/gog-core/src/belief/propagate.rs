use super::state::{BeliefError, BeliefState};
use crate::model::rank::Rank;
use crate::model::rank_set::RankSet;

impl BeliefState {
    /// Runs the quota deductions until nothing changes.
    ///
    /// A piece reduced to one rank is withdrawn from every other rank's list
    /// eagerly by `remove_candidate`/`restrict`, so each pass only has to:
    /// strip a rank from the unconfirmed pieces once its quota is fully
    /// confirmed, and pin a rank onto its remaining candidates when there are
    /// exactly as many open candidates as unfilled slots. The second rule
    /// assumes the whole enemy army is tracked and is skipped otherwise.
    ///
    /// Returns how many candidate entries were removed. Running it again on
    /// its own output removes nothing.
    pub fn propagate(&mut self) -> Result<usize, BeliefError> {
        let complete = self.is_complete();
        let mut removed = 0;
        loop {
            let mut changed = false;
            for rank in Rank::ORDERED {
                let candidates = self.pieces_for(rank);
                let confirmed = self.confirmed_as(rank);
                let quota = rank.quota() as usize;

                if confirmed.len() > quota {
                    return Err(BeliefError::QuotaExceeded {
                        rank,
                        confirmed: confirmed.len(),
                    });
                }
                if complete && candidates.len() < quota {
                    return Err(BeliefError::RankUnderfilled {
                        rank,
                        candidates: candidates.len(),
                    });
                }

                let open = candidates.difference(confirmed);
                if confirmed.len() == quota {
                    for id in open.iter() {
                        self.remove_candidate(id, rank)?;
                        removed += 1;
                        changed = true;
                    }
                    continue;
                }

                if complete && open.len() == quota - confirmed.len() {
                    for id in open.iter() {
                        let before = self.candidates(id).map_or(0, RankSet::len);
                        self.restrict(id, RankSet::single(rank))?;
                        removed += before - 1;
                        changed = true;
                    }
                }
            }
            if !changed {
                return Ok(removed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::belief::state::{BeliefError, BeliefState};
    use crate::model::piece::PieceId;
    use crate::model::player::Player;
    use crate::model::rank::Rank;
    use crate::model::rank_set::RankSet;

    /// Tracks ids 21..42, a full enemy army.
    fn full_army() -> BeliefState {
        let mut belief = BeliefState::new(Player::One);
        for id in 21..21 + Rank::ARMY_SIZE as u8 {
            belief.track(PieceId(id));
        }
        belief
    }

    #[test]
    fn fresh_belief_is_a_fixpoint() {
        let mut belief = full_army();
        assert_eq!(belief.propagate(), Ok(0));
        belief.check_consistency().unwrap();
    }

    #[test]
    fn exhausted_rank_leaves_other_pieces() {
        let mut belief = full_army();
        belief
            .restrict(PieceId(21), RankSet::single(Rank::GeneralFive))
            .unwrap();
        belief.propagate().unwrap();
        assert_eq!(
            belief.pieces_for(Rank::GeneralFive).iter().collect::<Vec<_>>(),
            vec![PieceId(21)]
        );
        for id in 22..42 {
            assert!(!belief.candidates(PieceId(id)).unwrap().contains(Rank::GeneralFive));
        }
        belief.check_consistency().unwrap();
    }

    #[test]
    fn spies_are_forced_when_two_candidates_remain() {
        let mut belief = full_army();
        for id in 23..42 {
            belief.remove_candidate(PieceId(id), Rank::Spy).unwrap();
        }
        belief.propagate().unwrap();
        assert_eq!(belief.confirmed(PieceId(21)), Some(Rank::Spy));
        assert_eq!(belief.confirmed(PieceId(22)), Some(Rank::Spy));
    }

    #[test]
    fn forcing_cascades_to_a_single_assignment() {
        let mut belief = full_army();
        // Confirm every piece except the last one; the leftover rank must follow.
        let mut id = 21;
        for rank in Rank::ORDERED {
            for _ in 0..rank.quota() {
                if id < 41 {
                    belief.restrict(PieceId(id), RankSet::single(rank)).unwrap();
                }
                id += 1;
            }
        }
        belief.propagate().unwrap();
        assert_eq!(belief.confirmed(PieceId(41)), Some(Rank::Spy));
        belief.check_consistency().unwrap();
    }

    #[test]
    fn too_few_candidates_is_a_contradiction() {
        let mut belief = full_army();
        for id in 22..42 {
            belief.remove_candidate(PieceId(id), Rank::Spy).unwrap();
        }
        assert_eq!(
            belief.propagate(),
            Err(BeliefError::RankUnderfilled {
                rank: Rank::Spy,
                candidates: 1
            })
        );
    }

    #[test]
    fn too_many_confirmations_is_a_contradiction() {
        let mut belief = full_army();
        belief.restrict(PieceId(21), RankSet::single(Rank::Major)).unwrap();
        belief.restrict(PieceId(22), RankSet::single(Rank::Major)).unwrap();
        assert_eq!(
            belief.propagate(),
            Err(BeliefError::QuotaExceeded {
                rank: Rank::Major,
                confirmed: 2
            })
        );
    }

    #[test]
    fn propagation_is_idempotent() {
        let mut belief = full_army();
        belief.restrict(PieceId(25), RankSet::single(Rank::Flag)).unwrap();
        belief
            .restrict(PieceId(26), [Rank::Private, Rank::Spy].into_iter().collect())
            .unwrap();
        belief.propagate().unwrap();
        let snapshot: Vec<_> = (21..42)
            .map(|id| belief.candidates(PieceId(id)))
            .collect();
        assert_eq!(belief.propagate(), Ok(0));
        let again: Vec<_> = (21..42)
            .map(|id| belief.candidates(PieceId(id)))
            .collect();
        assert_eq!(snapshot, again);
    }

    #[test]
    fn partial_tracking_never_forces() {
        let mut belief = BeliefState::new(Player::Two);
        belief.track(PieceId(0));
        belief.track(PieceId(1));
        belief.remove_candidate(PieceId(1), Rank::Flag).unwrap();
        assert_eq!(belief.propagate(), Ok(0));
        assert!(belief.confirmed(PieceId(0)).is_none());
    }
}
