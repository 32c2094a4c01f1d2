use super::playout::random_playout;
use crate::error::StrategyError;
use gog_core::belief::{BeliefState, BoardSampler, SamplingStats};
use gog_core::model::board::PovBoard;
use gog_core::model::player::Player;
use gog_core::model::position::Move;
use gog_core::model::rules::BoardRules;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};
use tracing::{Level, event};

/// Limits on one decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBudget {
    pub trials: usize,
    /// Moves per playout before the trial is scored as a draw.
    pub ply_cap: u32,
    /// Wall-clock cap; trials already finished when it expires still count.
    pub time_cap: Option<Duration>,
    pub threads: usize,
    /// Sampler draws per trial before the trial is skipped.
    pub sample_attempts: usize,
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self {
            trials: 100,
            ply_cap: 2000,
            time_cap: None,
            threads: 1,
            sample_attempts: 8,
        }
    }
}

/// Counters from one decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchReport {
    pub legal_moves: usize,
    pub trials_run: usize,
    pub trials_skipped: usize,
    pub stalled: usize,
    pub best_wins: u32,
    /// No anchor move won a single trial.
    pub fallback: bool,
    pub sampling: SamplingStats,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub mv: Option<Move>,
    pub report: SearchReport,
}

/// Scores each legal move by how often random playouts from sampled boards
/// end in a win, and picks the best.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveSelector {
    budget: SearchBudget,
}

impl MoveSelector {
    pub const fn new(budget: SearchBudget) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> SearchBudget {
        self.budget
    }

    /// Chooses a move for `belief.perspective()`; `None` when it has none.
    pub fn select<R: Rng + ?Sized>(
        &self,
        pov: &PovBoard,
        belief: &BeliefState,
        rng: &mut R,
    ) -> Result<Selection, StrategyError> {
        let moves = pov.legal_moves(belief.perspective());
        self.select_from(pov, belief, &moves, rng)
    }

    /// Like [`select`](Self::select) over a precomputed list of legal moves.
    pub fn select_from<R: Rng + ?Sized>(
        &self,
        pov: &PovBoard,
        belief: &BeliefState,
        moves: &[Move],
        rng: &mut R,
    ) -> Result<Selection, StrategyError> {
        let start = Instant::now();
        let player = belief.perspective();
        let mut report = SearchReport {
            legal_moves: moves.len(),
            ..SearchReport::default()
        };

        match moves {
            [] => {
                return Ok(Selection { mv: None, report });
            }
            [only] => {
                return Ok(Selection {
                    mv: Some(*only),
                    report,
                });
            }
            _ => {}
        }

        let deadline = self.budget.time_cap.map(|cap| start + cap);
        let job = TrialJob {
            pov,
            belief,
            player,
            moves,
            budget: self.budget,
            deadline,
        };

        let threads = self.budget.threads.clamp(1, self.budget.trials.max(1));
        let seeds: Vec<u64> = (0..threads).map(|_| rng.next_u64()).collect();
        let tally = if threads == 1 {
            job.run(self.budget.trials, &mut SmallRng::seed_from_u64(seeds[0]))?
        } else {
            run_parallel(&job, &seeds)?
        };

        report.trials_run = tally.run;
        report.trials_skipped = tally.skipped;
        report.stalled = tally.stalled;
        report.sampling = tally.sampling;

        // Strictly greater keeps the first enumerated move on ties.
        let mut best: Option<(usize, u32)> = None;
        for (index, &wins) in tally.wins.iter().enumerate() {
            if wins > 0 && best.is_none_or(|(_, top)| wins > top) {
                best = Some((index, wins));
            }
        }

        let mv = match best {
            Some((index, wins)) => {
                report.best_wins = wins;
                moves[index]
            }
            None => {
                report.fallback = true;
                moves[rng.gen_range(0..moves.len())]
            }
        };
        report.elapsed = start.elapsed();

        if tracing::enabled!(Level::DEBUG) {
            event!(
                target: "gog_bot::search",
                Level::DEBUG,
                player = ?player,
                legal = report.legal_moves,
                trials = report.trials_run,
                skipped = report.trials_skipped,
                stalled = report.stalled,
                best_wins = report.best_wins,
                fallback = report.fallback,
                elapsed_ms = report.elapsed.as_millis() as u64,
                chosen = %mv,
            );
        }
        if report.trials_skipped > 0 {
            tracing::warn!(
                target: "gog_bot::search",
                skipped = report.trials_skipped,
                rejections = report.sampling.rejections,
                "some trials found no consistent board"
            );
        }

        Ok(Selection {
            mv: Some(mv),
            report,
        })
    }
}

struct TrialJob<'a> {
    pov: &'a PovBoard,
    belief: &'a BeliefState,
    player: Player,
    moves: &'a [Move],
    budget: SearchBudget,
    deadline: Option<Instant>,
}

#[derive(Debug, Default)]
struct Tally {
    wins: Vec<u32>,
    run: usize,
    skipped: usize,
    stalled: usize,
    sampling: SamplingStats,
}

impl Tally {
    fn merge(&mut self, other: Tally) {
        if self.wins.len() < other.wins.len() {
            self.wins.resize(other.wins.len(), 0);
        }
        for (slot, wins) in self.wins.iter_mut().zip(other.wins) {
            *slot += wins;
        }
        self.run += other.run;
        self.skipped += other.skipped;
        self.stalled += other.stalled;
        self.sampling.merge(other.sampling);
    }
}

impl TrialJob<'_> {
    fn expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    fn run(&self, trials: usize, rng: &mut SmallRng) -> Result<Tally, StrategyError> {
        let mut tally = Tally {
            wins: vec![0; self.moves.len()],
            ..Tally::default()
        };

        for _ in 0..trials {
            if self.expired() {
                break;
            }
            let anchor = rng.gen_range(0..self.moves.len());
            let sampled = match BoardSampler::sample_with_retries(
                self.pov,
                self.belief,
                rng,
                self.budget.sample_attempts,
                Some(&mut tally.sampling),
            ) {
                Ok(sampled) => sampled,
                Err(err) if err.is_retryable() => {
                    tally.skipped += 1;
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            let mut rules = BoardRules::new(sampled.into_board())?;
            rules.apply(self.moves[anchor])?;
            let outcome = random_playout(
                &mut rules,
                self.player.opponent(),
                self.budget.ply_cap,
                rng,
            )?;
            match outcome.winner() {
                Some(winner) if winner == self.player => tally.wins[anchor] += 1,
                Some(_) => {}
                None => tally.stalled += 1,
            }
            tally.run += 1;
        }
        Ok(tally)
    }
}

fn run_parallel(job: &TrialJob<'_>, seeds: &[u64]) -> Result<Tally, StrategyError> {
    let workers = seeds.len();
    let base = job.budget.trials / workers;
    let extra = job.budget.trials % workers;

    let results: Vec<Result<Tally, StrategyError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = seeds
            .iter()
            .enumerate()
            .map(|(worker, &seed)| {
                let trials = base + usize::from(worker < extra);
                scope.spawn(move || job.run(trials, &mut SmallRng::seed_from_u64(seed)))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or(Err(StrategyError::WorkerPanicked)))
            .collect()
    });

    let mut total = Tally {
        wins: vec![0; job.moves.len()],
        ..Tally::default()
    };
    for result in results {
        total.merge(result?);
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gog_core::game::Match;
    use gog_core::model::board::Board;
    use rand::rngs::StdRng;

    fn quick(trials: usize, threads: usize) -> MoveSelector {
        MoveSelector::new(SearchBudget {
            trials,
            ply_cap: 300,
            threads,
            ..SearchBudget::default()
        })
    }

    #[test]
    fn single_legal_move_is_returned_without_search() {
        let mut rng = StdRng::seed_from_u64(4);
        let game = Match::random(&mut rng).unwrap();
        let pov = game.pov(Player::One);
        let belief = BeliefState::from_pov(Player::One, &pov);
        let only = game.legal_moves(Player::One)[3];
        for seed in 0..8 {
            let selection = quick(50, 1)
                .select_from(&pov, &belief, &[only], &mut StdRng::seed_from_u64(seed))
                .unwrap();
            assert_eq!(selection.mv, Some(only));
            assert_eq!(selection.report.trials_run, 0);
        }
    }

    #[test]
    fn no_legal_move_gives_none() {
        let pov: PovBoard = Board::empty();
        let belief = BeliefState::new(Player::One);
        let selection = quick(10, 1)
            .select(&pov, &belief, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(selection.mv, None);
        assert_eq!(selection.report.trials_run, 0);
    }

    #[test]
    fn chosen_move_is_legal() {
        let mut rng = StdRng::seed_from_u64(5);
        let game = Match::random(&mut rng).unwrap();
        let pov = game.pov(Player::One);
        let belief = BeliefState::from_pov(Player::One, &pov);
        let selection = quick(24, 1).select(&pov, &belief, &mut rng).unwrap();
        let mv = selection.mv.unwrap();
        assert!(game.legal_moves(Player::One).contains(&mv));
        assert_eq!(selection.report.trials_run + selection.report.trials_skipped, 24);
    }

    #[test]
    fn threads_split_the_trial_budget() {
        let mut rng = StdRng::seed_from_u64(6);
        let game = Match::random(&mut rng).unwrap();
        let pov = game.pov(Player::Two);
        let belief = BeliefState::from_pov(Player::Two, &pov);
        let selection = quick(30, 4).select(&pov, &belief, &mut rng).unwrap();
        assert!(selection.mv.is_some());
        assert_eq!(selection.report.trials_run, 30);
        assert_eq!(selection.report.sampling.succeeded, 30);
    }

    #[test]
    fn expired_deadline_falls_back_to_a_legal_move() {
        let mut rng = StdRng::seed_from_u64(7);
        let game = Match::random(&mut rng).unwrap();
        let pov = game.pov(Player::One);
        let belief = BeliefState::from_pov(Player::One, &pov);
        let selector = MoveSelector::new(SearchBudget {
            trials: 1_000,
            time_cap: Some(Duration::ZERO),
            ..SearchBudget::default()
        });
        let selection = selector.select(&pov, &belief, &mut rng).unwrap();
        assert_eq!(selection.report.trials_run, 0);
        assert!(selection.report.fallback);
        assert!(game.legal_moves(Player::One).contains(&selection.mv.unwrap()));
    }
}
