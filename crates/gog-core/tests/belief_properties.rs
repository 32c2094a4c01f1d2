use gog_core::belief::{BeliefState, BoardSampler, SamplingStats};
use gog_core::game::Match;
use gog_core::model::player::Player;
use gog_core::model::rank::Rank;
use gog_core::model::rules::BoardRules;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Plays uniformly random moves, feeding both beliefs, and calls `check`
/// after every ply.
fn play_random<F>(seed: u64, max_plies: u32, mut check: F)
where
    F: FnMut(&Match, &[BeliefState; 2], &mut SmallRng),
{
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut game = Match::random(&mut rng).unwrap();
    let mut beliefs = [
        BeliefState::from_pov(Player::One, &game.pov(Player::One)),
        BeliefState::from_pov(Player::Two, &game.pov(Player::Two)),
    ];

    while !game.is_over() && game.plies() < max_plies {
        let mover = game.turn();
        let moves = game.legal_moves(mover);
        let Some(&mv) = moves.choose(&mut rng) else {
            break;
        };
        let attacker_rank = game.board().get(mv.from).unwrap().rank;
        let defender_rank = game.board().get(mv.to).map(|piece| piece.rank);
        let event = game.play(mover, mv).unwrap();

        if let Some(defender_rank) = defender_rank {
            beliefs[mover.index()]
                .observe(&event, attacker_rank)
                .unwrap();
            beliefs[mover.opponent().index()]
                .observe(&event, defender_rank)
                .unwrap();
        }
        check(&game, &beliefs, &mut rng);
    }
}

#[test]
fn beliefs_never_exclude_the_true_rank() {
    for seed in 0..24 {
        play_random(seed, 400, |game, beliefs, _| {
            for belief in beliefs {
                belief.check_consistency().unwrap();
                for (_, piece) in game.board().pieces_of(belief.perspective().opponent()) {
                    let candidates = belief.candidates(piece.id).unwrap();
                    assert!(
                        candidates.contains(piece.rank),
                        "seed {seed}: {} lost its true rank {}",
                        piece.id,
                        piece.rank
                    );
                }
            }
        });
    }
}

#[test]
fn eliminated_pieces_stay_tracked() {
    play_random(99, 600, |game, beliefs, _| {
        for belief in beliefs {
            let enemy = belief.perspective().opponent();
            let on_board = game.board().pieces_of(enemy).count();
            assert_eq!(belief.tracked().len(), Rank::ARMY_SIZE);
            assert_eq!(belief.on_board().len(), on_board);
        }
    });
}

#[test]
fn propagation_reaches_a_fixpoint_after_every_observation() {
    play_random(7, 300, |_, beliefs, _| {
        for belief in beliefs {
            let mut copy = belief.clone();
            assert_eq!(copy.propagate(), Ok(0));
        }
    });
}

#[test]
fn sampled_boards_agree_with_the_belief() {
    let mut stats = SamplingStats::default();
    for seed in 100..108 {
        play_random(seed, 200, |game, beliefs, rng| {
            if game.is_over() {
                return;
            }
            let belief = &beliefs[game.turn().index()];
            let pov = game.pov(belief.perspective());
            let Ok(sampled) =
                BoardSampler::sample_with_retries(&pov, belief, rng, 8, Some(&mut stats))
            else {
                return;
            };
            for (pos, view) in pov.pieces_of(belief.perspective().opponent()) {
                let piece = sampled.board().get(pos).unwrap();
                assert_eq!(piece.id, view.id);
                assert!(belief.candidates(piece.id).unwrap().contains(piece.rank));
            }
            assert!(BoardRules::new(sampled.into_board()).is_ok());
        });
    }
    assert!(stats.succeeded > 0);
    assert!(stats.succeeded >= stats.attempts / 4);
}
