//! Property-based invariant tests for the engine.
//!
//! Uses proptest to generate random seeds and player counts, plays full
//! episodes with random legal play, and verifies core invariants at every
//! step.

use proptest::prelude::*;
use turnsim::action::{ActionRange, ActionRegistry};
use turnsim::core::{EnvConfig, GameRng, PlayerId, PlayerMap};
use turnsim::env::Environment;
use turnsim::games::bidding::{Bid, BiddingGame, BiddingGameBuilder, BET, KINDS, PLAY};

const MAX_STEPS: u32 = 1_000;

fn new_env(players: usize, rounds: u32, seed: u64) -> Environment<BiddingGame> {
    let game = BiddingGameBuilder::new()
        .player_count(players)
        .rounds(rounds)
        .build()
        .unwrap();
    Environment::new(game, EnvConfig::default(), seed).unwrap()
}

/// One action per seat: a random legal action on turn, the no-op elsewhere.
fn random_actions(env: &Environment<BiddingGame>, rng: &mut GameRng) -> PlayerMap<Bid> {
    let sched = env.scheduler();
    let decision = sched.decision().unwrap();
    let action = sched
        .registry()
        .pick_random(&decision.ranges, rng)
        .unwrap();
    PlayerMap::new(env.player_count(), |p| {
        if p == decision.player {
            action.clone()
        } else {
            Bid::Wait
        }
    })
}

fn bid_strategy() -> impl Strategy<Value = Bid> {
    prop_oneof![
        Just(Bid::Wait),
        (1i64..=100).prop_map(Bid::Bet),
        (0usize..5).prop_map(Bid::Play),
    ]
}

fn range_strategy() -> impl Strategy<Value = Vec<ActionRange>> {
    let bet = (any::<bool>(), -5i64..110, -5i64..110).prop_map(|(present, lo, hi)| {
        present.then(|| ActionRange::bounded(BET, lo, hi))
    });
    let play = (any::<bool>(), proptest::collection::vec(0usize..5, 0..5))
        .prop_map(|(present, legal)| present.then(|| ActionRange::choice(PLAY, legal)));
    (bet, play).prop_map(|(bet, play)| bet.into_iter().chain(play).collect())
}

// ---------------------------------------------------------------------------
// Full episodes
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Random legal play: fixed observation widths, round-robin order,
    /// every on-turn action accepted, and completion within the turn limit.
    #[test]
    fn episode_invariants_hold(seed in 0u64..1_000_000, players in 2usize..=8, rounds in 1u32..4) {
        let mut env = new_env(players, rounds, seed);
        let reset = env.reset().unwrap();
        let width = env.observation_space().width();
        prop_assert!(reset.observations.values().all(|o| o.len() == width));

        let mut rng = GameRng::new(seed ^ 0x5eed);
        let mut steps = 0u32;
        while let Some(on_turn) = env.current_player() {
            prop_assert_eq!(on_turn, PlayerId::new((steps as usize % players) as u8));

            let actions = random_actions(&env, &mut rng);
            let result = env.step(&actions).unwrap();
            steps += 1;

            for (player, step) in result.players.iter() {
                prop_assert_eq!(step.observation.len(), width);
                prop_assert_eq!(step.diagnostics["valid"].as_bool(), Some(true),
                    "seed {}: {} rejected at step {}", seed, player, steps);
            }
            prop_assert_eq!(env.consecutive_invalid(), 0);
            prop_assert!(steps <= MAX_STEPS, "seed {seed}: no termination");
        }

        prop_assert_eq!(steps as usize, players * rounds as usize);
        prop_assert!(env.is_terminated());
    }

    /// Chips are conserved: every bank plus the pot equals the starting total.
    #[test]
    fn chips_conserved(seed in 0u64..1_000_000, players in 2usize..=6) {
        let mut env = new_env(players, 3, seed);
        env.reset().unwrap();
        let total = 50 * players as i64;

        let mut rng = GameRng::new(seed);
        while env.current_player().is_some() {
            let actions = random_actions(&env, &mut rng);
            env.step(&actions).unwrap();

            let state = env.scheduler().state();
            let banks: i64 = PlayerId::all(players)
                .map(|p| state.player(p).get_scalar("bank").unwrap())
                .sum();
            let pot = state.shared().get_scalar("pot").unwrap();
            prop_assert_eq!(banks + pot, total);
        }
    }
}

// ---------------------------------------------------------------------------
// Registry codec and legality
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// decode(encode(x)) == x.
    #[test]
    fn encode_decode_round_trip(bid in bid_strategy()) {
        let registry: ActionRegistry<Bid> = ActionRegistry::new(KINDS).unwrap();
        let vector = registry.encode(&bid).unwrap();
        prop_assert_eq!(vector.len(), registry.numeric_space().width());
        prop_assert_eq!(registry.decode(&vector).unwrap(), bid.clone());
        prop_assert_eq!(registry.from_text(&registry.to_text(&bid)).unwrap(), bid);
    }

    /// Random picks from any range set are legal in that set.
    #[test]
    fn random_pick_is_legal(ranges in range_strategy(), seed in any::<u64>()) {
        let registry: ActionRegistry<Bid> = ActionRegistry::new(KINDS).unwrap();
        let mut rng = GameRng::new(seed);
        match registry.pick_random(&ranges, &mut rng) {
            Some(bid) => prop_assert!(registry.is_legal(&bid, &ranges)),
            None => prop_assert!(ranges.iter().all(|r| !r.is_actionable())),
        }
    }

    /// The range vector always has the declared width.
    #[test]
    fn range_vector_width(ranges in range_strategy()) {
        let registry: ActionRegistry<Bid> = ActionRegistry::new(KINDS).unwrap();
        let vector = registry.ranges_to_numeric(&ranges).unwrap();
        prop_assert_eq!(vector.len(), registry.range_numeric_space().width());
    }
}
