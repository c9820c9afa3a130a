use criterion::{black_box, criterion_group, criterion_main, Criterion};
use turnsim::action::ActionRegistry;
use turnsim::core::{EnvConfig, GameRng, PlayerId, PlayerMap};
use turnsim::env::Environment;
use turnsim::games::bidding::{Bid, BiddingGame, BiddingGameBuilder, KINDS};

fn new_env(players: usize) -> Environment<BiddingGame> {
    let game = BiddingGameBuilder::new()
        .player_count(players)
        .rounds(3)
        .build()
        .unwrap();
    Environment::new(game, EnvConfig::default(), 42).unwrap()
}

fn run_episode(env: &mut Environment<BiddingGame>, rng: &mut GameRng) -> f64 {
    env.reset().unwrap();
    let mut total = 0.0;
    while env.current_player().is_some() {
        let sched = env.scheduler();
        let decision = sched.decision().unwrap();
        let action = sched.registry().pick_random(&decision.ranges, rng).unwrap();
        let on_turn = decision.player;
        let actions = PlayerMap::new(env.player_count(), |p| {
            if p == on_turn {
                action.clone()
            } else {
                Bid::Wait
            }
        });
        total += env.step(&actions).unwrap().rewards().iter().sum::<f64>();
    }
    total
}

fn bench_codec(c: &mut Criterion) {
    let registry: ActionRegistry<Bid> = ActionRegistry::new(KINDS).unwrap();
    let bet = registry.encode(&Bid::Bet(37)).unwrap();

    c.bench_function("encode_decode_1000x", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                let vector = registry.encode(black_box(&Bid::Play(3))).unwrap();
                black_box(registry.decode(&vector).unwrap());
                black_box(registry.decode(black_box(&bet)).unwrap());
            }
        });
    });
}

fn bench_observation(c: &mut Criterion) {
    let env = new_env(8);
    c.bench_function("observation_8p", |b| {
        b.iter(|| {
            for p in PlayerId::all(8) {
                black_box(env.observation(p).unwrap());
            }
        });
    });
}

fn bench_episode(c: &mut Criterion) {
    for players in [2, 8] {
        let mut env = new_env(players);
        let mut rng = GameRng::new(7);
        c.bench_function(&format!("random_episode_{players}p"), |b| {
            b.iter(|| run_episode(&mut env, &mut rng));
        });
    }
}

criterion_group!(benches, bench_codec, bench_observation, bench_episode);
criterion_main!(benches);
