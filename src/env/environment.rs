//! Stateless step function over the turn scheduler.
//!
//! ## Step Policy
//!
//! Every step takes one action per seat:
//!
//! - On-turn player: a legal action is forwarded to the scheduler and earns
//!   the game's reward plus `valid_action_reward`. An illegal one earns
//!   `invalid_action_penalty`, leaves the state untouched and bumps the
//!   consecutive-invalid counter.
//! - Off-turn players: the game's no-op earns `idle_reward`; anything else
//!   earns `invalid_action_penalty`.
//! - When the counter reaches `max_consecutive_invalid`, every player is
//!   terminated with reason `forced_stall_termination`.
//! - When the game finishes, every player is terminated with reason
//!   `completed` and credited `valid_action_reward` plus its terminal payoff.
//!
//! Illegality is feedback here, never an error. Malformed input
//! ([`DecodeError`](crate::core::DecodeError),
//! [`EngineError::NoActionDecoded`]) still propagates.

use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::core::{EngineError, EnvConfig, NumericSpace, PlayerId, PlayerMap, Result};
use crate::scheduler::{GameModel, Signal, TurnScheduler};
use crate::state::PlayerView;

/// Free-form per-player step diagnostics. Keys serialize in sorted order.
pub type Diagnostics = Map<String, Value>;

/// Diagnostics reason for a game that reached its end condition.
pub const REASON_COMPLETED: &str = "completed";

/// Diagnostics reason for the invalid-action ceiling.
pub const REASON_STALL: &str = "forced_stall_termination";

/// Initial observations plus the static layouts needed to read them.
#[derive(Clone, Debug, PartialEq)]
pub struct ResetResult {
    pub observations: PlayerMap<Vec<f32>>,
    pub observation_space: NumericSpace,
    pub action_space: NumericSpace,
    pub range_space: NumericSpace,
}

/// One player's share of a step.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerStep {
    pub observation: Vec<f32>,
    pub reward: f64,
    pub terminated: bool,
    pub diagnostics: Diagnostics,
}

/// Per-player step output.
#[derive(Clone, Debug, PartialEq)]
pub struct StepResult {
    pub players: PlayerMap<PlayerStep>,
}

impl StepResult {
    /// Rewards in seat order.
    #[must_use]
    pub fn rewards(&self) -> Vec<f64> {
        self.players.values().map(|s| s.reward).collect()
    }

    /// Termination flags in seat order.
    #[must_use]
    pub fn terminated(&self) -> Vec<bool> {
        self.players.values().map(|s| s.terminated).collect()
    }

    /// Did the episode end this step?
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.players.values().all(|s| s.terminated)
    }

    /// Termination reason, if the episode ended.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.players
            .values()
            .find_map(|s| s.diagnostics.get("reason").and_then(Value::as_str))
    }
}

enum Outcome {
    Running,
    Completed(PlayerMap<f64>),
    Stalled,
}

/// Request/response wrapper around a [`TurnScheduler`].
pub struct Environment<G: GameModel> {
    scheduler: TurnScheduler<G>,
    config: EnvConfig,
    consecutive_invalid: u32,
    terminated: bool,
    steps: u64,
    observation_space: NumericSpace,
}

impl<G: GameModel> Environment<G> {
    /// Create an environment. The config is validated first.
    pub fn new(game: G, config: EnvConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let scheduler = TurnScheduler::new(game, seed)?;

        let mut observation_space = scheduler.state().player_shape();
        observation_space.extend_prefixed("range.", scheduler.registry().range_numeric_space());

        Ok(Self {
            scheduler,
            config,
            consecutive_invalid: 0,
            terminated: false,
            steps: 0,
            observation_space,
        })
    }

    /// Restart the episode and return every player's first observation.
    ///
    /// A game that cannot start (setup failure, no legal first move) leaves
    /// the environment terminated until the next successful reset.
    pub fn reset(&mut self) -> Result<ResetResult> {
        self.consecutive_invalid = 0;
        self.steps = 0;
        if let Err(e) = self.scheduler.reset() {
            self.abort(&e);
            return Err(e);
        }
        self.terminated = self.scheduler.is_finished();

        Ok(ResetResult {
            observations: self.observations()?,
            observation_space: self.observation_space.clone(),
            action_space: self.action_space().clone(),
            range_space: self.range_space().clone(),
        })
    }

    /// Advance one step with one action per seat.
    pub fn step(&mut self, actions: &PlayerMap<G::Action>) -> Result<StepResult> {
        if self.terminated {
            return Err(EngineError::EpisodeTerminated);
        }
        let player_count = self.scheduler.player_count();
        if actions.player_count() != player_count {
            return Err(EngineError::PlayerCountMismatch {
                expected: player_count,
                got: actions.player_count(),
            });
        }
        let on_turn = self
            .scheduler
            .current()
            .ok_or(EngineError::EpisodeTerminated)?;

        self.steps += 1;
        let noop = self.scheduler.noop();
        let mut rewards = PlayerMap::with_value(player_count, 0.0);
        let mut diagnostics: PlayerMap<Diagnostics> = PlayerMap::with_default(player_count);
        let mut idled = PlayerMap::with_value(player_count, false);

        // Off-turn players must idle.
        for (player, action) in actions.iter().filter(|(p, _)| *p != on_turn) {
            let idle = *action == noop;
            idled[player] = idle;
            rewards[player] = if idle {
                self.config.idle_reward
            } else {
                self.config.invalid_action_penalty
            };
            let diag = &mut diagnostics[player];
            diag.insert("on_turn".into(), json!(false));
            diag.insert("action".into(), json!(action.to_text()));
            diag.insert("valid".into(), json!(idle));
        }

        // On-turn player.
        let action = &actions[on_turn];
        let mut outcome = Outcome::Running;
        let valid = match self.scheduler.resume(action) {
            Ok(Signal::AwaitingAction(decision)) => {
                rewards[on_turn] = decision.reward + self.config.valid_action_reward;
                true
            }
            Ok(Signal::Finished {
                reward,
                final_rewards,
            }) => {
                rewards[on_turn] = reward + self.config.valid_action_reward;
                outcome = Outcome::Completed(final_rewards);
                true
            }
            Err(EngineError::InvalidAction(_)) => {
                rewards[on_turn] = self.config.invalid_action_penalty;
                false
            }
            Err(e) => {
                self.abort(&e);
                return Err(e);
            }
        };

        if valid {
            self.consecutive_invalid = 0;
        } else {
            self.consecutive_invalid += 1;
        }
        let streak = self.consecutive_invalid;
        if streak >= self.config.max_consecutive_invalid {
            warn!(player = %on_turn, streak, "forcing stall termination");
            self.consecutive_invalid = 0;
            outcome = Outcome::Stalled;
        }

        let diag = &mut diagnostics[on_turn];
        diag.insert("on_turn".into(), json!(true));
        diag.insert("action".into(), json!(action.to_text()));
        diag.insert("valid".into(), json!(valid));
        diag.insert("consecutive_invalid".into(), json!(streak));

        let reason = match outcome {
            Outcome::Running => None,
            Outcome::Completed(final_rewards) => {
                for player in PlayerId::all(player_count) {
                    if idled[player] {
                        rewards[player] = self.config.valid_action_reward;
                    }
                    rewards[player] += final_rewards[player];
                }
                Some(REASON_COMPLETED)
            }
            Outcome::Stalled => Some(REASON_STALL),
        };

        if let Some(reason) = reason {
            self.terminated = true;
            info!(reason, steps = self.steps, "episode terminated");
            for (_, diag) in diagnostics.iter_mut() {
                diag.insert("reason".into(), json!(reason));
            }
        }

        debug!(
            step = self.steps,
            player = %on_turn,
            valid,
            "step"
        );

        let terminated = self.terminated;
        let steps = self
            .observations()?
            .into_vec()
            .into_iter()
            .zip(rewards.into_vec())
            .zip(diagnostics.into_vec())
            .map(|((observation, reward), diagnostics)| PlayerStep {
                observation,
                reward,
                terminated,
                diagnostics,
            })
            .collect();
        Ok(StepResult {
            players: PlayerMap::from_vec(player_count, steps)?,
        })
    }

    /// A fatal error ends the episode; only `reset` recovers.
    fn abort(&mut self, error: &EngineError) {
        warn!(%error, steps = self.steps, "episode aborted");
        self.terminated = true;
        self.consecutive_invalid = 0;
    }

    /// Decode one numeric action vector per seat, then [`step`](Self::step).
    ///
    /// Decode failures are fatal and propagate.
    pub fn step_numeric(&mut self, vectors: &[Vec<f32>]) -> Result<StepResult> {
        let registry = self.scheduler.registry();
        let actions = vectors
            .iter()
            .map(|v| registry.decode(v))
            .collect::<Result<Vec<_>>>()?;
        let actions = PlayerMap::from_vec(self.scheduler.player_count(), actions)?;
        self.step(&actions)
    }

    /// Per-player observation: state at the player's visibility, then the
    /// legal-range vector (null for everyone but the on-turn player).
    pub fn observation(&self, player: PlayerId) -> Result<Vec<f32>> {
        let registry = self.scheduler.registry();
        let mut observation = self.scheduler.state().to_player_numeric(player);
        let ranges = match self.scheduler.decision() {
            Some(decision) if decision.player == player && !self.terminated => {
                registry.ranges_to_numeric(&decision.ranges)?
            }
            _ => registry.null_ranges(),
        };
        observation.extend(ranges);
        Ok(observation)
    }

    fn observations(&self) -> Result<PlayerMap<Vec<f32>>> {
        let player_count = self.scheduler.player_count();
        let observations = PlayerId::all(player_count)
            .map(|p| self.observation(p))
            .collect::<Result<Vec<_>>>()?;
        PlayerMap::from_vec(player_count, observations)
    }

    // === Accessors ===

    /// Layout of every observation vector.
    #[must_use]
    pub fn observation_space(&self) -> &NumericSpace {
        &self.observation_space
    }

    /// Layout of action vectors.
    #[must_use]
    pub fn action_space(&self) -> &NumericSpace {
        self.scheduler.registry().numeric_space()
    }

    /// Layout of legal-range vectors.
    #[must_use]
    pub fn range_space(&self) -> &NumericSpace {
        self.scheduler.registry().range_numeric_space()
    }

    /// Structured view for one player.
    #[must_use]
    pub fn observe(&self, player: PlayerId) -> PlayerView {
        self.scheduler.observe(player)
    }

    /// The player on turn, `None` once terminated.
    #[must_use]
    pub fn current_player(&self) -> Option<PlayerId> {
        if self.terminated {
            None
        } else {
            self.scheduler.current()
        }
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    #[must_use]
    pub fn consecutive_invalid(&self) -> u32 {
        self.consecutive_invalid
    }

    #[must_use]
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    #[must_use]
    pub fn scheduler(&self) -> &TurnScheduler<G> {
        &self.scheduler
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.scheduler.player_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::bidding::{Bid, BiddingGame, BiddingGameBuilder};
    use crate::state::Visibility;

    fn env(players: usize, ceiling: u32) -> Environment<BiddingGame> {
        let game = BiddingGameBuilder::new()
            .player_count(players)
            .starting_bank(50)
            .build()
            .unwrap();
        let config = EnvConfig::new().with_max_consecutive_invalid(ceiling);
        Environment::new(game, config, 42).unwrap()
    }

    fn actions(on_turn: PlayerId, action: Bid, players: usize) -> PlayerMap<Bid> {
        PlayerMap::new(players, |p| if p == on_turn { action.clone() } else { Bid::Wait })
    }

    #[test]
    fn test_rejects_invalid_config() {
        let game = BiddingGameBuilder::new().build().unwrap();
        let config = EnvConfig::new().with_max_consecutive_invalid(0);
        assert!(matches!(
            Environment::new(game, config, 0),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_reset_shapes() {
        let mut env = env(3, 10);
        let reset = env.reset().unwrap();
        assert_eq!(reset.observations.player_count(), 3);
        for obs in reset.observations.values() {
            assert_eq!(obs.len(), reset.observation_space.width());
        }
        assert_eq!(reset.action_space.width(), env.action_space().width());
    }

    #[test]
    fn test_ranges_only_for_on_turn_player() {
        let mut env = env(2, 10);
        let reset = env.reset().unwrap();
        let range = reset.observation_space.slot("range.bet").unwrap();

        let p0 = &reset.observations[PlayerId::new(0)];
        let p1 = &reset.observations[PlayerId::new(1)];
        assert_eq!(p0[range.clone()], [1.0, 10.0]);
        assert_eq!(p1[range], [-1.0, -1.0]);
    }

    #[test]
    fn test_legal_step_rewards() {
        let mut env = env(2, 10);
        env.reset().unwrap();
        let config = env.config().clone();

        let result = env.step(&actions(PlayerId::new(0), Bid::Bet(5), 2)).unwrap();
        assert_eq!(
            result.rewards(),
            vec![config.valid_action_reward, config.idle_reward]
        );
        assert_eq!(result.terminated(), vec![false, false]);
        assert_eq!(env.current_player(), Some(PlayerId::new(1)));

        let diag = &result.players[PlayerId::new(0)].diagnostics;
        assert_eq!(diag["action"], json!("bet(5)"));
        assert_eq!(diag["valid"], json!(true));
        assert_eq!(diag["on_turn"], json!(true));
        assert_eq!(diag["consecutive_invalid"], json!(0));
        assert!(!result.players[PlayerId::new(1)].diagnostics.contains_key("consecutive_invalid"));
    }

    #[test]
    fn test_off_turn_interference_penalized() {
        let mut env = env(2, 10);
        env.reset().unwrap();
        let config = env.config().clone();

        let mut submitted = actions(PlayerId::new(0), Bid::Bet(5), 2);
        submitted[PlayerId::new(1)] = Bid::Bet(3);
        let result = env.step(&submitted).unwrap();

        assert_eq!(
            result.rewards(),
            vec![config.valid_action_reward, config.invalid_action_penalty]
        );
        assert_eq!(
            result.players[PlayerId::new(1)].diagnostics["valid"],
            json!(false)
        );
    }

    #[test]
    fn test_stall_termination_scenario() {
        let mut env = env(2, 3);
        env.reset().unwrap();
        let config = env.config().clone();
        let before = env.scheduler().snapshot(Visibility::Hidden);

        // The table maximum is 10, so bet(60) is outside [lower, upper].
        let submitted = actions(PlayerId::new(0), Bid::Bet(60), 2);
        for step in 1..=3 {
            let result = env.step(&submitted).unwrap();
            assert_eq!(
                result.rewards(),
                vec![config.invalid_action_penalty, config.idle_reward]
            );
            if step < 3 {
                assert_eq!(result.terminated(), vec![false, false]);
                assert_eq!(result.reason(), None);
            } else {
                assert_eq!(result.terminated(), vec![true, true]);
                assert_eq!(result.reason(), Some(REASON_STALL));
                assert_eq!(
                    result.players[PlayerId::new(0)].diagnostics["consecutive_invalid"],
                    json!(3)
                );
            }
        }

        assert_eq!(env.scheduler().snapshot(Visibility::Hidden), before);
        assert!(env.scheduler().history().is_empty());
        assert_eq!(env.consecutive_invalid(), 0);
        assert_eq!(env.step(&submitted), Err(EngineError::EpisodeTerminated));
    }

    #[test]
    fn test_valid_action_resets_streak() {
        let mut env = env(2, 3);
        env.reset().unwrap();
        let bad = actions(PlayerId::new(0), Bid::Bet(60), 2);
        env.step(&bad).unwrap();
        env.step(&bad).unwrap();
        assert_eq!(env.consecutive_invalid(), 2);

        env.step(&actions(PlayerId::new(0), Bid::Bet(1), 2)).unwrap();
        assert_eq!(env.consecutive_invalid(), 0);
    }

    #[test]
    fn test_completion_credits_everyone() {
        let mut env = env(2, 10);
        env.reset().unwrap();
        let config = env.config().clone();

        let mut last = None;
        while !env.is_terminated() {
            let on_turn = env.current_player().unwrap();
            last = Some(env.step(&actions(on_turn, Bid::Bet(1), 2)).unwrap());
        }
        let last = last.unwrap();

        assert_eq!(last.reason(), Some(REASON_COMPLETED));
        assert!(last.is_terminal());
        // Both bet the same each round: shared win, +0.5 each.
        for reward in last.rewards() {
            assert!(reward >= config.valid_action_reward);
        }
        assert_eq!(env.current_player(), None);
    }

    #[test]
    fn test_step_numeric_decodes() {
        let mut env = env(2, 10);
        env.reset().unwrap();
        let registry = env.scheduler().registry().clone();

        let vectors = vec![
            registry.encode(&Bid::Bet(4)).unwrap(),
            registry.encode(&Bid::Wait).unwrap(),
        ];
        let result = env.step_numeric(&vectors).unwrap();
        assert_eq!(
            result.players[PlayerId::new(0)].diagnostics["action"],
            json!("bet(4)")
        );

        let null = vec![registry.null_vector(), registry.encode(&Bid::Wait).unwrap()];
        assert_eq!(env.step_numeric(&null), Err(EngineError::NoActionDecoded));

        let short = vec![vec![1.0]];
        assert!(matches!(
            env.step_numeric(&short),
            Err(EngineError::Decode(_))
        ));
    }

    #[test]
    fn test_wrong_player_count() {
        let mut env = env(2, 10);
        env.reset().unwrap();
        let three = PlayerMap::with_value(3, Bid::Wait);
        assert!(matches!(
            env.step(&three),
            Err(EngineError::PlayerCountMismatch { expected: 2, got: 3 })
        ));
    }
    /// Bidding where `bet(7)` fails inside the game.
    struct Fragile(BiddingGame);

    impl GameModel for Fragile {
        type Action = Bid;
        fn player_count(&self) -> usize {
            self.0.player_count()
        }
        fn action_kinds(&self) -> Vec<crate::action::ActionKind> {
            self.0.action_kinds()
        }
        fn noop(&self) -> Bid {
            Bid::Wait
        }
        fn initial_state(&self) -> crate::state::FullState {
            self.0.initial_state()
        }
        fn setup(&mut self, state: &mut crate::state::FullState, rng: &mut crate::core::GameRng) -> Result<()> {
            self.0.setup(state, rng)
        }
        fn action_range(
            &self,
            kind: &crate::action::ActionKind,
            state: &crate::state::FullState,
            player: PlayerId,
        ) -> crate::action::ActionRange {
            self.0.action_range(kind, state, player)
        }
        fn apply(
            &mut self,
            state: &mut crate::state::FullState,
            player: PlayerId,
            bid: &Bid,
            rng: &mut crate::core::GameRng,
        ) -> Result<f64> {
            if *bid == Bid::Bet(7) {
                return Err(crate::core::StateError::UnknownField("table".into()).into());
            }
            self.0.apply(state, player, bid, rng)
        }
        fn is_finished(&self, state: &crate::state::FullState) -> bool {
            self.0.is_finished(state)
        }
    }

    #[test]
    fn test_fatal_error_terminates_until_reset() {
        let game = BiddingGameBuilder::new().build().unwrap();
        let mut env = Environment::new(Fragile(game), EnvConfig::default(), 9).unwrap();
        env.reset().unwrap();
        let p0 = PlayerId::new(0);

        env.step(&actions(p0, Bid::Play(4), 2)).unwrap();
        assert_eq!(env.consecutive_invalid(), 1);

        let err = env.step(&actions(p0, Bid::Bet(7), 2)).unwrap_err();
        assert!(matches!(err, EngineError::State(_)));
        assert!(env.is_terminated());
        assert_eq!(env.current_player(), None);
        assert_eq!(env.consecutive_invalid(), 0);
        assert_eq!(
            env.step(&actions(p0, Bid::Bet(3), 2)),
            Err(EngineError::EpisodeTerminated)
        );

        env.reset().unwrap();
        assert!(!env.is_terminated());
        assert_eq!(env.current_player(), Some(p0));
        env.step(&actions(p0, Bid::Bet(3), 2)).unwrap();
    }

    #[test]
    fn test_diagnostics_serialize_sorted() {
        let mut env = env(2, 10);
        env.reset().unwrap();
        let result = env.step(&actions(PlayerId::new(0), Bid::Bet(2), 2)).unwrap();
        let text = serde_json::to_string(&result.players[PlayerId::new(1)].diagnostics).unwrap();
        assert_eq!(text, r#"{"action":"wait","on_turn":false,"valid":true}"#);
    }
}
