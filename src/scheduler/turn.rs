//! The suspend/resume turn state machine.
//!
//! ## Protocol
//!
//! ```text
//!   reset() ──▶ AwaitingAction(player, ranges) ──resume(legal)──▶ AwaitingAction(next, ..)
//!                         │                                              │
//!                 resume(illegal)                                 game finished
//!                         │                                              ▼
//!                 Err(InvalidAction), no change                       Finished
//! ```
//!
//! There is exactly one live decision at a time. A rejected action leaves
//! state, history and the pending decision untouched; what to do next
//! (retry, penalize, abort) is the caller's policy. A game error raised
//! while applying an action is propagated the same way: the action is not
//! recorded and the state is not changed.
//!
//! After an action resolves, [`GameModel::follow_up`] may narrow the next
//! decision to a subset of kinds (multi-step actions).

use im::Vector;
use tracing::{debug, info, warn};

use super::model::GameModel;
use super::record::ActionRecord;
use crate::action::{Action, ActionKind, ActionRange, ActionRegistry};
use crate::core::{EngineError, GameRng, PlayerId, PlayerMap, Result};
use crate::state::{FullState, PlayerView, StateSnapshot, Visibility};

/// A pending decision.
#[derive(Clone, Debug, PartialEq)]
pub struct Decision {
    /// The player on turn.
    pub player: PlayerId,
    /// Every actionable range for that player, in registration order.
    pub ranges: Vec<ActionRange>,
    /// Reward for the action that led here (0 after reset).
    pub reward: f64,
}

/// What the scheduler surfaces at a suspend point.
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    /// Waiting for the on-turn player's action.
    AwaitingAction(Decision),
    /// The game's end condition holds.
    Finished {
        /// Reward for the final action (0 if the game ended on reset).
        reward: f64,
        /// Terminal payoff per player.
        final_rewards: PlayerMap<f64>,
    },
}

impl Signal {
    /// The pending decision, if any.
    #[must_use]
    pub fn decision(&self) -> Option<&Decision> {
        match self {
            Signal::AwaitingAction(decision) => Some(decision),
            Signal::Finished { .. } => None,
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, Signal::Finished { .. })
    }
}

#[derive(Clone, Debug)]
enum Phase {
    Awaiting(Decision),
    Finished,
}

/// Drives one game through its turns.
///
/// Owns the live [`FullState`]; callers receive projections.
pub struct TurnScheduler<G: GameModel> {
    game: G,
    registry: ActionRegistry<G::Action>,
    state: FullState,
    rng: GameRng,
    phase: Phase,
    history: Vector<ActionRecord>,
    accepted: Option<Vec<ActionKind>>,
    turn: u32,
    sequence: u32,
}

impl<G: GameModel> TurnScheduler<G> {
    /// Create a scheduler and start the first episode.
    ///
    /// Fails if the game's action kinds don't form a valid registry, its
    /// no-op is not registered, or its state has the wrong player count.
    pub fn new(game: G, seed: u64) -> Result<Self> {
        let registry = ActionRegistry::new(game.action_kinds())?;
        let noop = game.noop().kind();
        if registry.kind(noop.key) != Some(&noop) {
            return Err(EngineError::UnknownActionKind(noop.key.to_string()));
        }

        let state = game.initial_state();
        if state.player_count() != game.player_count() {
            return Err(EngineError::PlayerCountMismatch {
                expected: game.player_count(),
                got: state.player_count(),
            });
        }

        let mut scheduler = Self {
            game,
            registry,
            state,
            rng: GameRng::new(seed),
            phase: Phase::Finished,
            history: Vector::new(),
            accepted: None,
            turn: 0,
            sequence: 0,
        };
        scheduler.reset()?;
        Ok(scheduler)
    }

    /// Restart: restore state in place, run setup, suspend at the first
    /// decision.
    ///
    /// A setup error leaves the scheduler finished.
    pub fn reset(&mut self) -> Result<Signal> {
        self.state.reset();
        self.history = Vector::new();
        self.accepted = None;
        self.turn = 0;
        self.sequence = 0;
        if let Err(e) = self.game.setup(&mut self.state, &mut self.rng) {
            self.phase = Phase::Finished;
            return Err(e);
        }

        let first = self.game.first_player(&self.state);
        info!(
            players = self.state.player_count(),
            first = %first,
            "episode reset"
        );
        self.suspend(first, 0.0)
    }

    /// Apply the on-turn player's action and advance to the next decision.
    ///
    /// An action outside the pending ranges is
    /// [`EngineError::InvalidAction`] and changes nothing.
    pub fn resume(&mut self, action: &G::Action) -> Result<Signal> {
        let Phase::Awaiting(decision) = &self.phase else {
            return Err(EngineError::EpisodeFinished);
        };
        let player = decision.player;
        let text = action.to_text();

        if !self.registry.is_legal(action, &decision.ranges) {
            warn!(player = %player, action = %text, "rejected illegal action");
            return Err(EngineError::InvalidAction(format!("{text} is not legal for {player}")));
        }

        debug!(player = %player, action = %text, turn = self.turn, "applying action");
        let mut next_state = self.state.clone();
        let reward = self
            .game
            .apply(&mut next_state, player, action, &mut self.rng)?;
        self.state = next_state;
        self.history
            .push_back(ActionRecord::new(player, text, self.turn, self.sequence));
        self.accepted = self.game.follow_up(&self.state, player, action);

        let next = self.game.next_player(&self.state, player);
        if next == player {
            self.sequence += 1;
        } else {
            self.turn += 1;
            self.sequence = 0;
        }
        self.suspend(next, reward)
    }

    fn suspend(&mut self, player: PlayerId, reward: f64) -> Result<Signal> {
        if self.game.is_finished(&self.state) {
            self.phase = Phase::Finished;
            let final_rewards = self.game.final_rewards(&self.state);
            info!(actions = self.history.len(), "episode finished");
            return Ok(Signal::Finished {
                reward,
                final_rewards,
            });
        }

        let ranges = self.legal_ranges(player);
        if ranges.is_empty() {
            self.phase = Phase::Finished;
            return Err(EngineError::NoLegalActions(player));
        }

        let decision = Decision {
            player,
            ranges,
            reward,
        };
        self.phase = Phase::Awaiting(decision.clone());
        Ok(Signal::AwaitingAction(decision))
    }

    /// Actionable ranges for `player` in the current state, noop excluded.
    ///
    /// Honors the kind restriction left by the last action's follow-up.
    #[must_use]
    pub fn legal_ranges(&self, player: PlayerId) -> Vec<ActionRange> {
        let noop = self.game.noop().kind();
        self.registry
            .kinds()
            .iter()
            .filter(|kind| **kind != noop)
            .filter(|kind| self.accepted.as_ref().map_or(true, |a| a.contains(*kind)))
            .map(|kind| self.game.action_range(kind, &self.state, player))
            .filter(ActionRange::is_actionable)
            .collect()
    }

    // === Accessors ===

    /// The pending decision, `None` once finished.
    #[must_use]
    pub fn decision(&self) -> Option<&Decision> {
        match &self.phase {
            Phase::Awaiting(decision) => Some(decision),
            Phase::Finished => None,
        }
    }

    /// The player on turn, `None` once finished.
    #[must_use]
    pub fn current(&self) -> Option<PlayerId> {
        self.decision().map(|d| d.player)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished)
    }

    /// Read-only view of the live state.
    #[must_use]
    pub fn state(&self) -> &FullState {
        &self.state
    }

    /// What `player` may know about the state.
    #[must_use]
    pub fn observe(&self, player: PlayerId) -> PlayerView {
        self.state.to_player_view(player)
    }

    /// Snapshot at `min` visibility. `Hidden` is the engine's full view.
    #[must_use]
    pub fn snapshot(&self, min: Visibility) -> StateSnapshot {
        self.state.snapshot(min)
    }

    /// Applied actions this episode, oldest first.
    #[must_use]
    pub fn history(&self) -> &Vector<ActionRecord> {
        &self.history
    }

    #[must_use]
    pub fn registry(&self) -> &ActionRegistry<G::Action> {
        &self.registry
    }

    #[must_use]
    pub fn game(&self) -> &G {
        &self.game
    }

    /// The game's no-op action.
    #[must_use]
    pub fn noop(&self) -> G::Action {
        self.game.noop()
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.state.player_count()
    }
}
