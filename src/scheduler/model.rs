//! The capability interface concrete games implement.
//!
//! Games implement `GameModel` to define their rules:
//! - Which action kinds exist, and which one is the no-op
//! - The state layout and per-episode setup
//! - What is legal for a player right now
//! - How actions modify state, and who acts next
//! - End condition and terminal payoffs

use crate::action::{Action, ActionKind, ActionRange};
use crate::core::{GameRng, PlayerId, PlayerMap, Result};
use crate::state::FullState;

/// Rules of one concrete game.
///
/// ## Implementation Notes
///
/// - `action_kinds`: fixed order; it is the numeric wire layout
/// - `noop`: what off-turn players submit; its kind is never offered to the
///   on-turn player
/// - `action_range`: must not mutate anything
/// - `apply`: only called with actions the current ranges admit; an error
///   discards every state change the call made
/// - `follow_up`: narrows the next decision to a subset of kinds, for
///   actions that resolve in several steps
pub trait GameModel {
    /// The game's closed action vocabulary.
    type Action: Action;

    /// Number of seats. Fixed for the lifetime of the game.
    fn player_count(&self) -> usize;

    /// Every action kind, in registration order.
    fn action_kinds(&self) -> Vec<ActionKind>;

    /// The explicit do-nothing action.
    fn noop(&self) -> Self::Action;

    /// A fresh state with every field at its declared initial value.
    fn initial_state(&self) -> FullState;

    /// Per-episode setup after reset (dealing, shuffling).
    fn setup(&mut self, _state: &mut FullState, _rng: &mut GameRng) -> Result<()> {
        Ok(())
    }

    /// Who acts first.
    fn first_player(&self, _state: &FullState) -> PlayerId {
        PlayerId::new(0)
    }

    /// Legality envelope of `kind` for `player` in `state`.
    fn action_range(&self, kind: &ActionKind, state: &FullState, player: PlayerId) -> ActionRange;

    /// Apply a legal action. Returns the reward for the acting player.
    fn apply(
        &mut self,
        state: &mut FullState,
        player: PlayerId,
        action: &Self::Action,
        rng: &mut GameRng,
    ) -> Result<f64>;

    /// Kinds the next decision is restricted to after `action` resolved.
    ///
    /// `None` offers every registered kind.
    fn follow_up(
        &self,
        _state: &FullState,
        _player: PlayerId,
        _action: &Self::Action,
    ) -> Option<Vec<ActionKind>> {
        None
    }

    /// Who acts after `player`. Strict round-robin by default.
    fn next_player(&self, state: &FullState, player: PlayerId) -> PlayerId {
        player.next(state.player_count())
    }

    /// Has the episode ended?
    fn is_finished(&self, state: &FullState) -> bool;

    /// Terminal payoff per player, credited once when the episode ends.
    fn final_rewards(&self, state: &FullState) -> PlayerMap<f64> {
        PlayerMap::with_value(state.player_count(), 0.0)
    }
}
