//! Whole-episode state: shared fields plus one SubState per player.

use std::sync::Arc;

use super::schema::Schema;
use super::snapshot::{PlayerView, StateSnapshot};
use super::substate::SubState;
use super::visibility::Visibility;
use crate::core::{NumericSpace, PlayerId, PlayerMap};

/// Shared fields plus a fixed-length per-player array.
///
/// The player count is fixed at construction; [`reset`](Self::reset) restores
/// values in place and never changes it. Every player SubState is built from
/// the same template schema, so per-player observations have a width that
/// does not depend on the observer.
#[derive(Clone, Debug, PartialEq)]
pub struct FullState {
    shared: SubState,
    players: PlayerMap<SubState>,
}

impl FullState {
    /// Create a state for `player_count` players.
    ///
    /// # Panics
    ///
    /// Panics if `player_count` is 0 or greater than 255.
    #[must_use]
    pub fn new(player_count: usize, shared: Arc<Schema>, player_template: Arc<Schema>) -> Self {
        Self {
            shared: SubState::new(shared),
            players: PlayerMap::new(player_count, |_| SubState::new(Arc::clone(&player_template))),
        }
    }

    /// Number of players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.player_count()
    }

    #[must_use]
    pub fn shared(&self) -> &SubState {
        &self.shared
    }

    pub fn shared_mut(&mut self) -> &mut SubState {
        &mut self.shared
    }

    #[must_use]
    pub fn player(&self, player: PlayerId) -> &SubState {
        &self.players[player]
    }

    pub fn player_mut(&mut self, player: PlayerId) -> &mut SubState {
        &mut self.players[player]
    }

    /// All per-player SubStates.
    #[must_use]
    pub fn players(&self) -> &PlayerMap<SubState> {
        &self.players
    }

    /// Restore shared and per-player fields to their initial values.
    pub fn reset(&mut self) {
        self.shared.reset();
        for (_, player) in self.players.iter_mut() {
            player.reset();
        }
    }

    // === Structured projections ===

    /// Every field at `min` or above. `Hidden` gives the engine's full view.
    #[must_use]
    pub fn snapshot(&self, min: Visibility) -> StateSnapshot {
        StateSnapshot {
            shared: self.shared.project(min),
            players: self.players.map(|_, p| p.project(min)),
        }
    }

    /// What `observer` may know: their own fields at `SelfOnly`, everyone
    /// else's at `Public`, shared fields at `SelfOnly`.
    #[must_use]
    pub fn to_player_view(&self, observer: PlayerId) -> PlayerView {
        let player_count = self.player_count();
        PlayerView {
            player: observer,
            own: self.players[observer].project(Visibility::SelfOnly),
            others: observer
                .seats_from(player_count)
                .skip(1)
                .map(|p| (p, self.players[p].project(Visibility::Public)))
                .collect(),
            shared: self.shared.project(Visibility::SelfOnly),
        }
    }

    // === Numeric projections ===

    /// Shared fields, then every player in seat order, all at `min`.
    #[must_use]
    pub fn to_numeric(&self, min: Visibility) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.numeric_width());
        self.shared.write_numeric(min, &mut out);
        for player in self.players.values() {
            player.write_numeric(min, &mut out);
        }
        out
    }

    /// Shape matching [`to_numeric`](Self::to_numeric).
    #[must_use]
    pub fn describe_shape(&self, min: Visibility) -> NumericSpace {
        let mut space = NumericSpace::new();
        space.extend_prefixed("shared.", &self.shared.describe_shape(min));
        for (id, player) in self.players.iter() {
            space.extend_prefixed(&format!("player{}.", id.index()), &player.describe_shape(min));
        }
        space
    }

    /// Per-player observation: shared fields at `SelfOnly`, then seats
    /// starting with the observer (observer at `SelfOnly`, others at `Public`).
    ///
    /// Opponents' `SelfOnly` fields are zero-filled, never omitted.
    #[must_use]
    pub fn to_player_numeric(&self, observer: PlayerId) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.numeric_width());
        self.shared.write_numeric(Visibility::SelfOnly, &mut out);
        for seat in observer.seats_from(self.player_count()) {
            let min = if seat == observer {
                Visibility::SelfOnly
            } else {
                Visibility::Public
            };
            self.players[seat].write_numeric(min, &mut out);
        }
        out
    }

    /// Shape matching [`to_player_numeric`](Self::to_player_numeric).
    ///
    /// Keys are relative to the observer (`self.`, `seat1.`, ...), so one
    /// descriptor serves every player.
    #[must_use]
    pub fn player_shape(&self) -> NumericSpace {
        let mut space = NumericSpace::new();
        space.extend_prefixed("shared.", &self.shared.describe_shape(Visibility::SelfOnly));
        let template = self.players[PlayerId::new(0)].schema();
        space.extend_prefixed("self.", &template.describe_shape(Visibility::SelfOnly));
        for offset in 1..self.player_count() {
            space.extend_prefixed(
                &format!("seat{offset}."),
                &template.describe_shape(Visibility::Public),
            );
        }
        space
    }

    /// Width of every numeric export.
    #[must_use]
    pub fn numeric_width(&self) -> usize {
        self.shared.schema().numeric_width()
            + self.player_count() * self.players[PlayerId::new(0)].schema().numeric_width()
    }
}
