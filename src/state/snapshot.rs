//! Structured projections of state.
//!
//! A [`Snapshot`] is a detached, ordered copy of the fields that survived a
//! visibility filter. Callers only ever see snapshots, never the live state.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::core::{PlayerId, PlayerMap};

/// One projected field value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SnapshotValue {
    Values(Vec<i64>),
    Nested(Snapshot),
}

/// Ordered name -> value projection. Serializes as a JSON object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    fields: Vec<(String, SnapshotValue)>,
}

impl Snapshot {
    pub(crate) fn push(&mut self, name: impl Into<String>, value: SnapshotValue) {
        self.fields.push((name.into(), value));
    }

    /// Look up a projected field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SnapshotValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Leaf values of a projected field.
    #[must_use]
    pub fn values(&self, name: &str) -> Option<&[i64]> {
        match self.get(name)? {
            SnapshotValue::Values(v) => Some(v),
            SnapshotValue::Nested(_) => None,
        }
    }

    /// Did this field survive the projection?
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Field names in declared order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Number of projected fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if nothing survived the projection.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Projection of a whole [`FullState`](super::FullState) at one level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StateSnapshot {
    pub shared: Snapshot,
    pub players: PlayerMap<Snapshot>,
}

/// What one player may know about the state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    /// The observing player.
    pub player: PlayerId,
    /// The observer's own fields.
    pub own: Snapshot,
    /// Every other player's public fields, in seat order after the observer.
    pub others: Vec<(PlayerId, Snapshot)>,
    /// Shared fields visible to participants.
    pub shared: Snapshot,
}

impl PlayerView {
    /// Another player's public projection.
    #[must_use]
    pub fn other(&self, player: PlayerId) -> Option<&Snapshot> {
        self.others.iter().find(|(p, _)| *p == player).map(|(_, s)| s)
    }
}
