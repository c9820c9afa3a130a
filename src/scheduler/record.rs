//! Applied-action history.

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;

/// A recorded action with metadata for history tracking.
///
/// Used for:
/// - Replay/debugging
/// - Diagnostics and episode logs kept by the caller
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The player who took this action.
    pub player: PlayerId,

    /// Canonical text form of the action.
    pub action: String,

    /// Turn number. A turn is a run of decisions by one player.
    pub turn: u32,

    /// Sequence number within the turn (for ordering).
    pub sequence: u32,
}

impl ActionRecord {
    /// Create a new action record.
    #[must_use]
    pub fn new(player: PlayerId, action: impl Into<String>, turn: u32, sequence: u32) -> Self {
        Self {
            player,
            action: action.into(),
            turn,
            sequence,
        }
    }
}
