//! Error types for the simulation engine.
//!
//! ## Taxonomy
//!
//! - [`DecodeError`]: a numeric vector does not match the declared layout.
//!   Always propagated, never coerced.
//! - [`EngineError::InvalidAction`]: a well-formed action that is illegal now,
//!   or a malformed text action. The environment adapter recovers this
//!   locally as a reward penalty; the bare scheduler surfaces it.
//! - [`EngineError::UnknownActionKind`] / [`EngineError::NoActionDecoded`]:
//!   registry misconfiguration or corrupted input. Fatal for the episode.
//! - [`StateError`]: schema violations when building or writing state.

use thiserror::Error;

use super::player::PlayerId;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Numeric vector does not match the declared layout.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Action is malformed or not legal in the current decision.
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// Action kind is not registered with the registry.
    #[error("unknown action kind: {0}")]
    UnknownActionKind(String),

    /// Every slot of an action vector decoded to its null encoding.
    #[error("no action kind could be decoded from the vector")]
    NoActionDecoded,

    /// The scheduler reached its terminal state.
    #[error("episode finished, call reset")]
    EpisodeFinished,

    /// The environment terminated the episode (completed or stalled).
    #[error("episode terminated, call reset")]
    EpisodeTerminated,

    /// The on-turn player has nothing actionable in a live episode.
    #[error("{0} has no legal actions")]
    NoLegalActions(PlayerId),

    /// Per-player input does not cover every seat.
    #[error("expected input for {expected} players, got {got}")]
    PlayerCountMismatch { expected: usize, got: usize },

    /// State schema violation.
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
}

/// Shape violations found while decoding a numeric vector.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    #[error("expected {expected} values, got {got}")]
    Length { expected: usize, got: usize },

    #[error("{kind}: flag slot must be 0 or 1, got {value}")]
    Flag { kind: String, value: f32 },

    #[error("{kind}: payload {value} is not a non-negative integer")]
    Payload { kind: String, value: f32 },
}

/// Schema violations on visibility-tagged state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("field `{0}` is not declared")]
    UnknownField(String),

    #[error("declared field `{0}` has no value")]
    MissingField(String),

    #[error("field `{field}` holds {expected} values, got {got}")]
    ShapeMismatch {
        field: String,
        expected: usize,
        got: usize,
    },

    #[error("field `{0}` is a nested state, not a value")]
    NotALeaf(String),

    #[error("field `{0}` is a value, not a nested state")]
    NotNested(String),

    #[error("field `{0}` is declared twice")]
    DuplicateField(String),

    #[error("field `{field}` has bounds {low}..={high}")]
    InvalidBounds { field: String, low: i64, high: i64 },

    #[error("field `{0}` overflowed")]
    Overflow(String),
}
