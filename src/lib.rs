//! # turnsim
//!
//! A turn-based, partially-observable simulation engine for RL training,
//! scripted agents and human play.
//!
//! ## Design Principles
//!
//! 1. **Game-Agnostic**: Games plug in through the [`GameModel`] trait. The
//!    engine never names a field, action or rule of any concrete game.
//!
//! 2. **N-Player First**: Every per-player structure is a [`PlayerMap`]
//!    sized at construction. No convenience methods that assume 2 players.
//!
//! 3. **Fixed Shapes**: Every numeric vector (observation, action, legal
//!    range) has a static layout described by a [`NumericSpace`]. Hidden
//!    fields and absent action kinds are filled, never omitted.
//!
//! ## Architecture
//!
//! - **Visibility-Tagged State**: fields are `Hidden`, `SelfOnly` or
//!   `Public`; every projection filters on that tag.
//!
//! - **Closed Action Vocabulary**: a game's actions are one enum
//!   implementing [`Action`]; the [`ActionRegistry`] precomputes the
//!   concatenated numeric layout of every kind.
//!
//! - **Explicit State Machine**: the [`TurnScheduler`] suspends at each
//!   decision and resumes with one action. No coroutines, no threads.
//!
//! - **Persistent Data Structures**: O(1) state cloning via `im-rs`.
//!
//! ## Modules
//!
//! - `core`: Players, RNG, numeric spaces, configuration, errors
//! - `state`: Visibility-tagged state and its projections
//! - `action`: Action kinds, legality ranges, the registry codec
//! - `scheduler`: GameModel trait and the turn state machine
//! - `env`: Step-function adapter and session manager
//! - `games`: Reference games

pub mod action;
pub mod core;
pub mod env;
pub mod games;
pub mod scheduler;
pub mod state;

#[cfg(feature = "python")]
mod python;

// Re-export commonly used types
pub use crate::core::{
    DecodeError, EngineError, EnvConfig, GameRng, NumericSpace, PlayerId, PlayerMap, Result, Space,
    StateError,
};

pub use crate::state::{Field, FullState, PlayerView, Schema, Snapshot, SubState, Visibility};

pub use crate::action::{Action, ActionKind, ActionRange, ActionRegistry, Payload, PayloadKind};

pub use crate::scheduler::{ActionRecord, Decision, GameModel, Signal, TurnScheduler};

pub use crate::env::{Environment, SessionError, SessionId, Sessions, StepResult};
