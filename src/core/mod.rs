//! Core engine types: players, RNG, numeric spaces, configuration, errors.
//!
//! Everything here is game-agnostic. Games plug in through
//! [`GameModel`](crate::scheduler::GameModel).

pub mod config;
pub mod error;
pub mod player;
pub mod rng;
pub mod space;

pub use config::EnvConfig;
pub use error::{DecodeError, EngineError, Result, StateError};
pub use player::{PlayerId, PlayerMap};
pub use rng::GameRng;
pub use space::{NumericSpace, Space, SpaceEntry};
