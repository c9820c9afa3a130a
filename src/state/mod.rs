//! Visibility-tagged game state.
//!
//! State is a tree of named fields. Each field carries a [`Visibility`]
//! level, and every projection filters on it:
//!
//! - [`SubState::project`] / [`FullState::snapshot`]: structured, omits
//!   fields below the level.
//! - [`SubState::to_numeric`] / [`FullState::to_player_numeric`]: flat
//!   `f32`, zero-fills fields below the level so widths are constant.
//! - [`Schema::describe_shape`] / [`FullState::player_shape`]: the static
//!   bounds matching the numeric form.
//!
//! Callers only ever receive projections. The live [`FullState`] stays with
//! the scheduler.

pub mod full;
pub mod schema;
pub mod snapshot;
pub mod substate;
pub mod visibility;

pub use full::FullState;
pub use schema::{Field, FieldKind, FieldSpec, Schema, SchemaBuilder, Values, DEFAULT_BOUND};
pub use snapshot::{PlayerView, Snapshot, SnapshotValue, StateSnapshot};
pub use substate::{FieldValue, SubState};
pub use visibility::Visibility;
