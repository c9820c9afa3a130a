//! Turn scheduling: the game interface and the turn state machine.

pub mod model;
pub mod record;
pub mod turn;

pub use model::GameModel;
pub use record::ActionRecord;
pub use turn::{Decision, Signal, TurnScheduler};
