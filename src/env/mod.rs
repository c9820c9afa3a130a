//! Environment adapter for external driving loops.
//!
//! [`Environment`] turns the scheduler's suspend/resume protocol into a
//! request/response step function that takes one action for every seat.
//! [`Sessions`] holds many environments for a host that serves several
//! episodes at once.

pub mod environment;
pub mod session;

pub use environment::{
    Diagnostics, Environment, PlayerStep, ResetResult, StepResult, REASON_COMPLETED, REASON_STALL,
};
pub use session::{SessionError, SessionId, Sessions};
