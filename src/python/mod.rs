//! Python bindings for the turnsim engine.
//!
//! This module provides PyO3 bindings for driving environments from an
//! RL training loop.
//!
//! # Quick Start
//!
//! ```python
//! import turnsim
//!
//! env = turnsim.BiddingEnv(player_count=2, seed=42)
//! observations = env.reset()
//!
//! on_turn = env.current_player.index()
//! actions = ["bet(3)" if p == on_turn else "wait" for p in range(2)]
//! observations, rewards, terminated, diagnostics = env.step_text(actions)
//! ```

use pyo3::prelude::*;

mod py_core;
mod py_env;

pub use py_core::*;
pub use py_env::*;

/// turnsim: a turn-based simulation engine for RL training.
///
/// This module provides:
/// - The bidding reference game as a step environment
/// - Numeric and text action codecs
/// - Environment configuration
#[pymodule]
fn turnsim(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core types
    m.add_class::<PyPlayerId>()?;
    m.add_class::<PyEnvConfig>()?;

    // Environments
    m.add_class::<PyBiddingEnv>()?;

    Ok(())
}
