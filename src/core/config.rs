//! Environment configuration.
//!
//! Reward shaping and the stall fail-safe are driving-loop policy, so they
//! live here rather than in any game. Hosts typically build one with the
//! `with_*` methods or deserialize it from JSON.

use serde::{Deserialize, Serialize};

use super::error::{EngineError, Result};

/// Reward and termination policy for [`Environment`](crate::env::Environment).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Reward for any illegal submission (on-turn or out-of-turn).
    pub invalid_action_penalty: f64,

    /// Reward for an off-turn player that correctly submitted the no-op.
    pub idle_reward: f64,

    /// Added to a legal on-turn action's game reward, and credited to every
    /// player when the episode completes.
    pub valid_action_reward: f64,

    /// Consecutive illegal on-turn actions before every player is terminated.
    pub max_consecutive_invalid: u32,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            invalid_action_penalty: -1.0,
            idle_reward: 0.01,
            valid_action_reward: 0.1,
            max_consecutive_invalid: 10,
        }
    }
}

impl EnvConfig {
    /// Create a config with default rewards.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the illegal-action penalty.
    #[must_use]
    pub fn with_invalid_action_penalty(mut self, penalty: f64) -> Self {
        self.invalid_action_penalty = penalty;
        self
    }

    /// Set the reward for correct idling.
    #[must_use]
    pub fn with_idle_reward(mut self, reward: f64) -> Self {
        self.idle_reward = reward;
        self
    }

    /// Set the reward for legal actions and completion.
    #[must_use]
    pub fn with_valid_action_reward(mut self, reward: f64) -> Self {
        self.valid_action_reward = reward;
        self
    }

    /// Set the stall ceiling.
    #[must_use]
    pub fn with_max_consecutive_invalid(mut self, ceiling: u32) -> Self {
        self.max_consecutive_invalid = ceiling;
        self
    }

    /// Reject configurations the adapter cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_consecutive_invalid == 0 {
            return Err(EngineError::InvalidConfiguration(
                "max_consecutive_invalid must be at least 1",
            ));
        }
        if !self.invalid_action_penalty.is_finite()
            || !self.idle_reward.is_finite()
            || !self.valid_action_reward.is_finite()
        {
            return Err(EngineError::InvalidConfiguration("rewards must be finite"));
        }
        Ok(())
    }
}
