//! Core type bindings for Python.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::core::{EngineError, EnvConfig, PlayerId};

/// Map engine errors onto Python exceptions.
///
/// Malformed input becomes `ValueError`; everything else `RuntimeError`.
pub(crate) fn to_py_err(err: EngineError) -> PyErr {
    match err {
        EngineError::Decode(_)
        | EngineError::InvalidAction(_)
        | EngineError::NoActionDecoded
        | EngineError::PlayerCountMismatch { .. }
        | EngineError::InvalidConfiguration(_) => PyValueError::new_err(err.to_string()),
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

/// Python wrapper for PlayerId.
#[pyclass(name = "PlayerId")]
#[derive(Clone, Debug)]
pub struct PyPlayerId(pub PlayerId);

#[pymethods]
impl PyPlayerId {
    /// Create a new player ID.
    #[new]
    fn new(id: u8) -> Self {
        Self(PlayerId::new(id))
    }

    /// Get the player index (0-based).
    fn index(&self) -> usize {
        self.0.index()
    }

    fn __repr__(&self) -> String {
        format!("PlayerId({})", self.0 .0)
    }

    fn __eq__(&self, other: &Self) -> bool {
        self.0 == other.0
    }

    fn __hash__(&self) -> u64 {
        u64::from(self.0 .0)
    }
}

/// Python wrapper for EnvConfig.
#[pyclass(name = "EnvConfig")]
#[derive(Clone, Debug)]
pub struct PyEnvConfig(pub EnvConfig);

#[pymethods]
impl PyEnvConfig {
    #[new]
    #[pyo3(signature = (
        invalid_action_penalty = -1.0,
        idle_reward = 0.01,
        valid_action_reward = 0.1,
        max_consecutive_invalid = 10
    ))]
    fn new(
        invalid_action_penalty: f64,
        idle_reward: f64,
        valid_action_reward: f64,
        max_consecutive_invalid: u32,
    ) -> PyResult<Self> {
        let config = EnvConfig::new()
            .with_invalid_action_penalty(invalid_action_penalty)
            .with_idle_reward(idle_reward)
            .with_valid_action_reward(valid_action_reward)
            .with_max_consecutive_invalid(max_consecutive_invalid);
        config.validate().map_err(to_py_err)?;
        Ok(Self(config))
    }

    /// Load from a JSON object; missing keys take defaults.
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        let config: EnvConfig =
            serde_json::from_str(json).map_err(|e| PyValueError::new_err(e.to_string()))?;
        config.validate().map_err(to_py_err)?;
        Ok(Self(config))
    }

    #[getter]
    fn max_consecutive_invalid(&self) -> u32 {
        self.0.max_consecutive_invalid
    }

    fn __repr__(&self) -> String {
        format!(
            "EnvConfig(penalty={}, idle={}, valid={}, ceiling={})",
            self.0.invalid_action_penalty,
            self.0.idle_reward,
            self.0.valid_action_reward,
            self.0.max_consecutive_invalid
        )
    }
}
