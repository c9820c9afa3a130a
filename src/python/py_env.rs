//! Environment bindings for Python.

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::action::Action;
use crate::core::{EngineError, PlayerId, PlayerMap};
use crate::env::{Environment, StepResult};
use crate::games::bidding::{Bid, BiddingGame, BiddingGameBuilder};

use super::py_core::{to_py_err, PyEnvConfig, PyPlayerId};

type Observations<'py> = Vec<Bound<'py, PyArray1<f32>>>;

/// Python wrapper for the bidding game's environment.
///
/// Every step takes one action per seat, either as numeric vectors or as
/// text (`"wait"`, `"bet(5)"`, `"play(2)"`).
#[pyclass(name = "BiddingEnv")]
pub struct PyBiddingEnv {
    env: Environment<BiddingGame>,
}

#[pymethods]
impl PyBiddingEnv {
    /// Create a new environment.
    ///
    /// # Arguments
    /// - player_count: Number of players (2-8)
    /// - rounds: Turns per player before the game ends
    /// - starting_bank: Chips each player starts with
    /// - seed: RNG seed for deterministic deals
    /// - config: Reward and stall policy
    #[new]
    #[pyo3(signature = (player_count = 2, rounds = 3, starting_bank = 50, seed = 42, config = None))]
    fn new(
        player_count: usize,
        rounds: u32,
        starting_bank: i64,
        seed: u64,
        config: Option<PyEnvConfig>,
    ) -> PyResult<Self> {
        if !(2..=8).contains(&player_count) {
            return Err(PyValueError::new_err("player_count must be 2-8"));
        }
        let game = BiddingGameBuilder::new()
            .player_count(player_count)
            .rounds(rounds)
            .starting_bank(starting_bank)
            .build()
            .map_err(to_py_err)?;
        let config = config.map(|c| c.0).unwrap_or_default();
        let env = Environment::new(game, config, seed).map_err(to_py_err)?;
        Ok(Self { env })
    }

    /// Restart the episode. Returns one observation per player.
    fn reset<'py>(&mut self, py: Python<'py>) -> PyResult<Observations<'py>> {
        let reset = self.env.reset().map_err(to_py_err)?;
        Ok(reset
            .observations
            .into_vec()
            .into_iter()
            .map(|obs| PyArray1::from_vec_bound(py, obs))
            .collect())
    }

    /// Step with one numeric action vector per player.
    ///
    /// Returns `(observations, rewards, terminated, diagnostics_json)`.
    #[allow(clippy::type_complexity)]
    fn step<'py>(
        &mut self,
        py: Python<'py>,
        actions: Vec<PyReadonlyArray1<'py, f32>>,
    ) -> PyResult<(Observations<'py>, Vec<f64>, Vec<bool>, Vec<String>)> {
        let vectors = actions
            .iter()
            .map(|a| a.as_slice().map(<[f32]>::to_vec))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        let result = self.env.step_numeric(&vectors).map_err(to_py_err)?;
        Ok(unpack(py, result))
    }

    /// Step with one text action per player.
    #[allow(clippy::type_complexity)]
    fn step_text<'py>(
        &mut self,
        py: Python<'py>,
        actions: Vec<String>,
    ) -> PyResult<(Observations<'py>, Vec<f64>, Vec<bool>, Vec<String>)> {
        let registry = self.env.scheduler().registry();
        let parsed = actions
            .iter()
            .map(|text| registry.from_text(text))
            .collect::<Result<Vec<Bid>, EngineError>>()
            .map_err(to_py_err)?;
        let actions = PlayerMap::from_vec(self.env.player_count(), parsed).map_err(to_py_err)?;
        let result = self.env.step(&actions).map_err(to_py_err)?;
        Ok(unpack(py, result))
    }

    /// Encode a text action as a numeric action vector.
    fn encode<'py>(&self, py: Python<'py>, text: &str) -> PyResult<Bound<'py, PyArray1<f32>>> {
        let registry = self.env.scheduler().registry();
        let action = registry.from_text(text).map_err(to_py_err)?;
        let vector = registry.encode(&action).map_err(to_py_err)?;
        Ok(PyArray1::from_vec_bound(py, vector))
    }

    /// Decode a numeric action vector to its text form.
    fn decode(&self, vector: PyReadonlyArray1<'_, f32>) -> PyResult<String> {
        let slice = vector
            .as_slice()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        let action = self
            .env
            .scheduler()
            .registry()
            .decode(slice)
            .map_err(to_py_err)?;
        Ok(action.to_text())
    }

    /// Flat discrete index of a text action.
    fn action_index(&self, text: &str) -> PyResult<usize> {
        let registry = self.env.scheduler().registry();
        let action = registry.from_text(text).map_err(to_py_err)?;
        registry.to_index(&action).map_err(to_py_err)
    }

    /// Text action at a flat discrete index.
    fn action_at(&self, index: usize) -> PyResult<String> {
        let action = self
            .env
            .scheduler()
            .registry()
            .from_index(index)
            .map_err(to_py_err)?;
        Ok(action.to_text())
    }

    /// Legal ranges of the pending decision in prompt form, e.g. `bet(1->10)`.
    fn legal_actions(&self) -> Vec<String> {
        match self.env.scheduler().decision() {
            Some(decision) if !self.env.is_terminated() => {
                decision.ranges.iter().map(ToString::to_string).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Structured view for one player, as JSON.
    fn observe_json(&self, player: &PyPlayerId) -> PyResult<String> {
        if player.0.index() >= self.env.player_count() {
            return Err(PyValueError::new_err(format!("no seat {}", player.0)));
        }
        serde_json::to_string(&self.env.observe(player.0))
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// Action kind keys in layout order.
    fn action_keys(&self) -> Vec<&'static str> {
        self.env
            .scheduler()
            .registry()
            .kinds()
            .iter()
            .map(|k| k.key)
            .collect()
    }

    #[getter]
    fn observation_size(&self) -> usize {
        self.env.observation_space().width()
    }

    #[getter]
    fn action_size(&self) -> usize {
        self.env.action_space().width()
    }

    #[getter]
    fn number_of_actions(&self) -> usize {
        self.env.scheduler().registry().number_of_actions()
    }

    #[getter]
    fn range_size(&self) -> usize {
        self.env.range_space().width()
    }

    /// Per-element observation bounds `(lows, highs)`.
    fn observation_bounds(&self) -> (Vec<f32>, Vec<f32>) {
        let space = self.env.observation_space();
        (space.lows(), space.highs())
    }

    #[getter]
    fn current_player(&self) -> Option<PyPlayerId> {
        self.env.current_player().map(PyPlayerId)
    }

    #[getter]
    fn player_count(&self) -> usize {
        self.env.player_count()
    }

    #[getter]
    fn is_terminated(&self) -> bool {
        self.env.is_terminated()
    }

    fn __repr__(&self) -> String {
        let current = self
            .env
            .current_player()
            .map_or_else(|| "-".to_string(), |p: PlayerId| p.index().to_string());
        format!(
            "BiddingEnv(players={}, on_turn={}, terminated={})",
            self.env.player_count(),
            current,
            self.env.is_terminated()
        )
    }
}

fn unpack(py: Python<'_>, result: StepResult) -> (Observations<'_>, Vec<f64>, Vec<bool>, Vec<String>) {
    let rewards = result.rewards();
    let terminated = result.terminated();
    let mut observations = Vec::with_capacity(rewards.len());
    let mut diagnostics = Vec::with_capacity(rewards.len());
    for step in result.players.into_vec() {
        observations.push(PyArray1::from_vec_bound(py, step.observation));
        diagnostics.push(serde_json::to_string(&step.diagnostics).unwrap_or_default());
    }
    (observations, rewards, terminated, diagnostics)
}
