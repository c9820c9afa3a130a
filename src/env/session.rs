//! Caller-owned collection of live environments.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::environment::Environment;
use crate::scheduler::GameModel;

/// Handle of one live environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Session errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session capacity ({0}) exceeded")]
    CapacityExceeded(usize),
    #[error("{0} not found")]
    NotFound(SessionId),
}

/// Live environments keyed by [`SessionId`], with a capacity limit.
///
/// Ids are never reused within one collection.
pub struct Sessions<G: GameModel> {
    sessions: FxHashMap<SessionId, Environment<G>>,
    capacity: usize,
    next_id: u64,
}

impl<G: GameModel> Sessions<G> {
    /// Create an empty collection holding at most `capacity` environments.
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: FxHashMap::default(),
            capacity,
            next_id: 0,
        }
    }

    /// Take ownership of an environment.
    pub fn open(&mut self, env: Environment<G>) -> Result<SessionId, SessionError> {
        if self.sessions.len() >= self.capacity {
            return Err(SessionError::CapacityExceeded(self.capacity));
        }
        let id = SessionId(self.next_id);
        self.next_id += 1;
        self.sessions.insert(id, env);
        info!(session = %id, live = self.sessions.len(), "session opened");
        Ok(id)
    }

    /// Drop an environment and hand it back.
    pub fn close(&mut self, id: SessionId) -> Result<Environment<G>, SessionError> {
        let env = self.sessions.remove(&id).ok_or(SessionError::NotFound(id))?;
        info!(session = %id, live = self.sessions.len(), "session closed");
        Ok(env)
    }

    /// Get an environment
    pub fn get(&self, id: SessionId) -> Result<&Environment<G>, SessionError> {
        self.sessions.get(&id).ok_or(SessionError::NotFound(id))
    }

    /// Get a mutable environment
    pub fn get_mut(&mut self, id: SessionId) -> Result<&mut Environment<G>, SessionError> {
        self.sessions.get_mut(&id).ok_or(SessionError::NotFound(id))
    }

    /// Live session ids, sorted.
    pub fn ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = self.sessions.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EnvConfig;
    use crate::games::bidding::{BiddingGame, BiddingGameBuilder};

    fn env(seed: u64) -> Environment<BiddingGame> {
        let game = BiddingGameBuilder::new().build().unwrap();
        Environment::new(game, EnvConfig::default(), seed).unwrap()
    }

    #[test]
    fn test_open_and_close() {
        let mut sessions = Sessions::new(4);
        let a = sessions.open(env(1)).unwrap();
        let b = sessions.open(env(2)).unwrap();
        assert_ne!(a, b);
        assert_eq!(sessions.ids(), vec![a, b]);

        sessions.get_mut(a).unwrap().reset().unwrap();
        assert!(sessions.close(a).is_ok());
        assert_eq!(sessions.len(), 1);
        assert!(matches!(sessions.get(a), Err(SessionError::NotFound(id)) if id == a));
    }

    #[test]
    fn test_capacity() {
        let mut sessions = Sessions::new(1);
        let first = sessions.open(env(1)).unwrap();
        assert_eq!(
            sessions.open(env(2)).err(),
            Some(SessionError::CapacityExceeded(1))
        );

        sessions.close(first).unwrap();
        let second = sessions.open(env(3)).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_close_unknown() {
        let mut sessions: Sessions<BiddingGame> = Sessions::new(2);
        assert!(matches!(
            sessions.close(SessionId(9)),
            Err(SessionError::NotFound(SessionId(9)))
        ));
        assert!(sessions.is_empty());
    }
}
