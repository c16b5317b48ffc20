//! Deferred lookup of a session's executor.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, Weak};

use crate::error::AgentManagerError;
use crate::executor::AgentExecutor;
use crate::session::SessionId;

pub(crate) type ExecutorMap = RwLock<HashMap<SessionId, Arc<AgentExecutor>>>;

/// Zero-argument capability returning `(session, executor)` for one session.
///
/// Session tools are created before the executor that will own them exists,
/// so they hold this accessor instead of the executor. Each call reads the
/// manager's live executor map: after a rebuild it yields the new executor.
/// The map is held weakly; an accessor never keeps the manager's executors alive.
#[derive(Clone)]
pub struct SessionAccessor {
    session: SessionId,
    executors: Weak<ExecutorMap>,
}

impl SessionAccessor {
    pub(crate) fn new(session: SessionId, executors: &Arc<ExecutorMap>) -> Self {
        Self {
            session,
            executors: Arc::downgrade(executors),
        }
    }

    /// The session this accessor is bound to. Does not touch the executor map.
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Look up the executor currently registered for the session.
    pub fn get(&self) -> Result<(SessionId, Arc<AgentExecutor>), AgentManagerError> {
        let executors = self
            .executors
            .upgrade()
            .ok_or_else(|| AgentManagerError::InvalidState("agent manager was dropped".into()))?;
        let executor = executors
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&self.session)
            .cloned()
            .ok_or_else(|| AgentManagerError::SessionNotFound(self.session.to_string()))?;
        Ok((self.session.clone(), executor))
    }
}

impl std::fmt::Debug for SessionAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAccessor")
            .field("session", &self.session)
            .finish()
    }
}
