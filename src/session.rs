//! Session identifiers.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AgentManagerError;

/// Validated, non-empty session identifier.
///
/// Conversions accept `&str`, `String` and `&serde_json::Value`; a JSON value
/// that is not a string is a type error, an empty string is a value error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    pub fn new(session: impl Into<String>) -> Result<Self, AgentManagerError> {
        let session = session.into();
        if session.is_empty() {
            return Err(AgentManagerError::InvalidValue("Session is empty".into()));
        }
        Ok(Self(session))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<SessionId> for String {
    fn from(session: SessionId) -> Self {
        session.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = AgentManagerError;

    fn try_from(session: String) -> Result<Self, Self::Error> {
        Self::new(session)
    }
}

impl TryFrom<&str> for SessionId {
    type Error = AgentManagerError;

    fn try_from(session: &str) -> Result<Self, Self::Error> {
        Self::new(session)
    }
}

impl TryFrom<&String> for SessionId {
    type Error = AgentManagerError;

    fn try_from(session: &String) -> Result<Self, Self::Error> {
        Self::new(session.as_str())
    }
}

impl TryFrom<&SessionId> for SessionId {
    type Error = AgentManagerError;

    fn try_from(session: &SessionId) -> Result<Self, Self::Error> {
        Ok(session.clone())
    }
}

impl TryFrom<&serde_json::Value> for SessionId {
    type Error = AgentManagerError;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::String(session) => Self::new(session.as_str()),
            _ => Err(AgentManagerError::InvalidType(
                "Session must be a string".into(),
            )),
        }
    }
}
