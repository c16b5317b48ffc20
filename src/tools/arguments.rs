//! Typed access to tool inputs.

use crate::error::AgentManagerError;

/// Tool input as produced by the output parser: either a JSON object or plain text.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.value
    }

    /// Input as text: plain-text inputs verbatim, structured inputs as JSON.
    pub fn as_text(&self) -> String {
        match &self.value {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }

    pub fn get_str(&self, key: &str) -> Result<&str, AgentManagerError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| missing("string", key))
    }

    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    pub fn get_i64(&self, key: &str) -> Result<i64, AgentManagerError> {
        self.value
            .get(key)
            .and_then(|v| v.as_i64())
            .ok_or_else(|| missing("integer", key))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, AgentManagerError> {
        self.value
            .get(key)
            .and_then(|v| v.as_bool())
            .ok_or_else(|| missing("boolean", key))
    }

    /// Deserialize into a typed struct. Plain-text input is parsed as JSON first.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, AgentManagerError> {
        let value = match &self.value {
            serde_json::Value::String(raw) => serde_json::from_str(raw.trim()).map_err(|e| {
                AgentManagerError::InvalidArgument(format!("tool input is not JSON: {e}"))
            })?,
            other => other.clone(),
        };
        serde_json::from_value(value).map_err(|e| {
            AgentManagerError::InvalidArgument(format!("failed to deserialize tool input: {e}"))
        })
    }
}

fn missing(kind: &str, key: &str) -> AgentManagerError {
    AgentManagerError::InvalidArgument(format!("missing {kind} argument: {key}"))
}
