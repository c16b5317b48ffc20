//! Tool parameter schemas.

use serde::{Deserialize, Serialize};

/// JSON Schema describing a tool's input, rendered into agent prompts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentToolParameters {
    pub schema: serde_json::Value,
}

impl AgentToolParameters {
    pub fn from_schema(schema: serde_json::Value) -> Self {
        Self { schema }
    }

    /// A tool that takes a single free-text input.
    pub fn text(description: impl Into<String>) -> Self {
        Self {
            schema: serde_json::json!({
                "type": "string",
                "description": description.into(),
            }),
        }
    }

    pub fn object() -> ParameterBuilder {
        ParameterBuilder::default()
    }
}

/// Builder for object-shaped parameter schemas.
#[derive(Debug, Default)]
pub struct ParameterBuilder {
    properties: serde_json::Map<String, serde_json::Value>,
    required: Vec<String>,
}

impl ParameterBuilder {
    fn property(mut self, name: String, kind: &str, description: String, required: bool) -> Self {
        self.properties.insert(
            name.clone(),
            serde_json::json!({ "type": kind, "description": description }),
        );
        if required {
            self.required.push(name);
        }
        self
    }

    pub fn string(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.property(name.into(), "string", description.into(), required)
    }

    pub fn integer(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.property(name.into(), "integer", description.into(), required)
    }

    pub fn boolean(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.property(name.into(), "boolean", description.into(), required)
    }

    pub fn build(self) -> AgentToolParameters {
        AgentToolParameters {
            schema: serde_json::json!({
                "type": "object",
                "properties": self.properties,
                "required": self.required,
            }),
        }
    }
}
