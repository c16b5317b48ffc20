//! Planning types exchanged between agents, parsers and the executor.

use serde::{Deserialize, Serialize};

/// A request from the agent to invoke a tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentAction {
    pub tool: String,
    pub tool_input: serde_json::Value,
    /// Raw model text the action was parsed from.
    #[serde(default)]
    pub log: String,
}

impl AgentAction {
    pub fn new(tool: impl Into<String>, tool_input: serde_json::Value) -> Self {
        Self {
            tool: tool.into(),
            tool_input,
            log: String::new(),
        }
    }

    pub fn with_log(mut self, log: impl Into<String>) -> Self {
        self.log = log.into();
        self
    }
}

/// The agent's final answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentFinish {
    pub output: String,
    #[serde(default)]
    pub log: String,
}

impl AgentFinish {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            log: String::new(),
        }
    }

    pub fn with_log(mut self, log: impl Into<String>) -> Self {
        self.log = log.into();
        self
    }
}

/// What an agent decided to do next.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentDecision {
    Action(AgentAction),
    Finish(AgentFinish),
}

/// A completed action paired with the tool's observation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentStep {
    pub action: AgentAction,
    pub observation: String,
}
