//! Execution tracing: mirrors agent progress onto an external execution handle.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use super::CallbackHandler;
use crate::error::AgentManagerError;
use crate::parser::OutputParser;
use crate::types::AgentDecision;

/// Handle on a long-running execution (e.g. a queued job) that wants progress.
pub trait ExecutionHandle: Send + Sync {
    /// Identifier of the execution, used in logs.
    fn id(&self) -> &str;

    /// Receive the latest state. Called after every traced event.
    fn update_state(&self, state: &ExecutionState);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Thinking,
    UsingTool,
    Completed,
    Failed,
}

/// One entry in the execution trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceStep {
    Started { input: String },
    Thought { thought: String },
    Action { tool: String, input: serde_json::Value },
    Observation { tool: String, output: String },
    FinalAnswer { answer: String },
    Error { message: String },
}

/// Ordered trace plus the current status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionTrace {
    pub status: ExecutionStatus,
    pub steps: Vec<TraceStep>,
}

impl Default for ExecutionTrace {
    fn default() -> Self {
        Self {
            status: ExecutionStatus::Pending,
            steps: Vec::new(),
        }
    }
}

/// Snapshot pushed to [`ExecutionHandle::update_state`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionState {
    pub status: ExecutionStatus,
    pub last_step: Option<TraceStep>,
    pub step_count: usize,
    pub updated_at: DateTime<Utc>,
}

/// Records every lifecycle event as a [`TraceStep`] and reports it to the handle.
pub struct ExecutionTracingCallbackHandler {
    execution: Arc<dyn ExecutionHandle>,
    parser: Option<Arc<dyn OutputParser>>,
    trace: Mutex<ExecutionTrace>,
}

impl ExecutionTracingCallbackHandler {
    pub fn new(execution: Arc<dyn ExecutionHandle>) -> Self {
        Self {
            execution,
            parser: None,
            trace: Mutex::new(ExecutionTrace::default()),
        }
    }

    pub fn execution(&self) -> &Arc<dyn ExecutionHandle> {
        &self.execution
    }

    /// Copy of the trace recorded so far.
    pub fn trace(&self) -> ExecutionTrace {
        self.trace
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record(&self, status: ExecutionStatus, step: TraceStep) {
        let state = {
            let mut trace = self
                .trace
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            trace.status = status;
            trace.steps.push(step.clone());
            ExecutionState {
                status,
                last_step: Some(step),
                step_count: trace.steps.len(),
                updated_at: Utc::now(),
            }
        };
        tracing::debug!(execution = self.execution.id(), status = %status, "execution state updated");
        self.execution.update_state(&state);
    }
}

impl CallbackHandler for ExecutionTracingCallbackHandler {
    fn name(&self) -> &str {
        "execution_tracing"
    }

    fn set_parser(&mut self, parser: Arc<dyn OutputParser>) {
        self.parser = Some(parser);
    }

    fn on_chain_start(&self, _run_id: Uuid, input: &str) {
        self.record(
            ExecutionStatus::Running,
            TraceStep::Started {
                input: input.to_string(),
            },
        );
    }

    fn on_chain_end(&self, _run_id: Uuid, output: &str) {
        self.record(
            ExecutionStatus::Completed,
            TraceStep::FinalAnswer {
                answer: output.to_string(),
            },
        );
    }

    fn on_chain_error(&self, _run_id: Uuid, error: &AgentManagerError) {
        self.record(
            ExecutionStatus::Failed,
            TraceStep::Error {
                message: error.to_string(),
            },
        );
    }

    fn on_llm_end(&self, text: &str) {
        let Some(parser) = self.parser.as_ref() else {
            return;
        };
        if let Some(thought) = parser.thought(text) {
            self.record(
                ExecutionStatus::Thinking,
                TraceStep::Thought {
                    thought: thought.to_string(),
                },
            );
        }
        if let Ok(AgentDecision::Action(action)) = parser.parse(text) {
            self.record(
                ExecutionStatus::UsingTool,
                TraceStep::Action {
                    tool: action.tool,
                    input: action.tool_input,
                },
            );
        }
    }

    fn on_tool_end(&self, tool: &str, output: &str) {
        self.record(
            ExecutionStatus::Running,
            TraceStep::Observation {
                tool: tool.to_string(),
                output: output.to_string(),
            },
        );
    }

    fn on_tool_error(&self, tool: &str, error: &AgentManagerError) {
        self.record(
            ExecutionStatus::Running,
            TraceStep::Error {
                message: format!("{tool}: {error}"),
            },
        );
    }
}
