//! Lifecycle callbacks and the dispatcher that fans them out.
//!
//! Every executor owns one [`CallbackManager`]. The same manager is handed to
//! the model, wrapped around every tool and driven by the executor loop, so a
//! handler sees the whole run: chain start, each model completion, each tool
//! call and the final answer.

pub mod eval;
pub mod execution;

pub use eval::EvalCallbackHandler;
pub use execution::{
    ExecutionHandle, ExecutionState, ExecutionStatus, ExecutionTrace, ExecutionTracingCallbackHandler,
    TraceStep,
};

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::AgentManagerError;
use crate::parser::OutputParser;
use crate::types::{AgentAction, AgentFinish, ModelMessage};

/// Observer of agent lifecycle events. All hooks default to no-ops.
pub trait CallbackHandler: Send + Sync {
    /// Handler name, used in logs and debug output.
    fn name(&self) -> &str;

    /// Bind the parser used to interpret raw model output.
    fn set_parser(&mut self, parser: Arc<dyn OutputParser>) {
        let _ = parser;
    }

    fn on_chain_start(&self, run_id: Uuid, input: &str) {
        let _ = (run_id, input);
    }

    fn on_chain_end(&self, run_id: Uuid, output: &str) {
        let _ = (run_id, output);
    }

    fn on_chain_error(&self, run_id: Uuid, error: &AgentManagerError) {
        let _ = (run_id, error);
    }

    fn on_llm_start(&self, messages: &[ModelMessage]) {
        let _ = messages;
    }

    fn on_llm_end(&self, text: &str) {
        let _ = text;
    }

    fn on_llm_error(&self, error: &AgentManagerError) {
        let _ = error;
    }

    fn on_tool_start(&self, tool: &str, input: &serde_json::Value) {
        let _ = (tool, input);
    }

    fn on_tool_end(&self, tool: &str, output: &str) {
        let _ = (tool, output);
    }

    fn on_tool_error(&self, tool: &str, error: &AgentManagerError) {
        let _ = (tool, error);
    }

    fn on_agent_action(&self, action: &AgentAction) {
        let _ = action;
    }

    fn on_agent_finish(&self, finish: &AgentFinish) {
        let _ = finish;
    }
}

/// Fan-out dispatcher over an ordered list of handlers.
///
/// Cheap to clone; clones share the handler list.
#[derive(Clone, Default)]
pub struct CallbackManager {
    handlers: Arc<Vec<Arc<dyn CallbackHandler>>>,
}

impl CallbackManager {
    pub fn new(handlers: Vec<Arc<dyn CallbackHandler>>) -> Self {
        Self {
            handlers: Arc::new(handlers),
        }
    }

    pub fn handlers(&self) -> &[Arc<dyn CallbackHandler>] {
        &self.handlers
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Whether both managers dispatch to the same handler list.
    pub fn ptr_eq(&self, other: &CallbackManager) -> bool {
        Arc::ptr_eq(&self.handlers, &other.handlers)
    }

    pub fn on_chain_start(&self, run_id: Uuid, input: &str) {
        self.handlers.iter().for_each(|h| h.on_chain_start(run_id, input));
    }

    pub fn on_chain_end(&self, run_id: Uuid, output: &str) {
        self.handlers.iter().for_each(|h| h.on_chain_end(run_id, output));
    }

    pub fn on_chain_error(&self, run_id: Uuid, error: &AgentManagerError) {
        self.handlers.iter().for_each(|h| h.on_chain_error(run_id, error));
    }

    pub fn on_llm_start(&self, messages: &[ModelMessage]) {
        self.handlers.iter().for_each(|h| h.on_llm_start(messages));
    }

    pub fn on_llm_end(&self, text: &str) {
        self.handlers.iter().for_each(|h| h.on_llm_end(text));
    }

    pub fn on_llm_error(&self, error: &AgentManagerError) {
        self.handlers.iter().for_each(|h| h.on_llm_error(error));
    }

    pub fn on_tool_start(&self, tool: &str, input: &serde_json::Value) {
        self.handlers.iter().for_each(|h| h.on_tool_start(tool, input));
    }

    pub fn on_tool_end(&self, tool: &str, output: &str) {
        self.handlers.iter().for_each(|h| h.on_tool_end(tool, output));
    }

    pub fn on_tool_error(&self, tool: &str, error: &AgentManagerError) {
        self.handlers.iter().for_each(|h| h.on_tool_error(tool, error));
    }

    pub fn on_agent_action(&self, action: &AgentAction) {
        self.handlers.iter().for_each(|h| h.on_agent_action(action));
    }

    pub fn on_agent_finish(&self, finish: &AgentFinish) {
        self.handlers.iter().for_each(|h| h.on_agent_finish(finish));
    }
}

impl fmt::Debug for CallbackManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackManager")
            .field(
                "handlers",
                &self.handlers.iter().map(|h| h.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
