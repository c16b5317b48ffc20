//! Evaluation callback: logs the agent's reasoning as it happens.

use std::sync::Arc;

use uuid::Uuid;

use super::CallbackHandler;
use crate::error::AgentManagerError;
use crate::parser::OutputParser;
use crate::types::AgentDecision;

/// Logs thoughts, actions, observations and final answers through `tracing`.
///
/// Model completions are interpreted with the bound [`OutputParser`]; without
/// a parser only the raw completion is logged.
#[derive(Default)]
pub struct EvalCallbackHandler {
    parser: Option<Arc<dyn OutputParser>>,
}

impl EvalCallbackHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parser(&self) -> Option<&Arc<dyn OutputParser>> {
        self.parser.as_ref()
    }
}

impl CallbackHandler for EvalCallbackHandler {
    fn name(&self) -> &str {
        "eval"
    }

    fn set_parser(&mut self, parser: Arc<dyn OutputParser>) {
        self.parser = Some(parser);
    }

    fn on_chain_start(&self, run_id: Uuid, input: &str) {
        tracing::info!(%run_id, input, "agent run started");
    }

    fn on_chain_end(&self, run_id: Uuid, output: &str) {
        tracing::info!(%run_id, output, "agent run finished");
    }

    fn on_chain_error(&self, run_id: Uuid, error: &AgentManagerError) {
        tracing::error!(%run_id, error = %error, "agent run failed");
    }

    fn on_llm_end(&self, text: &str) {
        let Some(parser) = self.parser.as_ref() else {
            tracing::info!(completion = text, "model completion");
            return;
        };
        let thought = parser.thought(text).unwrap_or_default();
        match parser.parse(text) {
            Ok(AgentDecision::Action(action)) => tracing::info!(
                thought,
                tool = %action.tool,
                input = %action.tool_input,
                "agent chose action"
            ),
            Ok(AgentDecision::Finish(finish)) => {
                tracing::info!(thought, answer = %finish.output, "agent reached answer")
            }
            Err(err) => tracing::warn!(error = %err, completion = text, "unparseable completion"),
        }
    }

    fn on_llm_error(&self, error: &AgentManagerError) {
        tracing::error!(error = %error, "model call failed");
    }

    fn on_tool_end(&self, tool: &str, output: &str) {
        tracing::info!(tool, observation = output, "tool returned");
    }

    fn on_tool_error(&self, tool: &str, error: &AgentManagerError) {
        tracing::error!(tool, error = %error, "tool failed");
    }
}
