//! Tool trait and closure-based tool wrapper.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use uuid::Uuid;

use super::arguments::ToolArguments;
use super::types::AgentToolParameters;
use crate::callbacks::CallbackManager;
use crate::error::AgentManagerError;

/// Context passed to a tool for one invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolExecutionContext {
    /// Executor run the call belongs to.
    pub run_id: Option<Uuid>,
}

/// A capability the agent can invoke by name.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses in `Action:` lines.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters(&self) -> &AgentToolParameters;

    /// Dispatcher attached to this tool, if any.
    fn callbacks(&self) -> Option<&CallbackManager> {
        None
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, AgentManagerError>;
}

type ToolHandler = dyn Fn(ToolArguments, ToolExecutionContext) -> BoxFuture<'static, Result<serde_json::Value, AgentManagerError>>
    + Send
    + Sync;

/// Tool backed by an async closure.
pub struct AgentTool {
    name: String,
    description: String,
    parameters: AgentToolParameters,
    handler: Arc<ToolHandler>,
}

impl AgentTool {
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: AgentToolParameters,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, AgentManagerError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler: Arc::new(move |args, ctx| Box::pin(handler(args, ctx))),
        }
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, AgentManagerError> {
        (self.handler)(args.clone(), ctx.clone()).await
    }
}

impl std::fmt::Debug for AgentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

/// Render a tool's output as the observation string fed back to the agent.
pub fn observation_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
