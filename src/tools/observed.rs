//! Tool wrapper reporting every call to a callback dispatcher.

use std::sync::Arc;

use async_trait::async_trait;

use super::arguments::ToolArguments;
use super::tool::{observation_text, Tool, ToolExecutionContext};
use super::types::AgentToolParameters;
use crate::callbacks::CallbackManager;
use crate::error::AgentManagerError;

/// A tool with a [`CallbackManager`] attached.
pub struct ObservedTool {
    inner: Arc<dyn Tool>,
    callbacks: CallbackManager,
}

impl ObservedTool {
    pub fn new(inner: Arc<dyn Tool>, callbacks: CallbackManager) -> Self {
        Self { inner, callbacks }
    }

    pub fn inner(&self) -> &Arc<dyn Tool> {
        &self.inner
    }
}

#[async_trait]
impl Tool for ObservedTool {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn parameters(&self) -> &AgentToolParameters {
        self.inner.parameters()
    }

    fn callbacks(&self) -> Option<&CallbackManager> {
        Some(&self.callbacks)
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, AgentManagerError> {
        let name = self.inner.name();
        self.callbacks.on_tool_start(name, args.raw());
        match self.inner.execute(args, ctx).await {
            Ok(value) => {
                self.callbacks.on_tool_end(name, &observation_text(&value));
                Ok(value)
            }
            Err(err) => {
                self.callbacks.on_tool_error(name, &err);
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for ObservedTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservedTool")
            .field("name", &self.inner.name())
            .field("callbacks", &self.callbacks)
            .finish()
    }
}
