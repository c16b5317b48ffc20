//! Language model abstraction.

use std::sync::Arc;

use async_trait::async_trait;

use crate::callbacks::CallbackManager;
use crate::error::AgentManagerError;
use crate::types::ModelMessage;

/// A chat-completion model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier, e.g. `gpt-4o`.
    fn model_name(&self) -> &str;

    /// Complete the conversation, stopping at any of `stop`.
    async fn generate(
        &self,
        messages: &[ModelMessage],
        stop: &[String],
    ) -> Result<String, AgentManagerError>;
}

/// Wraps a model so every call is reported to a [`CallbackManager`].
pub struct ObservedModel {
    inner: Arc<dyn LanguageModel>,
    callbacks: CallbackManager,
}

impl ObservedModel {
    pub fn new(inner: Arc<dyn LanguageModel>, callbacks: CallbackManager) -> Self {
        Self { inner, callbacks }
    }

    pub fn callbacks(&self) -> &CallbackManager {
        &self.callbacks
    }
}

#[async_trait]
impl LanguageModel for ObservedModel {
    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    async fn generate(
        &self,
        messages: &[ModelMessage],
        stop: &[String],
    ) -> Result<String, AgentManagerError> {
        self.callbacks.on_llm_start(messages);
        match self.inner.generate(messages, stop).await {
            Ok(text) => {
                self.callbacks.on_llm_end(&text);
                Ok(text)
            }
            Err(err) => {
                self.callbacks.on_llm_error(&err);
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for ObservedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservedModel")
            .field("model", &self.inner.model_name())
            .field("callbacks", &self.callbacks)
            .finish()
    }
}
