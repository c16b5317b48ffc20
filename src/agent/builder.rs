//! Builders assemble the parser, model, global tools and agent for one executor.

use std::sync::Arc;

use super::{Agent, LlmAgent};
use crate::callbacks::CallbackManager;
use crate::error::AgentManagerError;
use crate::llm::{LanguageModel, ObservedModel};
use crate::parser::{OutputParser, ReActOutputParser};
use crate::tools::{DefaultToolsFactory, Tool, ToolSet};

/// Staged construction of everything an executor needs except memory and
/// session tools.
///
/// The manager drives the stages in order: parser, model, global tools, agent.
/// A stage that produced nothing is reported through the `Option` getters.
pub trait AgentBuilder: Send {
    fn build_parser(&mut self) -> Result<(), AgentManagerError>;

    fn parser(&self) -> Option<Arc<dyn OutputParser>>;

    /// Build the model, reporting its calls to `callbacks`.
    fn build_llm(
        &mut self,
        callbacks: CallbackManager,
        api_key: Option<&str>,
    ) -> Result<(), AgentManagerError>;

    fn llm(&self) -> Option<Arc<dyn LanguageModel>>;

    fn build_global_tools(&mut self) -> Result<(), AgentManagerError>;

    fn global_tools(&self) -> Vec<Arc<dyn Tool>>;

    /// Build (or return the already built) agent.
    fn agent(&mut self) -> Result<Option<Arc<dyn Agent>>, AgentManagerError>;
}

/// Creates a fresh [`AgentBuilder`] for every executor build.
pub trait AgentBuilderFactory: Send + Sync {
    fn create_builder(&self, toolsets: &[Arc<dyn ToolSet>]) -> Box<dyn AgentBuilder>;
}

impl<F> AgentBuilderFactory for F
where
    F: Fn(&[Arc<dyn ToolSet>]) -> Box<dyn AgentBuilder> + Send + Sync,
{
    fn create_builder(&self, toolsets: &[Arc<dyn ToolSet>]) -> Box<dyn AgentBuilder> {
        self(toolsets)
    }
}

/// Resolves a model for an optional API key. `Ok(None)` means no model is available.
pub type ModelFactoryFn = Arc<
    dyn Fn(Option<&str>) -> Result<Option<Arc<dyn LanguageModel>>, AgentManagerError> + Send + Sync,
>;

/// Wrap a closure as a [`ModelFactoryFn`].
pub fn model_factory<F>(f: F) -> ModelFactoryFn
where
    F: Fn(Option<&str>) -> Result<Option<Arc<dyn LanguageModel>>, AgentManagerError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// Builder producing an [`LlmAgent`] with a [`ReActOutputParser`].
pub struct ReActAgentBuilder {
    toolsets: Vec<Arc<dyn ToolSet>>,
    model_factory: ModelFactoryFn,
    prefix: Option<String>,
    parser: Option<Arc<dyn OutputParser>>,
    llm: Option<Arc<dyn LanguageModel>>,
    global_tools: Vec<Arc<dyn Tool>>,
    agent: Option<Arc<dyn Agent>>,
}

impl ReActAgentBuilder {
    pub fn new(toolsets: Vec<Arc<dyn ToolSet>>, model_factory: ModelFactoryFn) -> Self {
        Self {
            toolsets,
            model_factory,
            prefix: None,
            parser: None,
            llm: None,
            global_tools: Vec::new(),
            agent: None,
        }
    }

    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }
}

impl AgentBuilder for ReActAgentBuilder {
    fn build_parser(&mut self) -> Result<(), AgentManagerError> {
        self.parser = Some(Arc::new(ReActOutputParser::new()));
        Ok(())
    }

    fn parser(&self) -> Option<Arc<dyn OutputParser>> {
        self.parser.clone()
    }

    fn build_llm(
        &mut self,
        callbacks: CallbackManager,
        api_key: Option<&str>,
    ) -> Result<(), AgentManagerError> {
        self.llm = (self.model_factory)(api_key)?
            .map(|model| Arc::new(ObservedModel::new(model, callbacks)) as Arc<dyn LanguageModel>);
        Ok(())
    }

    fn llm(&self) -> Option<Arc<dyn LanguageModel>> {
        self.llm.clone()
    }

    fn build_global_tools(&mut self) -> Result<(), AgentManagerError> {
        self.global_tools = DefaultToolsFactory::create_global_tools(&self.toolsets);
        Ok(())
    }

    fn global_tools(&self) -> Vec<Arc<dyn Tool>> {
        self.global_tools.clone()
    }

    fn agent(&mut self) -> Result<Option<Arc<dyn Agent>>, AgentManagerError> {
        if self.agent.is_none() {
            let (Some(llm), Some(parser)) = (self.llm.clone(), self.parser.clone()) else {
                return Ok(None);
            };
            let mut agent = LlmAgent::new(llm, parser);
            if let Some(prefix) = &self.prefix {
                agent = agent.with_prefix(prefix.clone());
            }
            self.agent = Some(Arc::new(agent));
        }
        Ok(self.agent.clone())
    }
}

/// [`AgentBuilderFactory`] for [`ReActAgentBuilder`].
#[derive(Clone)]
pub struct ReActAgentBuilderFactory {
    model_factory: ModelFactoryFn,
    prefix: Option<String>,
}

impl ReActAgentBuilderFactory {
    pub fn new(model_factory: ModelFactoryFn) -> Self {
        Self {
            model_factory,
            prefix: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

impl AgentBuilderFactory for ReActAgentBuilderFactory {
    fn create_builder(&self, toolsets: &[Arc<dyn ToolSet>]) -> Box<dyn AgentBuilder> {
        Box::new(
            ReActAgentBuilder::new(toolsets.to_vec(), self.model_factory.clone())
                .with_prefix(self.prefix.clone()),
        )
    }
}
