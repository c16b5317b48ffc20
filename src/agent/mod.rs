//! Agents: decide the next action from the input, history and prior steps.

pub mod builder;

pub use builder::{
    model_factory, AgentBuilder, AgentBuilderFactory, ModelFactoryFn, ReActAgentBuilder,
    ReActAgentBuilderFactory,
};

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentManagerError;
use crate::llm::LanguageModel;
use crate::parser::OutputParser;
use crate::tools::Tool;
use crate::types::{AgentDecision, AgentFinish, AgentStep, ModelMessage};

/// Message returned when the executor runs out of iterations.
pub const STOPPED_RESPONSE: &str = "Agent stopped due to iteration limit or time limit.";

/// Everything an agent sees when planning one step.
#[derive(Clone, Copy)]
pub struct PlanContext<'a> {
    pub input: &'a str,
    pub chat_history: &'a [ModelMessage],
    pub intermediate_steps: &'a [AgentStep],
    pub tools: &'a [Arc<dyn Tool>],
}

#[async_trait]
pub trait Agent: Send + Sync {
    /// Decide the next action, or finish.
    async fn plan(&self, ctx: PlanContext<'_>) -> Result<AgentDecision, AgentManagerError>;

    /// Answer used when the executor stops before the agent finished.
    fn return_stopped_response(&self, steps: &[AgentStep]) -> AgentFinish {
        let _ = steps;
        AgentFinish::new(STOPPED_RESPONSE)
    }
}

const DEFAULT_PREFIX: &str =
    "Assistant is a capable agent that answers questions and completes tasks using tools.";

/// Agent that prompts a [`LanguageModel`] and parses its reply with an [`OutputParser`].
pub struct LlmAgent {
    llm: Arc<dyn LanguageModel>,
    parser: Arc<dyn OutputParser>,
    prefix: String,
}

impl LlmAgent {
    pub fn new(llm: Arc<dyn LanguageModel>, parser: Arc<dyn OutputParser>) -> Self {
        Self {
            llm,
            parser,
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn llm(&self) -> &Arc<dyn LanguageModel> {
        &self.llm
    }

    fn system_prompt(&self, tools: &[Arc<dyn Tool>]) -> String {
        let tool_lines = tools
            .iter()
            .map(|t| format!("> {}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n");
        let tool_names = tools.iter().map(|t| t.name()).collect::<Vec<_>>().join(", ");
        format!(
            "{}\n\nTOOLS\n------\n{tool_lines}\n\nAction must be one of [{tool_names}].\n\n{}",
            self.prefix,
            self.parser.format_instructions()
        )
    }

    /// Previous actions and observations, ending with a prompt for the next thought.
    fn scratchpad(steps: &[AgentStep]) -> String {
        steps
            .iter()
            .map(|step| format!("{}\nObservation: {}\nThought:", step.action.log, step.observation))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn build_messages(&self, ctx: PlanContext<'_>) -> Vec<ModelMessage> {
        let mut messages = Vec::with_capacity(ctx.chat_history.len() + 2);
        messages.push(ModelMessage::system(self.system_prompt(ctx.tools)));
        messages.extend(ctx.chat_history.iter().cloned());

        let scratchpad = Self::scratchpad(ctx.intermediate_steps);
        let user = if scratchpad.is_empty() {
            ctx.input.to_string()
        } else {
            format!("{}\n\n{scratchpad}", ctx.input)
        };
        messages.push(ModelMessage::user(user));
        messages
    }
}

#[async_trait]
impl Agent for LlmAgent {
    async fn plan(&self, ctx: PlanContext<'_>) -> Result<AgentDecision, AgentManagerError> {
        let messages = self.build_messages(ctx);
        let stop = vec!["\nObservation:".to_string()];
        let completion = self.llm.generate(&messages, &stop).await?;
        self.parser.parse(&completion)
    }
}

impl std::fmt::Debug for LlmAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmAgent")
            .field("model", &self.llm.model_name())
            .field("prefix", &self.prefix)
            .finish()
    }
}
