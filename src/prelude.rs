//! Convenience re-exports for common use.

pub use crate::agent::{
    model_factory, Agent, AgentBuilder, AgentBuilderFactory, LlmAgent, ReActAgentBuilderFactory,
};
pub use crate::callbacks::{CallbackHandler, CallbackManager, ExecutionHandle, ExecutionState};
pub use crate::config::ManagerConfig;
pub use crate::error::{AgentManagerError, ErrorCategory, Result};
pub use crate::executor::{AgentExecutor, ExecutorFactory};
pub use crate::llm::LanguageModel;
pub use crate::manager::{SessionAccessor, SessionAgentManager};
pub use crate::memory::{ConversationMemory, SharedMemory};
pub use crate::parser::{OutputParser, ReActOutputParser};
pub use crate::session::SessionId;
pub use crate::tools::{AgentTool, AgentToolParameters, Tool, ToolArguments, ToolSet, ToolsFactory};
pub use crate::types::{AgentAction, AgentDecision, AgentFinish, ModelMessage, Role};
