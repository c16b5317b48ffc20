//! Tool system: the [`Tool`] trait, toolsets and the per-session tool registry.

pub mod arguments;
pub mod factory;
pub mod observed;
pub mod tool;
pub mod toolset;
pub mod types;

pub use arguments::ToolArguments;
pub use factory::{DefaultToolsFactory, ToolsFactory};
pub use observed::ObservedTool;
pub use tool::{observation_text, AgentTool, Tool, ToolExecutionContext};
pub use toolset::{ToolSet, ToolsetCatalog};
pub use types::AgentToolParameters;
