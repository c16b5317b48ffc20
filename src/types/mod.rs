//! Shared data types.

pub mod agent;
pub mod message;

pub use agent::{AgentAction, AgentDecision, AgentFinish, AgentStep};
pub use message::{ModelMessage, Role};
