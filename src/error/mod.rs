//! Error types for the agent manager.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for all agent manager operations.
#[derive(Error, Debug)]
pub enum AgentManagerError {
    /// An argument had the wrong type (e.g. a session that is not a string).
    #[error("Invalid type: {0}")]
    InvalidType(String),

    /// An argument or a build step produced an empty or missing value.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Output parse error: {0}")]
    OutputParse(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Any error raised by a builder, model, tool registry or executor factory.
    #[error(transparent)]
    Collaborator(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl AgentManagerError {
    /// Wrap an arbitrary collaborator error without changing its message.
    pub fn collaborator<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Collaborator(Box::new(err))
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidType(_) => ErrorCategory::TypeCondition,
            Self::InvalidValue(_) => ErrorCategory::ValueCondition,
            _ => ErrorCategory::Passthrough,
        }
    }

    /// Whether the error was caused by caller input rather than a collaborator.
    pub fn is_validation(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::TypeCondition | ErrorCategory::ValueCondition
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            Self::InvalidType(_) | Self::InvalidValue(_) | Self::InvalidArgument(_) => {
                RecoverySuggestion::FixInput
            }
            Self::Configuration(_) | Self::ConfigParse(_) => RecoverySuggestion::CheckConfiguration,
            Self::ToolExecution { .. } => RecoverySuggestion::CheckToolImplementation,
            _ => RecoverySuggestion::CheckCollaborator,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AgentManagerError>;
