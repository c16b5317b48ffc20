//! Configuration (layered: code > env > config file).

use std::path::{Path, PathBuf};

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::AgentManagerError;
use crate::executor::DEFAULT_MAX_ITERATIONS;

const API_KEY_ENV: &str = "OPENAI_API_KEY";
const MAX_ITERATIONS_ENV: &str = "AGENT_MANAGER_MAX_ITERATIONS";
const TOOLSETS_ENV: &str = "AGENT_MANAGER_TOOLSETS";
const CONFIG_FILE_NAME: &str = "agent-manager.toml";

/// Manager configuration.
///
/// ```toml
/// toolsets = ["terminal", "editor"]
/// max_iterations = 10
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct ManagerConfig {
    /// Toolset names, resolved through a [`ToolsetCatalog`](crate::tools::ToolsetCatalog).
    #[builder(default)]
    pub toolsets: Vec<String>,
    /// Iteration limit for every executor the manager builds.
    #[builder(default = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: usize,
    /// Credential used when `create_executor` is called without one.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Text placed at the top of the agent's system prompt.
    pub agent_prefix: Option<String>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            toolsets: Vec::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            api_key: None,
            agent_prefix: None,
        }
    }
}

impl ManagerConfig {
    /// Defaults overlaid with environment variables (and `.env`, if present).
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, AgentManagerError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AgentManagerError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&raw)?.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// `~/.agent-manager/agent-manager.toml`.
    pub fn default_path() -> PathBuf {
        directories::UserDirs::new()
            .map(|dirs| dirs.home_dir().join(".agent-manager"))
            .unwrap_or_else(|| PathBuf::from(".agent-manager"))
            .join(CONFIG_FILE_NAME)
    }

    /// Apply `OPENAI_API_KEY`, `AGENT_MANAGER_MAX_ITERATIONS` and
    /// `AGENT_MANAGER_TOOLSETS` (comma separated). Unparseable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        let _ = dotenvy::dotenv();

        if let Some(key) = non_empty_env(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(raw) = non_empty_env(MAX_ITERATIONS_ENV) {
            match raw.parse::<usize>() {
                Ok(value) if value > 0 => self.max_iterations = value,
                _ => tracing::warn!(
                    env = MAX_ITERATIONS_ENV,
                    value = %raw,
                    "invalid max iterations; keeping {}",
                    self.max_iterations
                ),
            }
        }
        if let Some(raw) = non_empty_env(TOOLSETS_ENV) {
            self.toolsets = raw
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect();
        }
        self
    }

    pub fn validate(&self) -> Result<(), AgentManagerError> {
        if self.max_iterations == 0 {
            return Err(AgentManagerError::Configuration(
                "max_iterations must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
