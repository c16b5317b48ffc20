//! Toolsets: named groups of tools supplied to the manager.

use std::collections::HashMap;
use std::sync::Arc;

use super::tool::Tool;
use crate::error::AgentManagerError;
use crate::manager::SessionAccessor;

/// A named group of tools.
///
/// Global tools are shared by every session. Session tools are created per
/// executor build and may use the [`SessionAccessor`] to reach the executor
/// they end up attached to.
pub trait ToolSet: Send + Sync {
    fn name(&self) -> &str;

    fn global_tools(&self) -> Vec<Arc<dyn Tool>>;

    fn session_tools(&self, session: &SessionAccessor) -> Vec<Arc<dyn Tool>> {
        let _ = session;
        Vec::new()
    }
}

/// Registry mapping toolset names to instances, used to resolve configuration.
#[derive(Default)]
pub struct ToolsetCatalog {
    toolsets: HashMap<String, Arc<dyn ToolSet>>,
}

impl ToolsetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, toolset: Arc<dyn ToolSet>) {
        self.toolsets.insert(toolset.name().to_string(), toolset);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolSet>> {
        self.toolsets.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.toolsets.keys().map(|s| s.as_str()).collect()
    }

    /// Resolve toolset names in order.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Arc<dyn ToolSet>>, AgentManagerError> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.get(name).cloned().ok_or_else(|| {
                    AgentManagerError::Configuration(format!("Unknown toolset '{name}'"))
                })
            })
            .collect()
    }

    /// Resolve an untyped toolset list. The value must be an array of names.
    pub fn resolve_value(
        &self,
        value: &serde_json::Value,
    ) -> Result<Vec<Arc<dyn ToolSet>>, AgentManagerError> {
        let items = value
            .as_array()
            .ok_or_else(|| AgentManagerError::InvalidType("Toolsets must be a list".into()))?;
        let names = items
            .iter()
            .map(|item| {
                item.as_str().ok_or_else(|| {
                    AgentManagerError::InvalidType(format!("Toolset name must be a string, got {item}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.resolve(names.as_slice())
    }
}

impl std::fmt::Debug for ToolsetCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names = self.names();
        names.sort_unstable();
        f.debug_struct("ToolsetCatalog").field("toolsets", &names).finish()
    }
}

impl std::fmt::Debug for dyn ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSet").field("name", &self.name()).finish()
    }
}
