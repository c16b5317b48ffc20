//! Tool registry: turns toolsets into concrete tool lists.

use std::sync::Arc;

use super::tool::Tool;
use super::toolset::ToolSet;
use crate::error::AgentManagerError;
use crate::manager::SessionAccessor;

/// Produces the session-scoped part of an executor's tool list.
pub trait ToolsFactory: Send + Sync {
    /// Tools bound to one session. `get_session` resolves the session's
    /// executor lazily, at tool execution time.
    fn create_per_session_tools(
        &self,
        toolsets: &[Arc<dyn ToolSet>],
        get_session: SessionAccessor,
    ) -> Result<Vec<Arc<dyn Tool>>, AgentManagerError>;
}

/// Collects tools straight from each [`ToolSet`], in toolset order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultToolsFactory;

impl DefaultToolsFactory {
    pub fn create_global_tools(toolsets: &[Arc<dyn ToolSet>]) -> Vec<Arc<dyn Tool>> {
        toolsets.iter().flat_map(|set| set.global_tools()).collect()
    }
}

impl ToolsFactory for DefaultToolsFactory {
    fn create_per_session_tools(
        &self,
        toolsets: &[Arc<dyn ToolSet>],
        get_session: SessionAccessor,
    ) -> Result<Vec<Arc<dyn Tool>>, AgentManagerError> {
        Ok(toolsets
            .iter()
            .flat_map(|set| set.session_tools(&get_session))
            .collect())
    }
}
