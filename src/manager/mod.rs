//! Session-keyed memory and executor management.
//!
//! [`SessionAgentManager`] owns two stores: session → memory and
//! session → executor. Memory is created once per session and survives
//! executor rebuilds; every [`create_executor`](SessionAgentManager::create_executor)
//! call builds a new executor and replaces the stored one.
//!
//! Builds for the same session are not serialized. Callers that rebuild one
//! session from several tasks must serialize those calls themselves; otherwise
//! the last build wins and session tools may briefly see the previous executor.

mod accessor;

pub use accessor::SessionAccessor;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::agent::{AgentBuilderFactory, ModelFactoryFn, ReActAgentBuilderFactory};
use crate::callbacks::{
    CallbackHandler, CallbackManager, EvalCallbackHandler, ExecutionHandle,
    ExecutionTracingCallbackHandler,
};
use crate::config::ManagerConfig;
use crate::error::AgentManagerError;
use crate::executor::{AgentExecutor, DefaultExecutorFactory, ExecutorFactory};
use crate::memory::{ConversationMemory, SharedMemory, DEFAULT_MEMORY_KEY};
use crate::session::SessionId;
use crate::tools::{
    DefaultToolsFactory, ObservedTool, Tool, ToolSet, ToolsFactory, ToolsetCatalog,
};

use accessor::ExecutorMap;

/// Owns per-session memories and executors and builds executors on demand.
pub struct SessionAgentManager {
    toolsets: Vec<Arc<dyn ToolSet>>,
    builder_factory: Arc<dyn AgentBuilderFactory>,
    tools_factory: Arc<dyn ToolsFactory>,
    executor_factory: Arc<dyn ExecutorFactory>,
    default_api_key: Option<String>,
    memories: RwLock<HashMap<SessionId, SharedMemory>>,
    executors: Arc<ExecutorMap>,
}

impl SessionAgentManager {
    /// Create a manager over `toolsets`, building agents with `builder_factory`.
    pub fn new(toolsets: Vec<Arc<dyn ToolSet>>, builder_factory: Arc<dyn AgentBuilderFactory>) -> Self {
        Self {
            toolsets,
            builder_factory,
            tools_factory: Arc::new(DefaultToolsFactory),
            executor_factory: Arc::new(DefaultExecutorFactory::default()),
            default_api_key: None,
            memories: RwLock::new(HashMap::new()),
            executors: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Same as [`SessionAgentManager::new`].
    pub fn create(toolsets: Vec<Arc<dyn ToolSet>>, builder_factory: Arc<dyn AgentBuilderFactory>) -> Self {
        Self::new(toolsets, builder_factory)
    }

    /// Create a manager from an untyped toolset list (an array of toolset names).
    pub fn from_value(
        toolsets: &serde_json::Value,
        catalog: &ToolsetCatalog,
        builder_factory: Arc<dyn AgentBuilderFactory>,
    ) -> Result<Self, AgentManagerError> {
        Ok(Self::new(catalog.resolve_value(toolsets)?, builder_factory))
    }

    /// Create a manager wired from configuration: toolsets resolved through
    /// `catalog`, a ReAct agent over models from `model_factory`, and the
    /// configured iteration limit and fallback API key.
    pub fn from_config(
        config: &ManagerConfig,
        catalog: &ToolsetCatalog,
        model_factory: ModelFactoryFn,
    ) -> Result<Self, AgentManagerError> {
        config.validate()?;
        let mut builder_factory = ReActAgentBuilderFactory::new(model_factory);
        if let Some(prefix) = &config.agent_prefix {
            builder_factory = builder_factory.with_prefix(prefix.clone());
        }
        let mut manager = Self::new(catalog.resolve(config.toolsets.as_slice())?, Arc::new(builder_factory))
            .with_executor_factory(Arc::new(DefaultExecutorFactory::new(config.max_iterations)));
        manager.default_api_key = config.api_key.clone();
        Ok(manager)
    }

    pub fn with_tools_factory(mut self, tools_factory: Arc<dyn ToolsFactory>) -> Self {
        self.tools_factory = tools_factory;
        self
    }

    pub fn with_executor_factory(mut self, executor_factory: Arc<dyn ExecutorFactory>) -> Self {
        self.executor_factory = executor_factory;
        self
    }

    /// API key used when [`create_executor`](Self::create_executor) gets none.
    pub fn with_default_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.default_api_key = Some(api_key.into());
        self
    }

    pub fn toolsets(&self) -> &[Arc<dyn ToolSet>] {
        &self.toolsets
    }

    /// A new, empty memory keeping full history under `chat_history`.
    pub fn create_memory(&self) -> SharedMemory {
        SharedMemory::new(ConversationMemory::new(DEFAULT_MEMORY_KEY, true))
    }

    /// Return the session's memory, creating it on first use.
    pub fn get_or_create_memory<S>(&self, session: S) -> Result<SharedMemory, AgentManagerError>
    where
        S: TryInto<SessionId, Error = AgentManagerError>,
    {
        let session = session.try_into()?;
        if let Some(memory) = self.read_memories().get(&session) {
            return Ok(memory.clone());
        }

        let mut memories = self
            .memories
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let memory = memories.entry(session).or_insert_with_key(|session| {
            tracing::debug!(session = %session, "creating conversation memory");
            self.create_memory()
        });
        Ok(memory.clone())
    }

    /// Build a new executor for `session`, replacing any previous one.
    ///
    /// `execution` adds execution tracing to the callback chain. `api_key` is
    /// handed to the builder; without one the manager's default key is used.
    /// Failures are logged and returned unchanged; a memory created during a
    /// failed build is kept.
    pub fn create_executor<S>(
        &self,
        session: S,
        execution: Option<Arc<dyn ExecutionHandle>>,
        api_key: Option<&str>,
    ) -> Result<Arc<AgentExecutor>, AgentManagerError>
    where
        S: TryInto<SessionId, Error = AgentManagerError>,
    {
        self.build_executor(session, execution, api_key)
            .inspect_err(|err| tracing::error!(error = %err, "Error while creating executor: {err}"))
    }

    fn build_executor<S>(
        &self,
        session: S,
        execution: Option<Arc<dyn ExecutionHandle>>,
        api_key: Option<&str>,
    ) -> Result<Arc<AgentExecutor>, AgentManagerError>
    where
        S: TryInto<SessionId, Error = AgentManagerError>,
    {
        let mut builder = self.builder_factory.create_builder(&self.toolsets);
        builder.build_parser()?;
        let parser = builder.parser();

        let mut handlers: Vec<Arc<dyn CallbackHandler>> = Vec::with_capacity(2);
        let mut eval = EvalCallbackHandler::new();
        if let Some(parser) = &parser {
            eval.set_parser(parser.clone());
        }
        handlers.push(Arc::new(eval));
        if let Some(execution) = execution {
            let mut tracing_handler = ExecutionTracingCallbackHandler::new(execution);
            if let Some(parser) = &parser {
                tracing_handler.set_parser(parser.clone());
            }
            handlers.push(Arc::new(tracing_handler));
        }
        let callbacks = CallbackManager::new(handlers);

        let api_key = api_key.or(self.default_api_key.as_deref());
        builder.build_llm(callbacks.clone(), api_key)?;
        if builder.llm().is_none() {
            return Err(AgentManagerError::InvalidValue("LLM not created".into()));
        }

        builder.build_global_tools()?;

        let agent = builder
            .agent()?
            .ok_or_else(|| AgentManagerError::InvalidValue("Agent not created".into()))?;

        let session: SessionId = session.try_into()?;
        let memory = self.get_or_create_memory(&session)?;

        let accessor = SessionAccessor::new(session.clone(), &self.executors);
        let tools: Vec<Arc<dyn Tool>> = builder
            .global_tools()
            .into_iter()
            .chain(
                self.tools_factory
                    .create_per_session_tools(&self.toolsets, accessor)?,
            )
            .map(|tool| Arc::new(ObservedTool::new(tool, callbacks.clone())) as Arc<dyn Tool>)
            .collect();

        let mut executor = self.executor_factory.from_agent_and_tools(
            agent.clone(),
            tools,
            memory,
            callbacks,
            true,
        )?;
        if executor.agent().is_none() {
            executor.attach_agent(agent);
        }

        let executor = Arc::new(executor);
        tracing::debug!(
            session = %session,
            executor = %executor.id(),
            tools = executor.tools().len(),
            "executor created"
        );
        self.executors
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(session, executor.clone());
        Ok(executor)
    }

    /// The session's memory, if it exists.
    pub fn memory(&self, session: &str) -> Option<SharedMemory> {
        self.read_memories().get(session).cloned()
    }

    /// The executor currently registered for the session.
    pub fn executor(&self, session: &str) -> Option<Arc<AgentExecutor>> {
        self.read_executors().get(session).cloned()
    }

    /// Sessions that have a memory, sorted.
    pub fn session_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.read_memories().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Drop the session's memory and executor. Returns whether anything was removed.
    pub fn remove_session(&self, session: &str) -> bool {
        let memory = self
            .memories
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(session);
        let executor = self
            .executors
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(session);
        memory.is_some() || executor.is_some()
    }

    fn read_memories(&self) -> std::sync::RwLockReadGuard<'_, HashMap<SessionId, SharedMemory>> {
        self.memories
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_executors(&self) -> std::sync::RwLockReadGuard<'_, HashMap<SessionId, Arc<AgentExecutor>>> {
        self.executors
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for SessionAgentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAgentManager")
            .field("toolsets", &self.toolsets.iter().map(|t| t.name()).collect::<Vec<_>>())
            .field("sessions", &self.session_ids())
            .finish()
    }
}
