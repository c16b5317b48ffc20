//! Agent executor: runs the plan → tool → observation loop for one session.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::agent::{Agent, PlanContext};
use crate::callbacks::CallbackManager;
use crate::error::AgentManagerError;
use crate::memory::SharedMemory;
use crate::tools::{observation_text, Tool, ToolArguments, ToolExecutionContext};
use crate::types::{AgentDecision, AgentStep};

pub const DEFAULT_MAX_ITERATIONS: usize = 15;

/// Runnable unit combining an agent, its tools, a session memory and a
/// callback dispatcher.
pub struct AgentExecutor {
    id: Uuid,
    agent: Option<Arc<dyn Agent>>,
    tools: Vec<Arc<dyn Tool>>,
    memory: SharedMemory,
    callbacks: CallbackManager,
    verbose: bool,
    max_iterations: usize,
}

impl AgentExecutor {
    /// Assemble an executor. Tool names must be unique.
    pub fn from_agent_and_tools(
        agent: Arc<dyn Agent>,
        tools: Vec<Arc<dyn Tool>>,
        memory: SharedMemory,
        callbacks: CallbackManager,
        verbose: bool,
    ) -> Result<Self, AgentManagerError> {
        let mut seen = HashSet::new();
        if let Some(dup) = tools.iter().find(|t| !seen.insert(t.name().to_string())) {
            return Err(AgentManagerError::InvalidValue(format!(
                "Duplicate tool name '{}'",
                dup.name()
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            agent: Some(agent),
            tools,
            memory,
            callbacks,
            verbose,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        })
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Executor without an agent. It must get one via [`attach_agent`](Self::attach_agent)
    /// before [`run`](Self::run).
    pub fn detached(tools: Vec<Arc<dyn Tool>>, memory: SharedMemory, callbacks: CallbackManager, verbose: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent: None,
            tools,
            memory,
            callbacks,
            verbose,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn agent(&self) -> Option<&Arc<dyn Agent>> {
        self.agent.as_ref()
    }

    pub fn attach_agent(&mut self, agent: Arc<dyn Agent>) {
        self.agent = Some(agent);
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn memory(&self) -> &SharedMemory {
        &self.memory
    }

    pub fn callbacks(&self) -> &CallbackManager {
        &self.callbacks
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Run the agent on `input` and record the exchange in memory.
    pub async fn run(&self, input: &str) -> Result<String, AgentManagerError> {
        let run_id = Uuid::new_v4();
        self.callbacks.on_chain_start(run_id, input);

        match self.run_loop(run_id, input).await {
            Ok(output) => {
                self.memory.lock().save_context(input, output.as_str());
                self.callbacks.on_chain_end(run_id, &output);
                Ok(output)
            }
            Err(err) => {
                self.callbacks.on_chain_error(run_id, &err);
                Err(err)
            }
        }
    }

    async fn run_loop(&self, run_id: Uuid, input: &str) -> Result<String, AgentManagerError> {
        let agent = self
            .agent
            .as_ref()
            .ok_or_else(|| AgentManagerError::InvalidState("executor has no agent".into()))?;
        let chat_history = self.memory.messages();
        let tool_ctx = ToolExecutionContext {
            run_id: Some(run_id),
        };
        let mut steps: Vec<AgentStep> = Vec::new();

        for iteration in 0..self.max_iterations {
            let decision = agent
                .plan(PlanContext {
                    input,
                    chat_history: &chat_history,
                    intermediate_steps: &steps,
                    tools: &self.tools,
                })
                .await?;

            let action = match decision {
                AgentDecision::Finish(finish) => {
                    self.callbacks.on_agent_finish(&finish);
                    return Ok(finish.output);
                }
                AgentDecision::Action(action) => action,
            };

            self.callbacks.on_agent_action(&action);
            if self.verbose {
                tracing::info!(%run_id, iteration, tool = %action.tool, input = %action.tool_input, "executing tool");
            }

            let observation = match self.tool(&action.tool) {
                Some(tool) => {
                    let args = ToolArguments::new(action.tool_input.clone());
                    observation_text(&tool.execute(&args, &tool_ctx).await?)
                }
                None => {
                    tracing::debug!(%run_id, tool = %action.tool, "agent requested unknown tool");
                    format!(
                        "{} is not a valid tool, try one of [{}].",
                        action.tool,
                        self.tools.iter().map(|t| t.name()).collect::<Vec<_>>().join(", ")
                    )
                }
            };
            if self.verbose {
                tracing::info!(%run_id, iteration, observation = %observation, "observation");
            }
            steps.push(AgentStep { action, observation });
        }

        tracing::debug!(%run_id, max_iterations = self.max_iterations, "iteration limit reached");
        let finish = agent.return_stopped_response(&steps);
        self.callbacks.on_agent_finish(&finish);
        Ok(finish.output)
    }
}

impl std::fmt::Debug for AgentExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentExecutor")
            .field("id", &self.id)
            .field("has_agent", &self.agent.is_some())
            .field("tools", &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>())
            .field("callbacks", &self.callbacks)
            .field("verbose", &self.verbose)
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}

/// Assembles executors from their parts.
pub trait ExecutorFactory: Send + Sync {
    fn from_agent_and_tools(
        &self,
        agent: Arc<dyn Agent>,
        tools: Vec<Arc<dyn Tool>>,
        memory: SharedMemory,
        callbacks: CallbackManager,
        verbose: bool,
    ) -> Result<AgentExecutor, AgentManagerError>;
}

/// Builds [`AgentExecutor`]s with a fixed iteration limit.
#[derive(Debug, Clone, Copy)]
pub struct DefaultExecutorFactory {
    max_iterations: usize,
}

impl DefaultExecutorFactory {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }
}

impl Default for DefaultExecutorFactory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITERATIONS)
    }
}

impl ExecutorFactory for DefaultExecutorFactory {
    fn from_agent_and_tools(
        &self,
        agent: Arc<dyn Agent>,
        tools: Vec<Arc<dyn Tool>>,
        memory: SharedMemory,
        callbacks: CallbackManager,
        verbose: bool,
    ) -> Result<AgentExecutor, AgentManagerError> {
        Ok(
            AgentExecutor::from_agent_and_tools(agent, tools, memory, callbacks, verbose)?
                .with_max_iterations(self.max_iterations),
        )
    }
}
