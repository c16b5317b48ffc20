//! Agent Manager: session-keyed conversation memory and agent executors.
//!
//! Given a session identifier, [`SessionAgentManager`](manager::SessionAgentManager)
//! lazily creates the session's conversation memory, assembles its toolset
//! (global tools plus tools bound to the session's executor), wires the
//! evaluation and execution-tracing callbacks, and returns a ready-to-run
//! [`AgentExecutor`](executor::AgentExecutor).
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use agent_manager::prelude::*;
//!
//! # async fn example(model: Arc<dyn LanguageModel>) -> agent_manager::error::Result<()> {
//! let builders = ReActAgentBuilderFactory::new(model_factory(move |_api_key| Ok(Some(model.clone()))));
//! let manager = SessionAgentManager::create(Vec::new(), Arc::new(builders));
//!
//! let executor = manager.create_executor("session-1", None, None)?;
//! let answer = executor.run("What can you do?").await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod callbacks;
pub mod config;
pub mod error;
pub mod executor;
pub mod llm;
pub mod manager;
pub mod memory;
pub mod parser;
pub mod prelude;
pub mod session;
pub mod tools;
pub mod types;
