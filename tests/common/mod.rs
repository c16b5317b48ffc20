//! Shared stubs: scripted model, configurable builder, toolsets and log capture.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use agent_manager::agent::{Agent, AgentBuilder, AgentBuilderFactory, LlmAgent};
use agent_manager::callbacks::{CallbackManager, ExecutionHandle, ExecutionState};
use agent_manager::error::AgentManagerError;
use agent_manager::llm::{LanguageModel, ObservedModel};
use agent_manager::manager::SessionAccessor;
use agent_manager::parser::{OutputParser, ReActOutputParser};
use agent_manager::tools::{AgentTool, AgentToolParameters, Tool, ToolSet};
use agent_manager::types::ModelMessage;

/// Model replying with queued completions, then `Final Answer: done`.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    pub prompts: Mutex<Vec<Vec<ModelMessage>>>,
}

impl ScriptedModel {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        messages: &[ModelMessage],
        _stop: &[String],
    ) -> Result<String, AgentManagerError> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "Final Answer: done".to_string()))
    }
}

/// What the stub builder should produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuilderMode {
    Complete,
    NoLlm,
    NoAgent,
    FailingParser,
}

/// Calls and arguments observed by every builder a [`StubBuilderFactory`] created.
#[derive(Default)]
pub struct BuilderLog {
    pub calls: Mutex<Vec<&'static str>>,
    pub llm_callbacks: Mutex<Vec<CallbackManager>>,
    pub api_keys: Mutex<Vec<Option<String>>>,
}

impl BuilderLog {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_llm_callbacks(&self) -> CallbackManager {
        self.llm_callbacks
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("build_llm was called")
    }

    pub fn api_keys(&self) -> Vec<Option<String>> {
        self.api_keys.lock().unwrap().clone()
    }
}

pub struct StubBuilder {
    mode: BuilderMode,
    model: Arc<ScriptedModel>,
    toolsets: Vec<Arc<dyn ToolSet>>,
    log: Arc<BuilderLog>,
    parser: Option<Arc<dyn OutputParser>>,
    llm: Option<Arc<dyn LanguageModel>>,
    global_tools: Vec<Arc<dyn Tool>>,
}

impl AgentBuilder for StubBuilder {
    fn build_parser(&mut self) -> Result<(), AgentManagerError> {
        self.log.calls.lock().unwrap().push("build_parser");
        if self.mode == BuilderMode::FailingParser {
            return Err(AgentManagerError::collaborator(io::Error::new(
                io::ErrorKind::Other,
                "parser template missing",
            )));
        }
        self.parser = Some(Arc::new(ReActOutputParser));
        Ok(())
    }

    fn parser(&self) -> Option<Arc<dyn OutputParser>> {
        self.parser.clone()
    }

    fn build_llm(
        &mut self,
        callbacks: CallbackManager,
        api_key: Option<&str>,
    ) -> Result<(), AgentManagerError> {
        self.log.calls.lock().unwrap().push("build_llm");
        self.log.llm_callbacks.lock().unwrap().push(callbacks.clone());
        self.log
            .api_keys
            .lock()
            .unwrap()
            .push(api_key.map(str::to_string));
        if self.mode != BuilderMode::NoLlm {
            self.llm = Some(Arc::new(ObservedModel::new(self.model.clone(), callbacks)));
        }
        Ok(())
    }

    fn llm(&self) -> Option<Arc<dyn LanguageModel>> {
        self.llm.clone()
    }

    fn build_global_tools(&mut self) -> Result<(), AgentManagerError> {
        self.log.calls.lock().unwrap().push("build_global_tools");
        self.global_tools = self
            .toolsets
            .iter()
            .flat_map(|set| set.global_tools())
            .collect();
        Ok(())
    }

    fn global_tools(&self) -> Vec<Arc<dyn Tool>> {
        self.global_tools.clone()
    }

    fn agent(&mut self) -> Result<Option<Arc<dyn Agent>>, AgentManagerError> {
        self.log.calls.lock().unwrap().push("agent");
        if self.mode == BuilderMode::NoAgent {
            return Ok(None);
        }
        match (self.llm.clone(), self.parser.clone()) {
            (Some(llm), Some(parser)) => Ok(Some(Arc::new(LlmAgent::new(llm, parser)))),
            _ => Ok(None),
        }
    }
}

pub struct StubBuilderFactory {
    pub mode: BuilderMode,
    pub model: Arc<ScriptedModel>,
    pub log: Arc<BuilderLog>,
}

impl StubBuilderFactory {
    pub fn new(mode: BuilderMode) -> Self {
        Self::with_model(mode, Arc::new(ScriptedModel::default()))
    }

    pub fn with_model(mode: BuilderMode, model: Arc<ScriptedModel>) -> Self {
        Self {
            mode,
            model,
            log: Arc::new(BuilderLog::default()),
        }
    }
}

impl AgentBuilderFactory for StubBuilderFactory {
    fn create_builder(&self, toolsets: &[Arc<dyn ToolSet>]) -> Box<dyn AgentBuilder> {
        Box::new(StubBuilder {
            mode: self.mode,
            model: self.model.clone(),
            toolsets: toolsets.to_vec(),
            log: self.log.clone(),
            parser: None,
            llm: None,
            global_tools: Vec::new(),
        })
    }
}

/// Toolset with one global `echo` tool and one `whoami` session tool.
///
/// `whoami` resolves its executor through the accessor at call time and
/// reports the session id and executor id.
pub struct EchoToolSet;

impl ToolSet for EchoToolSet {
    fn name(&self) -> &str {
        "echo"
    }

    fn global_tools(&self) -> Vec<Arc<dyn Tool>> {
        vec![Arc::new(AgentTool::new(
            "echo",
            "Repeat the input",
            AgentToolParameters::text("text to repeat"),
            |args, _ctx| async move { Ok(serde_json::json!(args.as_text())) },
        ))]
    }

    fn session_tools(&self, session: &SessionAccessor) -> Vec<Arc<dyn Tool>> {
        let session = session.clone();
        vec![Arc::new(AgentTool::new(
            "whoami",
            "Report the current session",
            AgentToolParameters::text("ignored"),
            move |_args, _ctx| {
                let session = session.clone();
                async move {
                    let (id, executor) = session.get()?;
                    Ok(serde_json::json!({
                        "session": id.as_str(),
                        "executor": executor.id().to_string(),
                    }))
                }
            },
        ))]
    }
}

/// Execution handle recording every state update.
#[derive(Default)]
pub struct RecordingExecution {
    pub states: Mutex<Vec<ExecutionState>>,
}

impl ExecutionHandle for RecordingExecution {
    fn id(&self) -> &str {
        "execution-1"
    }

    fn update_state(&self, state: &ExecutionState) {
        self.states.lock().unwrap().push(state.clone());
    }
}

/// Buffer collecting formatted log output.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber writing into the returned buffer.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, buffer.contents())
}
