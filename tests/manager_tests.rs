//! Tests for session memory and executor management.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;

use agent_manager::agent::Agent;
use agent_manager::callbacks::{CallbackManager, ExecutionHandle};
use agent_manager::error::{AgentManagerError, ErrorCategory};
use agent_manager::executor::{AgentExecutor, ExecutorFactory};
use agent_manager::manager::{SessionAccessor, SessionAgentManager};
use agent_manager::memory::SharedMemory;
use agent_manager::tools::{Tool, ToolSet, ToolsFactory, ToolsetCatalog};

use common::{
    capture_logs, BuilderMode, EchoToolSet, RecordingExecution, ScriptedModel,
    StubBuilderFactory,
};

fn manager_with(mode: BuilderMode) -> (SessionAgentManager, Arc<StubBuilderFactory>) {
    let factory = Arc::new(StubBuilderFactory::new(mode));
    let manager = SessionAgentManager::new(vec![Arc::new(EchoToolSet)], factory.clone());
    (manager, factory)
}

#[test]
fn memory_is_created_once_per_session() {
    let (manager, _) = manager_with(BuilderMode::Complete);

    let first = manager.get_or_create_memory("s1").unwrap();
    let second = manager.get_or_create_memory("s1").unwrap();
    let other = manager.get_or_create_memory("s2").unwrap();

    assert!(first.ptr_eq(&second));
    assert!(!first.ptr_eq(&other));
    assert_eq!(first.lock().memory_key(), "chat_history");
    assert!(first.lock().return_messages());
}

#[test]
fn memory_accepts_owned_and_json_sessions() {
    let (manager, _) = manager_with(BuilderMode::Complete);

    let from_str = manager.get_or_create_memory("s1").unwrap();
    let from_string = manager.get_or_create_memory(String::from("s1")).unwrap();
    let from_json = manager
        .get_or_create_memory(&serde_json::json!("s1"))
        .unwrap();

    assert!(from_str.ptr_eq(&from_string));
    assert!(from_str.ptr_eq(&from_json));
}

#[test]
fn invalid_sessions_are_rejected_without_creating_memory() {
    let (manager, _) = manager_with(BuilderMode::Complete);

    let empty = manager.get_or_create_memory("").unwrap_err();
    assert_eq!(empty.category(), ErrorCategory::ValueCondition);
    assert_eq!(empty.to_string(), "Invalid value: Session is empty");

    let number = manager
        .get_or_create_memory(&serde_json::json!(123))
        .unwrap_err();
    assert_eq!(number.category(), ErrorCategory::TypeCondition);

    assert!(manager.session_ids().is_empty());
}

#[test]
fn from_value_requires_a_list() {
    let mut catalog = ToolsetCatalog::new();
    catalog.register(Arc::new(EchoToolSet));

    let err = SessionAgentManager::from_value(
        &serde_json::json!("not-a-list"),
        &catalog,
        Arc::new(StubBuilderFactory::new(BuilderMode::Complete)),
    )
    .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::TypeCondition);
    assert_eq!(err.to_string(), "Invalid type: Toolsets must be a list");

    let manager = SessionAgentManager::from_value(
        &serde_json::json!(["echo"]),
        &catalog,
        Arc::new(StubBuilderFactory::new(BuilderMode::Complete)),
    )
    .unwrap();
    assert_eq!(manager.toolsets().len(), 1);
    assert_eq!(manager.toolsets()[0].name(), "echo");
}

#[test]
fn from_value_rejects_unknown_and_non_string_toolsets() {
    let catalog = ToolsetCatalog::new();
    let factory = Arc::new(StubBuilderFactory::new(BuilderMode::Complete));

    let unknown =
        SessionAgentManager::from_value(&serde_json::json!(["missing"]), &catalog, factory.clone())
            .unwrap_err();
    assert!(matches!(unknown, AgentManagerError::Configuration(_)));

    let numeric =
        SessionAgentManager::from_value(&serde_json::json!([1, 2, 3]), &catalog, factory)
            .unwrap_err();
    assert_eq!(numeric.category(), ErrorCategory::TypeCondition);
}

#[test]
fn create_is_equivalent_to_new() {
    let factory = Arc::new(StubBuilderFactory::new(BuilderMode::Complete));
    let manager = SessionAgentManager::create(vec![Arc::new(EchoToolSet)], factory);
    assert_eq!(manager.toolsets().len(), 1);
    assert!(manager.session_ids().is_empty());
    assert!(manager.executor("s1").is_none());
}

#[test]
fn missing_agent_is_logged_and_leaves_no_executor() {
    let (manager, factory) = manager_with(BuilderMode::NoAgent);

    let (result, logs) = capture_logs(|| manager.create_executor("s1", None, None));
    let err = result.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::ValueCondition);
    assert_eq!(err.to_string(), "Invalid value: Agent not created");
    assert!(logs.contains("ERROR"), "logs: {logs}");
    assert!(
        logs.contains("Error while creating executor: Invalid value: Agent not created"),
        "logs: {logs}"
    );
    assert!(manager.executor("s1").is_none());
    assert_eq!(
        factory.log.calls(),
        vec!["build_parser", "build_llm", "build_global_tools", "agent"]
    );
}

#[test]
fn missing_llm_fails_before_tool_assembly() {
    let (manager, factory) = manager_with(BuilderMode::NoLlm);

    let (result, logs) = capture_logs(|| manager.create_executor("s1", None, None));
    let err = result.unwrap_err();

    assert_eq!(err.to_string(), "Invalid value: LLM not created");
    assert!(logs.contains("LLM not created"));
    assert_eq!(factory.log.calls(), vec!["build_parser", "build_llm"]);
    assert!(manager.memory("s1").is_none());
    assert!(manager.executor("s1").is_none());
}

#[test]
fn collaborator_errors_pass_through_unchanged() {
    let (manager, _) = manager_with(BuilderMode::FailingParser);

    let (result, logs) = capture_logs(|| manager.create_executor("s1", None, None));
    let err = result.unwrap_err();

    assert!(matches!(err, AgentManagerError::Collaborator(_)));
    assert_eq!(err.category(), ErrorCategory::Passthrough);
    assert_eq!(err.to_string(), "parser template missing");
    assert!(logs.contains("parser template missing"));
}

#[test]
fn invalid_session_fails_the_build_and_is_logged() {
    let (manager, _) = manager_with(BuilderMode::Complete);

    let (result, logs) = capture_logs(|| manager.create_executor("", None, None));
    assert_eq!(result.unwrap_err().category(), ErrorCategory::ValueCondition);
    assert!(logs.contains("Session is empty"));
    assert!(manager.session_ids().is_empty());
}

struct FailingSessionTools;

impl ToolsFactory for FailingSessionTools {
    fn create_per_session_tools(
        &self,
        _toolsets: &[Arc<dyn ToolSet>],
        _get_session: SessionAccessor,
    ) -> Result<Vec<Arc<dyn Tool>>, AgentManagerError> {
        Err(AgentManagerError::InvalidState("tool registry offline".into()))
    }
}

#[test]
fn failure_after_memory_creation_keeps_the_memory() {
    let (manager, _) = manager_with(BuilderMode::Complete);
    let manager = manager.with_tools_factory(Arc::new(FailingSessionTools));

    let err = manager.create_executor("s1", None, None).unwrap_err();

    assert_eq!(err.to_string(), "Invalid state: tool registry offline");
    assert!(manager.memory("s1").is_some());
    assert!(manager.executor("s1").is_none());
}

#[test]
fn rebuild_replaces_executor_but_keeps_memory() {
    let (manager, _) = manager_with(BuilderMode::Complete);

    let first = manager.create_executor("s1", None, None).unwrap();
    let memory = manager.get_or_create_memory("s1").unwrap();
    let second = manager.create_executor("s1", None, None).unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_ne!(first.id(), second.id());
    assert!(Arc::ptr_eq(&manager.executor("s1").unwrap(), &second));
    assert!(manager.get_or_create_memory("s1").unwrap().ptr_eq(&memory));
    assert!(first.memory().ptr_eq(second.memory()));
    assert!(second.memory().ptr_eq(&memory));
}

#[test]
fn executor_is_assembled_from_global_and_session_tools() {
    let (manager, _) = manager_with(BuilderMode::Complete);

    let executor = manager.create_executor("s1", None, None).unwrap();

    let names: Vec<&str> = executor.tools().iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["echo", "whoami"]);
    assert!(executor.verbose());
    assert!(executor.agent().is_some());
}

#[test]
fn execution_handle_adds_a_tracing_callback_everywhere() {
    let (manager, factory) = manager_with(BuilderMode::Complete);

    let plain = manager.create_executor("s1", None, None).unwrap();
    let plain_llm_callbacks = factory.log.last_llm_callbacks();

    let execution: Arc<dyn ExecutionHandle> = Arc::new(RecordingExecution::default());
    let traced = manager.create_executor("s1", Some(execution), None).unwrap();
    let traced_llm_callbacks = factory.log.last_llm_callbacks();

    assert_eq!(plain_llm_callbacks.len(), 1);
    assert_eq!(traced_llm_callbacks.len(), plain_llm_callbacks.len() + 1);
    assert_eq!(
        traced_llm_callbacks
            .handlers()
            .iter()
            .map(|h| h.name())
            .collect::<Vec<_>>(),
        vec!["eval", "execution_tracing"]
    );

    for tool in plain.tools() {
        assert!(tool.callbacks().unwrap().ptr_eq(&plain_llm_callbacks));
    }
    for tool in traced.tools() {
        let callbacks = tool.callbacks().unwrap();
        assert_eq!(callbacks.len(), 2);
        assert!(callbacks.ptr_eq(&traced_llm_callbacks));
    }
    assert!(traced.callbacks().ptr_eq(&traced_llm_callbacks));
}

#[test]
fn explicit_api_key_wins_over_default() {
    let (manager, factory) = manager_with(BuilderMode::Complete);
    let manager = manager.with_default_api_key("sk-default");

    manager.create_executor("s1", None, Some("sk-explicit")).unwrap();
    manager.create_executor("s1", None, None).unwrap();

    assert_eq!(
        factory.log.api_keys(),
        vec![Some("sk-explicit".to_string()), Some("sk-default".to_string())]
    );
}

#[tokio::test]
async fn session_tool_resolves_the_current_executor_at_call_time() {
    let model = Arc::new(ScriptedModel::new(&[
        "Action: whoami\nAction Input: now",
        "Final Answer: checked",
        "Action: whoami\nAction Input: again",
        "Final Answer: checked again",
    ]));
    let factory = Arc::new(StubBuilderFactory::with_model(BuilderMode::Complete, model.clone()));
    let manager = SessionAgentManager::new(vec![Arc::new(EchoToolSet)], factory);

    let first = manager.create_executor("s1", None, None).unwrap();
    assert_eq!(first.run("who am I?").await.unwrap(), "checked");

    // The first executor's session tool sees the rebuilt executor.
    let second = manager.create_executor("s1", None, None).unwrap();
    assert_eq!(first.run("and now?").await.unwrap(), "checked again");

    let prompts = model.prompts.lock().unwrap();
    let first_observation = &prompts[1].last().unwrap().content;
    assert!(first_observation.contains(&first.id().to_string()));
    let second_observation = &prompts[3].last().unwrap().content;
    assert!(second_observation.contains(&second.id().to_string()));
    assert!(second_observation.contains("\"session\":\"s1\""));
}

#[tokio::test]
async fn accessor_reports_a_removed_session() {
    let model = Arc::new(ScriptedModel::new(&["Action: whoami\nAction Input: x"]));
    let factory = Arc::new(StubBuilderFactory::with_model(BuilderMode::Complete, model));
    let manager = SessionAgentManager::new(vec![Arc::new(EchoToolSet)], factory);

    let executor = manager.create_executor("s1", None, None).unwrap();
    assert!(manager.remove_session("s1"));
    assert!(!manager.remove_session("s1"));

    let err = executor.run("who am I?").await.unwrap_err();
    assert!(matches!(err, AgentManagerError::SessionNotFound(ref s) if s == "s1"));
}

#[test]
fn session_ids_are_sorted() {
    let (manager, _) = manager_with(BuilderMode::Complete);
    manager.get_or_create_memory("b").unwrap();
    manager.get_or_create_memory("a").unwrap();

    let ids: Vec<String> = manager
        .session_ids()
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
}

/// Factory producing executors without an agent.
struct DetachedExecutorFactory;

impl ExecutorFactory for DetachedExecutorFactory {
    fn from_agent_and_tools(
        &self,
        _agent: Arc<dyn Agent>,
        tools: Vec<Arc<dyn Tool>>,
        memory: SharedMemory,
        callbacks: CallbackManager,
        verbose: bool,
    ) -> Result<AgentExecutor, AgentManagerError> {
        Ok(AgentExecutor::detached(tools, memory, callbacks, verbose))
    }
}

#[test]
fn agent_is_attached_when_the_factory_omits_it() {
    let (manager, _) = manager_with(BuilderMode::Complete);
    let manager = manager.with_executor_factory(Arc::new(DetachedExecutorFactory));

    let executor = manager.create_executor("s1", None, None).unwrap();
    assert!(executor.agent().is_some());
}
