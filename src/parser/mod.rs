//! Parsing model output into agent decisions.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::AgentManagerError;
use crate::types::{AgentAction, AgentDecision, AgentFinish};

/// Turns raw model text into an [`AgentDecision`].
pub trait OutputParser: Send + Sync {
    /// Parse a full model completion.
    fn parse(&self, text: &str) -> Result<AgentDecision, AgentManagerError>;

    /// Instructions appended to the prompt describing the expected format.
    fn format_instructions(&self) -> &str;

    /// The reasoning text preceding the decision, if the format has one.
    fn thought<'a>(&self, text: &'a str) -> Option<&'a str> {
        let _ = text;
        None
    }
}

const FINAL_ANSWER_MARKER: &str = "Final Answer:";

const REACT_FORMAT_INSTRUCTIONS: &str = "Use the following format:

Thought: reason about what to do next
Action: the tool to use
Action Input: the input to the tool (plain text or a JSON object)
Observation: the result of the tool
... (Thought/Action/Action Input/Observation can repeat)
Thought: I now know the final answer
Final Answer: the answer to the original input";

static ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:(.*?)\n\s*Action\s*\d*\s*Input\s*\d*\s*:(.*)")
        .expect("action regex must compile")
});

static THOUGHT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*(?:Thought\s*:)?(.*?)(?:\n?\s*(?:Action\s*\d*\s*:|Final Answer:)|$)")
        .expect("thought regex must compile")
});

/// Parser for the `Thought / Action / Action Input / Final Answer` format.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReActOutputParser;

impl ReActOutputParser {
    pub fn new() -> Self {
        Self
    }

    fn tool_input(raw: &str) -> serde_json::Value {
        let trimmed = raw.trim().trim_matches('"');
        match serde_json::from_str::<serde_json::Value>(raw.trim()) {
            Ok(value @ (serde_json::Value::Object(_) | serde_json::Value::Array(_))) => value,
            _ => serde_json::Value::String(trimmed.to_string()),
        }
    }
}

impl OutputParser for ReActOutputParser {
    fn parse(&self, text: &str) -> Result<AgentDecision, AgentManagerError> {
        let action = ACTION_RE.captures(text);
        let final_answer = text.find(FINAL_ANSWER_MARKER);

        match (action, final_answer) {
            (Some(_), Some(_)) => Err(AgentManagerError::OutputParse(format!(
                "output contains both an action and a final answer: `{text}`"
            ))),
            (Some(caps), None) => {
                let tool = caps
                    .get(1)
                    .map(|m| m.as_str().trim().trim_matches('`'))
                    .unwrap_or_default();
                if tool.is_empty() {
                    return Err(AgentManagerError::OutputParse(format!(
                        "action without a tool name: `{text}`"
                    )));
                }
                let input = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
                Ok(AgentDecision::Action(
                    AgentAction::new(tool, Self::tool_input(input)).with_log(text),
                ))
            }
            (None, Some(idx)) => {
                let output = text[idx + FINAL_ANSWER_MARKER.len()..].trim();
                Ok(AgentDecision::Finish(AgentFinish::new(output).with_log(text)))
            }
            (None, None) => Err(AgentManagerError::OutputParse(format!(
                "could not find an action or a final answer in `{text}`"
            ))),
        }
    }

    fn format_instructions(&self) -> &str {
        REACT_FORMAT_INSTRUCTIONS
    }

    fn thought<'a>(&self, text: &'a str) -> Option<&'a str> {
        THOUGHT_RE
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|t| !t.is_empty() && !t.starts_with(FINAL_ANSWER_MARKER))
    }
}
