//! Per-session conversation memory.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::types::ModelMessage;

/// Key under which chat history is exposed to agent prompts.
pub const DEFAULT_MEMORY_KEY: &str = "chat_history";

/// Buffer of every chat turn in a session, never truncated.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    memory_key: String,
    return_messages: bool,
    messages: Vec<ModelMessage>,
}

/// The value a memory hands to an agent when asked for its variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemoryVariables {
    Messages(Vec<ModelMessage>),
    Transcript(String),
}

impl ConversationMemory {
    /// Create an empty memory under `memory_key`.
    ///
    /// With `return_messages` set, [`load_memory_variables`](Self::load_memory_variables)
    /// yields structured messages; otherwise a `Human:`/`AI:` transcript.
    pub fn new(memory_key: impl Into<String>, return_messages: bool) -> Self {
        Self {
            memory_key: memory_key.into(),
            return_messages,
            messages: Vec::new(),
        }
    }

    pub fn memory_key(&self) -> &str {
        &self.memory_key
    }

    pub fn return_messages(&self) -> bool {
        self.return_messages
    }

    /// Record one exchange.
    pub fn save_context(&mut self, input: impl Into<String>, output: impl Into<String>) {
        self.messages.push(ModelMessage::user(input));
        self.messages.push(ModelMessage::assistant(output));
    }

    /// Add a raw message.
    pub fn add_message(&mut self, message: ModelMessage) {
        self.messages.push(message);
    }

    /// Variables keyed by [`memory_key`](Self::memory_key).
    pub fn load_memory_variables(&self) -> (String, MemoryVariables) {
        let value = if self.return_messages {
            MemoryVariables::Messages(self.messages.clone())
        } else {
            MemoryVariables::Transcript(self.transcript())
        };
        (self.memory_key.clone(), value)
    }

    /// Render the buffer as one line per message.
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.transcript_prefix(), m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_KEY, true)
    }
}

/// Cloneable handle on a session's memory.
///
/// Clones share the same buffer; [`SharedMemory::ptr_eq`] tells whether two
/// handles point at the same memory.
#[derive(Debug, Clone, Default)]
pub struct SharedMemory {
    inner: Arc<Mutex<ConversationMemory>>,
}

impl SharedMemory {
    pub fn new(memory: ConversationMemory) -> Self {
        Self {
            inner: Arc::new(Mutex::new(memory)),
        }
    }

    /// Lock the memory. A poisoned lock is recovered, the buffer is append-only.
    pub fn lock(&self) -> MutexGuard<'_, ConversationMemory> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn ptr_eq(&self, other: &SharedMemory) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Snapshot of the stored messages.
    pub fn messages(&self) -> Vec<ModelMessage> {
        self.lock().messages().to_vec()
    }
}
