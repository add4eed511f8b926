// SPDX-License-Identifier: MIT
use agentflow_model::{Message, ToolCall};

/// Carried through one user turn. Constructed at the start of the turn,
/// discarded at the end; its `messages` is copied back into the outer
/// [`crate::session::ConversationState`].
#[derive(Debug, Clone, Default)]
pub struct AgentState {
    pub messages: Vec<Message>,
    pub system_prompt: String,
    pub user_input: String,
    /// Accumulated final text for the turn, set by `format_output`.
    pub ai_response: String,
    /// Most recent pending tool-call set; cleared once `call_tools` answers
    /// every entry.
    pub tool_calls: Vec<ToolCall>,
}

impl AgentState {
    pub fn new(messages: Vec<Message>, system_prompt: impl Into<String>, user_input: impl Into<String>) -> Self {
        Self {
            messages,
            system_prompt: system_prompt.into(),
            user_input: user_input.into(),
            ai_response: String::new(),
            tool_calls: Vec::new(),
        }
    }

    /// The most recently appended Assistant message's tool-call set, or an
    /// empty slice if the history is empty or ends with a non-Assistant
    /// message.
    pub fn last_assistant_tool_calls(&self) -> &[ToolCall] {
        match self.messages.last() {
            Some(m) => m.tool_calls(),
            None => &[],
        }
    }
}

/// Persists across turns within a session. Owned by the session
/// orchestrator; the workflow engine reads and
/// rewrites it atomically per turn — it never mutates `messages` mid-turn.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    pub messages: Vec<Message>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self { messages: Vec::new() }
    }

    /// Swap in the turn's rewritten history. Called once per completed turn.
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
