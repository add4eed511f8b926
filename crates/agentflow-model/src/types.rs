// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};

/// A single entry in an Assistant message's pending tool-call set.
///
/// `id` is provider-assigned and unique within the turn; `args` is always a
/// JSON object (never a bare scalar or array) once normalized by
/// `generate_response`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub args: serde_json::Value,
}

/// A message in the conversation history.
///
/// `System` MUST appear at most once, at index 0. Every `ToolCall.id` on an
/// `Assistant` message must be answered by exactly one `ToolResult` with a
/// matching `tool_call_id` before the next `Assistant` message is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    #[serde(rename = "tool")]
    ToolResult {
        tool_call_id: String,
        content: String,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System { content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User { content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant { content: content.into(), tool_calls: Vec::new() }
    }

    pub fn assistant_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::Assistant { content: content.into(), tool_calls }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult { tool_call_id: tool_call_id.into(), content: content.into() }
    }

    /// The pending tool calls on an `Assistant` message, or an empty slice
    /// for every other role.
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Self::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    /// The plain text content of this message, regardless of role.
    pub fn text(&self) -> &str {
        match self {
            Self::System { content } | Self::User { content } | Self::Assistant { content, .. } => content,
            Self::ToolResult { content, .. } => content,
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, Self::System { .. })
    }

    pub fn is_assistant(&self) -> bool {
        matches!(self, Self::Assistant { .. })
    }
}

/// A tool schema bound into a [`CompletionRequest`], transformed by the
/// provider into its own tool-declaration wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Request sent to a [`crate::ModelProvider`].
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolSchema>,
    pub stream: bool,
}

/// A single event from a streaming completion: incremental text content, a
/// partial/final tool call, or a completion marker.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEvent {
    /// An incremental slice of assistant text.
    TextDelta(String),
    /// A tool-call delta, keyed by its position among parallel calls in this
    /// response (`index`) so callers can accumulate streamed argument
    /// fragments per call.
    ToolCall { index: u32, id: String, name: String, arguments: String },
    /// Final token usage for the completion, when the provider reports it.
    Usage { input_tokens: u32, output_tokens: u32 },
    /// The stream finished normally.
    Done,
    /// A recoverable mid-stream error reported by the provider.
    Error(String),
    /// The response was truncated because it hit `max_tokens`.
    MaxTokens,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_user_round_trips_through_json() {
        let m = Message::user("hi there");
        let json = serde_json::to_string(&m).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
        assert_eq!(back.text(), "hi there");
    }

    #[test]
    fn assistant_with_tool_calls_reports_them() {
        let tc = ToolCall { id: "1".into(), name: "get_current_time".into(), args: serde_json::json!({}) };
        let m = Message::assistant_with_tool_calls("", vec![tc.clone()]);
        assert_eq!(m.tool_calls(), &[tc]);
        assert!(m.is_assistant());
    }

    #[test]
    fn non_assistant_messages_report_no_tool_calls() {
        assert!(Message::user("x").tool_calls().is_empty());
        assert!(Message::system("x").tool_calls().is_empty());
        assert!(Message::tool_result("1", "ok").tool_calls().is_empty());
    }

    #[test]
    fn tool_result_serializes_with_tool_role() {
        let m = Message::tool_result("abc", "42");
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "abc");
    }
}
