// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use serde_json::Value;

/// A single tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Provider-assigned, unique within the turn; forwarded verbatim.
    pub id: String,
    pub name: String,
    /// Parsed JSON arguments, always an object.
    pub args: Value,
}

/// The result of executing a tool. `content` is always the stringified
/// result or error reason that becomes a `ToolResult` message.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub call_id: String,
    pub content: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn ok(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self { call_id: call_id.into(), content: content.into(), is_error: false }
    }

    pub fn err(call_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { call_id: call_id.into(), content: reason.into(), is_error: true }
    }
}

/// Trait every local tool must implement.
///
/// `execute` must never panic on malformed `call.args`; validation failures
/// are reported through [`ToolOutput::err`] so the loop can continue.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON Schema for parameters.
    fn parameters_schema(&self) -> Value;
    async fn execute(&self, call: &ToolCall) -> ToolOutput;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "echoes its input"
        }
        fn parameters_schema(&self) -> Value {
            json!({ "type": "object" })
        }
        async fn execute(&self, call: &ToolCall) -> ToolOutput {
            ToolOutput::ok(&call.id, call.args.to_string())
        }
    }

    #[tokio::test]
    async fn tool_execute_returns_ok_output() {
        let call = ToolCall { id: "1".into(), name: "echo".into(), args: json!({"x": 1}) };
        let out = EchoTool.execute(&call).await;
        assert!(!out.is_error);
        assert_eq!(out.call_id, "1");
    }

    #[test]
    fn tool_output_err_marks_is_error() {
        let out = ToolOutput::err("1", "boom");
        assert!(out.is_error);
        assert_eq!(out.content, "boom");
    }
}
