// SPDX-License-Identifier: MIT
use std::sync::Arc;

use tracing::warn;

use agentflow_mcp::McpClient;
use agentflow_tools::{ToolCall, ToolDescriptor, ToolOrigin, ToolOutput, ToolRegistry};

/// Thin merge layer over the local registry and the remote client: the
/// sole entry point the workflow engine uses to enumerate and execute tool
/// calls.
pub struct Catalog {
    registry: Arc<ToolRegistry>,
    remote: McpClient,
    /// Ordered snapshot: locals first, then remotes in server order, with
    /// any name collision resolved in favour of the local tool.
    entries: Vec<ToolDescriptor>,
}

impl Catalog {
    /// Merge the local registry's enabled tools with the remote client's
    /// currently discovered tools. On a name collision the local tool wins
    /// and a warning is logged.
    pub async fn build(registry: Arc<ToolRegistry>, remote: McpClient) -> Self {
        let locals = registry.get_enabled();
        let remotes = remote.tools().await;

        let mut entries = locals;
        for remote_descriptor in remotes {
            if entries.iter().any(|d| d.name == remote_descriptor.name) {
                warn!(tool = %remote_descriptor.name, "remote tool name collides with a local tool; local wins");
                continue;
            }
            entries.push(remote_descriptor);
        }

        Self { registry, remote, entries }
    }

    /// Ordered sequence of every tool the workflow may call.
    pub fn entries(&self) -> &[ToolDescriptor] {
        &self.entries
    }

    pub fn lookup(&self, name: &str) -> Option<&ToolDescriptor> {
        self.entries.iter().find(|d| d.name == name)
    }

    /// Execute `call` by routing to the owning registry or remote server.
    /// A tool whose name is unknown produces a `ToolOutput` carrying
    /// `"tool not found: <name>"` rather than an error type: tool failures
    /// are always captured as normal, in-history results.
    pub async fn invoke(&self, call: &ToolCall) -> ToolOutput {
        let Some(descriptor) = self.lookup(&call.name) else {
            return ToolOutput::err(&call.id, format!("tool not found: {}", call.name));
        };

        match &descriptor.origin {
            ToolOrigin::Local => self.registry.execute(call).await,
            ToolOrigin::Remote { server_name } => {
                let unqualified = descriptor
                    .name
                    .strip_prefix(&format!("{server_name}/"))
                    .unwrap_or(descriptor.name.as_str());
                match self.remote.invoke(server_name, unqualified, call.args.clone()).await {
                    Ok(text) => ToolOutput::ok(&call.id, text),
                    Err(e) => ToolOutput::err(&call.id, e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentflow_tools::{Tool, ToolOutput as LocalOutput};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "echoes"
        }
        fn parameters_schema(&self) -> Value {
            json!({ "type": "object" })
        }
        async fn execute(&self, call: &ToolCall) -> LocalOutput {
            LocalOutput::ok(&call.id, call.args.to_string())
        }
    }

    #[tokio::test]
    async fn build_merges_local_tools() {
        let mut reg = ToolRegistry::new();
        reg.register(EchoTool).unwrap();
        let catalog = Catalog::build(Arc::new(reg), McpClient::new()).await;
        assert_eq!(catalog.entries().len(), 1);
        assert_eq!(catalog.entries()[0].name, "echo");
    }

    #[tokio::test]
    async fn invoke_unknown_tool_reports_not_found() {
        let reg = ToolRegistry::new();
        let catalog = Catalog::build(Arc::new(reg), McpClient::new()).await;
        let call = ToolCall { id: "1".into(), name: "missing".into(), args: json!({}) };
        let out = catalog.invoke(&call).await;
        assert!(out.is_error);
        assert_eq!(out.content, "tool not found: missing");
    }

    #[tokio::test]
    async fn invoke_routes_local_tool_to_registry() {
        let mut reg = ToolRegistry::new();
        reg.register(EchoTool).unwrap();
        let catalog = Catalog::build(Arc::new(reg), McpClient::new()).await;
        let call = ToolCall { id: "1".into(), name: "echo".into(), args: json!({"a": 1}) };
        let out = catalog.invoke(&call).await;
        assert!(!out.is_error);
        assert_eq!(out.content, "{\"a\":1}");
    }

    #[tokio::test]
    async fn lookup_returns_none_for_unknown_name() {
        let reg = ToolRegistry::new();
        let catalog = Catalog::build(Arc::new(reg), McpClient::new()).await;
        assert!(catalog.lookup("nope").is_none());
    }
}
