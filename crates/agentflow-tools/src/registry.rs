// SPDX-License-Identifier: MIT
use std::collections::HashMap;
use std::sync::Arc;

use crate::{Tool, ToolCall, ToolOutput};

/// Where a [`ToolDescriptor`] came from. `agentflow-catalog` tags
/// remote tools with `Remote{server_name}`; this crate only ever produces
/// `Local`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOrigin {
    Local,
    Remote { server_name: String },
}

/// Metadata the catalog and front-ends need about a tool, independent of its
/// executable implementation.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub args_schema: serde_json::Value,
    pub origin: ToolOrigin,
    pub enabled: bool,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool already registered: {0}")]
    DuplicateName(String),
}

struct Entry {
    tool: Arc<dyn Tool>,
    enabled: bool,
}

/// Holds local tools, tracks enabled/disabled status, exposes tool metadata.
/// No concurrent mutation is expected after session start;
/// `get_enabled` gives callers snapshot semantics.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Entry>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: HashMap::new() }
    }

    /// Register a tool. Rejects duplicate names with [`RegistryError::DuplicateName`]
    /// rather than silently overwriting.
    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        self.tools.insert(name, Entry { tool: Arc::new(tool), enabled: true });
        Ok(())
    }

    pub fn enable(&mut self, name: &str) {
        if let Some(e) = self.tools.get_mut(name) {
            e.enabled = true;
        }
    }

    pub fn disable(&mut self, name: &str) {
        if let Some(e) = self.tools.get_mut(name) {
            e.enabled = false;
        }
    }

    fn descriptor(name: &str, entry: &Entry) -> ToolDescriptor {
        ToolDescriptor {
            name: name.to_string(),
            description: entry.tool.description().to_string(),
            args_schema: entry.tool.parameters_schema(),
            origin: ToolOrigin::Local,
            enabled: entry.enabled,
        }
    }

    /// Snapshot of descriptors for enabled tools only, sorted by name.
    pub fn get_enabled(&self) -> Vec<ToolDescriptor> {
        let mut out: Vec<ToolDescriptor> = self
            .tools
            .iter()
            .filter(|(_, e)| e.enabled)
            .map(|(name, e)| Self::descriptor(name, e))
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// All registered tools' descriptors, including disabled ones, sorted by name.
    pub fn list(&self) -> Vec<ToolDescriptor> {
        let mut out: Vec<ToolDescriptor> =
            self.tools.iter().map(|(name, e)| Self::descriptor(name, e)).collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    pub async fn execute(&self, call: &ToolCall) -> ToolOutput {
        match self.tools.get(&call.name) {
            Some(entry) if entry.enabled => entry.tool.execute(call).await,
            Some(_) => ToolOutput::err(&call.id, format!("tool disabled: {}", call.name)),
            None => ToolOutput::err(&call.id, format!("tool not found: {}", call.name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct EchoTool {
        name: &'static str,
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "echoes its input"
        }
        fn parameters_schema(&self) -> Value {
            json!({ "type": "object" })
        }
        async fn execute(&self, call: &ToolCall) -> ToolOutput {
            ToolOutput::ok(&call.id, format!("echo:{}", call.args))
        }
    }

    #[test]
    fn register_and_get_enabled() {
        let mut reg = ToolRegistry::new();
        reg.register(EchoTool { name: "echo" }).unwrap();
        assert_eq!(reg.get_enabled().len(), 1);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut reg = ToolRegistry::new();
        reg.register(EchoTool { name: "echo" }).unwrap();
        let err = reg.register(EchoTool { name: "echo" }).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("echo".into()));
    }

    #[test]
    fn disabled_tool_excluded_from_get_enabled_but_present_in_list() {
        let mut reg = ToolRegistry::new();
        reg.register(EchoTool { name: "echo" }).unwrap();
        reg.disable("echo");
        assert!(reg.get_enabled().is_empty());
        assert_eq!(reg.list().len(), 1);
        assert!(!reg.list()[0].enabled);
    }

    #[test]
    fn re_enabling_restores_visibility() {
        let mut reg = ToolRegistry::new();
        reg.register(EchoTool { name: "echo" }).unwrap();
        reg.disable("echo");
        reg.enable("echo");
        assert_eq!(reg.get_enabled().len(), 1);
    }

    #[tokio::test]
    async fn execute_known_tool_succeeds() {
        let mut reg = ToolRegistry::new();
        reg.register(EchoTool { name: "echo" }).unwrap();
        let call = ToolCall { id: "1".into(), name: "echo".into(), args: json!({"x": 1}) };
        let out = reg.execute(&call).await;
        assert!(!out.is_error);
        assert!(out.content.starts_with("echo:"));
    }

    #[tokio::test]
    async fn execute_unknown_tool_reports_not_found() {
        let reg = ToolRegistry::new();
        let call = ToolCall { id: "x".into(), name: "missing".into(), args: json!({}) };
        let out = reg.execute(&call).await;
        assert!(out.is_error);
        assert_eq!(out.content, "tool not found: missing");
    }

    #[tokio::test]
    async fn execute_disabled_tool_reports_disabled() {
        let mut reg = ToolRegistry::new();
        reg.register(EchoTool { name: "echo" }).unwrap();
        reg.disable("echo");
        let call = ToolCall { id: "1".into(), name: "echo".into(), args: json!({}) };
        let out = reg.execute(&call).await;
        assert!(out.is_error);
        assert_eq!(out.content, "tool disabled: echo");
    }
}
