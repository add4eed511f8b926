// SPDX-License-Identifier: MIT
use std::collections::HashMap;
use std::sync::Arc;

use rmcp::model::CallToolRequestParams;
use rmcp::transport::StreamableHttpClientTransport;
use rmcp::ServiceExt;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use agentflow_tools::{ToolDescriptor, ToolOrigin};

use crate::config::RemoteServer;
use crate::error::McpError;

/// A connected MCP peer over Streamable-HTTP. Boxed behind `rmcp`'s dynamic
/// service handle so `ServerState` doesn't need to name the concrete
/// transport/handler generic parameters.
type Peer = rmcp::service::RunningService<rmcp::RoleClient, ()>;

struct ServerState {
    config: RemoteServer,
    connected: bool,
    last_error: Option<String>,
    tools: HashMap<String, ToolDescriptor>,
    peer: Option<Peer>,
}

impl ServerState {
    fn new(config: RemoteServer) -> Self {
        Self { config, connected: false, last_error: None, tools: HashMap::new(), peer: None }
    }
}

/// Per-server connection lifecycle and tool discovery.
///
/// Holds one [`ServerState`] per configured server behind a single
/// `RwLock` — acceptable because state transitions only happen during
/// `initialize`/`close`/explicit reconnect, never on the invocation hot path.
pub struct RemoteRegistry {
    servers: RwLock<HashMap<String, ServerState>>,
    /// Registration order, so `tools()` can list remotes "in server order"
    /// rather than the arbitrary order a `HashMap` would give.
    order: RwLock<Vec<String>>,
}

impl RemoteRegistry {
    pub fn new() -> Self {
        Self { servers: RwLock::new(HashMap::new()), order: RwLock::new(Vec::new()) }
    }

    /// Validate and store `servers`. Ill-formed entries are dropped with a
    /// warning rather than rejecting the whole batch.
    pub async fn configure(&self, servers: Vec<RemoteServer>) {
        let mut guard = self.servers.write().await;
        let mut order = self.order.write().await;
        guard.clear();
        order.clear();
        for server in servers {
            if !server.is_well_formed() {
                warn!(server = %server.name, "dropping ill-formed remote server config");
                continue;
            }
            order.push(server.name.clone());
            guard.insert(server.name.clone(), ServerState::new(server));
        }
    }

    /// Connect to every enabled server, collecting tool descriptors.
    ///
    /// Returns `Ok(connected_count)`. A server that fails discovery is
    /// marked `connected=false, last_error=...` and does not abort the rest;
    /// callers decide pass/fail from the returned count.
    pub async fn initialize(&self) -> Result<usize, McpError> {
        let names: Vec<String> = {
            let guard = self.servers.read().await;
            guard.iter().filter(|(_, s)| s.config.enabled).map(|(n, _)| n.clone()).collect()
        };

        let futures = names.iter().map(|name| self.connect_one(name));
        let results = futures::future::join_all(futures).await;
        let connected = results.into_iter().filter(|r| r.is_ok()).count();
        Ok(connected)
    }

    async fn connect_one(&self, name: &str) -> Result<(), McpError> {
        let (url, timeout_ms) = {
            let guard = self.servers.read().await;
            let state = guard.get(name).ok_or_else(|| McpError::ServerUnavailable(name.to_string()))?;
            (state.config.url.clone(), state.config.timeout_ms)
        };

        debug!(server = name, url = %url, "connecting to remote tool-provider server");

        let transport = StreamableHttpClientTransport::from_uri(url.as_str());
        let dial = ().serve(transport);
        let peer = match tokio::time::timeout(std::time::Duration::from_millis(timeout_ms), dial).await {
            Ok(Ok(peer)) => peer,
            Ok(Err(e)) => {
                self.mark_failed(name, e.to_string()).await;
                return Err(McpError::Connect { server: name.to_string(), reason: e.to_string() });
            }
            Err(_) => {
                self.mark_failed(name, "connect timed out".to_string()).await;
                return Err(McpError::Timeout { server: name.to_string(), timeout_ms });
            }
        };

        let listed = match peer.list_all_tools().await {
            Ok(tools) => tools,
            Err(e) => {
                self.mark_failed(name, e.to_string()).await;
                return Err(McpError::Invocation { server: name.to_string(), tool: String::new(), reason: e.to_string() });
            }
        };

        let descriptors: HashMap<String, ToolDescriptor> = listed
            .into_iter()
            .map(|t| {
                let descriptor = ToolDescriptor {
                    name: t.name.to_string(),
                    description: t.description.as_deref().unwrap_or_default().to_string(),
                    args_schema: serde_json::Value::Object((*t.input_schema).clone()),
                    origin: ToolOrigin::Remote { server_name: name.to_string() },
                    enabled: true,
                };
                (descriptor.name.clone(), descriptor)
            })
            .collect();

        let mut guard = self.servers.write().await;
        if let Some(state) = guard.get_mut(name) {
            state.peer = Some(peer);
            state.connected = true;
            state.last_error = None;
            state.tools = descriptors;
        }
        Ok(())
    }

    async fn mark_failed(&self, name: &str, reason: String) {
        warn!(server = name, error = %reason, "remote server discovery failed");
        let mut guard = self.servers.write().await;
        if let Some(state) = guard.get_mut(name) {
            state.connected = false;
            state.last_error = Some(reason);
            state.peer = None;
            state.tools.clear();
        }
    }

    /// Snapshot of discovered tools across all connected servers.
    ///
    /// A remote tool name that collides across two or more servers is
    /// qualified as `server_name/tool_name` so the result set stays globally
    /// unique; a name unique to one server is left unqualified.
    pub async fn tools(&self) -> Vec<ToolDescriptor> {
        let guard = self.servers.read().await;
        let order = self.order.read().await;

        let mut by_unqualified: HashMap<String, usize> = HashMap::new();
        for state in guard.values().filter(|s| s.connected) {
            for name in state.tools.keys() {
                *by_unqualified.entry(name.clone()).or_insert(0) += 1;
            }
        }

        let mut out = Vec::new();
        for server_name in order.iter() {
            let Some(state) = guard.get(server_name) else { continue };
            if !state.connected {
                continue;
            }
            let mut names: Vec<&String> = state.tools.keys().collect();
            names.sort();
            for name in names {
                let mut descriptor = state.tools[name].clone();
                if by_unqualified.get(name).copied().unwrap_or(0) > 1 {
                    descriptor.name = format!("{server_name}/{name}");
                }
                out.push(descriptor);
            }
        }
        out
    }

    /// Route an invocation to the server that hosts `tool_name`, identified
    /// by scanning connected servers' tool sets (the catalog is responsible
    /// for resolving a possibly-qualified `server_name/tool_name`).
    pub async fn invoke(&self, server_name: &str, tool_name: &str, args: serde_json::Value) -> Result<String, McpError> {
        let guard = self.servers.read().await;
        let state = guard
            .get(server_name)
            .filter(|s| s.connected)
            .ok_or_else(|| McpError::ServerUnavailable(server_name.to_string()))?;

        let peer = state.peer.as_ref().ok_or_else(|| McpError::ServerUnavailable(server_name.to_string()))?;

        let arguments = match args {
            serde_json::Value::Object(map) => Some(map),
            serde_json::Value::Null => None,
            other => {
                let mut map = serde_json::Map::new();
                map.insert("value".to_string(), other);
                Some(map)
            }
        };

        let params = CallToolRequestParams { meta: None, name: tool_name.to_string().into(), arguments, task: None };

        let result = peer.call_tool(params).await.map_err(|e| McpError::Invocation {
            server: server_name.to_string(),
            tool: tool_name.to_string(),
            reason: e.to_string(),
        })?;

        let text = result
            .content
            .iter()
            .filter_map(|c| c.as_text().map(|t| t.text.clone()))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(text)
    }

    /// Release transport resources for every connected server. Idempotent.
    pub async fn close(&self) {
        let mut guard = self.servers.write().await;
        for state in guard.values_mut() {
            if let Some(peer) = state.peer.take() {
                let _ = peer.cancel().await;
            }
            state.connected = false;
            state.tools.clear();
        }
    }

    /// Status snapshot for the `info` CLI subcommand.
    pub async fn statuses(&self) -> Vec<RemoteServerStatus> {
        let guard = self.servers.read().await;
        let mut out: Vec<RemoteServerStatus> = guard
            .values()
            .map(|s| RemoteServerStatus {
                name: s.config.name.clone(),
                url: s.config.url.clone(),
                enabled: s.config.enabled,
                connected: s.connected,
                last_error: s.last_error.clone(),
                tool_count: s.tools.len(),
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }
}

impl Default for RemoteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only snapshot of one server's runtime state, for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteServerStatus {
    pub name: String,
    pub url: String,
    pub enabled: bool,
    pub connected: bool,
    pub last_error: Option<String>,
    pub tool_count: usize,
}
