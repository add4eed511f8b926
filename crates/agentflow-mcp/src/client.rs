// SPDX-License-Identifier: MIT
use std::sync::Arc;

use agentflow_tools::ToolDescriptor;

use crate::config::RemoteServer;
use crate::error::McpError;
use crate::registry::{RemoteRegistry, RemoteServerStatus};

/// Client-facing surface for the remote tool-provider substrate.
///
/// Cheaply cloneable — all state lives behind the shared [`RemoteRegistry`],
/// so cloning shares one connection pool rather than duplicating it.
#[derive(Clone)]
pub struct McpClient {
    registry: Arc<RemoteRegistry>,
}

impl McpClient {
    pub fn new() -> Self {
        Self { registry: Arc::new(RemoteRegistry::new()) }
    }

    /// Validate and store the configured servers.
    pub async fn configure(&self, servers: Vec<RemoteServer>) {
        self.registry.configure(servers).await;
    }

    /// Connect to every enabled server. `Ok(())` if at least one connected;
    /// zero connections (including the case of no enabled servers at all)
    /// is treated as a caller error.
    pub async fn initialize(&self) -> Result<(), McpError> {
        let connected = self.registry.initialize().await?;
        if connected == 0 {
            return Err(McpError::ServerUnavailable("no remote server connected".to_string()));
        }
        Ok(())
    }

    pub async fn tools(&self) -> Vec<ToolDescriptor> {
        self.registry.tools().await
    }

    pub async fn invoke(&self, server_name: &str, tool_name: &str, args: serde_json::Value) -> Result<String, McpError> {
        self.registry.invoke(server_name, tool_name, args).await
    }

    pub async fn statuses(&self) -> Vec<RemoteServerStatus> {
        self.registry.statuses().await
    }

    /// Release transport resources. Idempotent.
    pub async fn close(&self) {
        self.registry.close().await;
    }
}

impl Default for McpClient {
    fn default() -> Self {
        Self::new()
    }
}
