// SPDX-License-Identifier: MIT

/// Closed set of remote tool-provider error kinds.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("failed to connect to server {server}: {reason}")]
    Connect { server: String, reason: String },

    #[error("tool invocation on {server}/{tool} failed: {reason}")]
    Invocation { server: String, tool: String, reason: String },

    #[error("server unavailable: {0}")]
    ServerUnavailable(String),

    #[error("request to {server} timed out after {timeout_ms}ms")]
    Timeout { server: String, timeout_ms: u64 },
}
