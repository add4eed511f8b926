// SPDX-License-Identifier: MIT
//! Wires the tool registry, remote tool-provider client, model driver, and
//! catalog together behind a single `Runtime` handle, constructed once at
//! startup and passed by reference rather than through module-level
//! singletons.

use std::sync::Arc;

use agentflow_catalog::Catalog;
use agentflow_config::Config;
use agentflow_mcp::{McpClient, RemoteServer};
use agentflow_model::{ModelProvider, OpenAiProvider};
use agentflow_tools::{GetCurrentTime, ToolRegistry};

/// Used when `chatbot.system_prompt` is blank, matching the bundled sample
/// config's default.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant with access to tools.";

fn remote_servers(config: &Config) -> Vec<RemoteServer> {
    config
        .mcp_servers
        .iter()
        .map(|s| RemoteServer {
            name: s.name.clone(),
            url: s.url.clone(),
            enabled: s.enabled,
            timeout_ms: s.timeout,
            headers: s.headers.clone(),
        })
        .collect()
}

fn local_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(GetCurrentTime).expect("built-in tool name is unique");
    registry
}

/// Everything `chat`/`info`/`agent export` need. `remote` is kept alongside
/// `catalog` (rather than folded away) so `info` can print per-server
/// connection status without the catalog having to expose it.
pub struct Runtime {
    pub model: Arc<dyn ModelProvider>,
    pub catalog: Catalog,
    pub remote: McpClient,
}

/// Configure and (best-effort) connect remote servers, merge the catalog,
/// and build the model driver.
///
/// `info` performs the same eager connect `chat` does, so its table reflects
/// live connection state. A remote server that fails discovery does not
/// abort this function — it only shows up as disconnected in `info`'s table
/// and absent from the catalog.
pub async fn bootstrap(config: &Config) -> Runtime {
    let remote = McpClient::new();
    remote.configure(remote_servers(config)).await;
    if !config.mcp_servers.is_empty() {
        if let Err(e) = remote.initialize().await {
            tracing::warn!(error = %e, "no remote tool-provider server connected");
        }
    }

    let registry = Arc::new(local_registry());
    let catalog = Catalog::build(registry, remote.clone()).await;

    let model: Arc<dyn ModelProvider> = Arc::new(OpenAiProvider::new(
        config.openai.model.clone(),
        Some(config.openai.api_key.clone()),
        config.openai.base_url.clone(),
        config.openai.max_tokens,
        config.openai.temperature,
    ));

    Runtime { model, catalog, remote }
}

/// Resolve the turn's system prompt, falling back to a sane default when the
/// config's `chatbot.system_prompt` is blank.
pub fn resolve_system_prompt(config: &Config) -> String {
    if config.chatbot.system_prompt.trim().is_empty() {
        DEFAULT_SYSTEM_PROMPT.to_string()
    } else {
        config.chatbot.system_prompt.clone()
    }
}
