// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_tool_rounds() -> u32 {
    8
}

/// Top-level configuration document, matching the live `settings.yaml` schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub chatbot: ChatbotConfig,
    #[serde(default)]
    pub mcp_servers: Vec<McpServerConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub development: DevelopmentConfig,
    /// Maximum number of `generate_response -> call_tools` round trips per
    /// user turn. Not part of the bundled sample's YAML keys; supplied here
    /// as an ambient engine knob with a conservative default.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai: OpenAiConfig::default(),
            chatbot: ChatbotConfig::default(),
            mcp_servers: Vec::new(),
            logging: LoggingConfig::default(),
            development: DevelopmentConfig::default(),
            max_tool_rounds: default_max_tool_rounds(),
        }
    }
}

/// `openai:` section — LLM capability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_true")]
    pub streaming: bool,
    /// Base URL override for OpenAI-compatible endpoints (Ollama,
    /// OpenRouter, vLLM, etc). Required to make the OpenAI-compatible
    /// driver usable against anything other than api.openai.com; absent ->
    /// the provider default.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            streaming: true,
            base_url: None,
        }
    }
}

/// `chatbot:` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatbotConfig {
    #[serde(default = "default_chatbot_name")]
    pub name: String,
    #[serde(default)]
    pub welcome_message: String,
    #[serde(default)]
    pub system_prompt: String,
}

fn default_chatbot_name() -> String {
    "agentflow".to_string()
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            name: default_chatbot_name(),
            welcome_message: String::new(),
            system_prompt: String::new(),
        }
    }
}

/// One entry of `mcp_servers:` — a remote tool-provider server, the
/// config-file-facing subset of `RemoteServer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServerConfig {
    pub name: String,
    pub url: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_timeout_ms")]
    pub timeout: u64,
    #[serde(default)]
    pub headers: std::collections::HashMap<String, String>,
}

/// `logging:` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file_enabled: bool,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub rotation: Option<String>,
    #[serde(default)]
    pub retention: Option<u32>,
    #[serde(default)]
    pub compression: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file_enabled: false,
            file_path: None,
            rotation: None,
            retention: None,
            compression: false,
        }
    }
}

/// `development:` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevelopmentConfig {
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub verbose: bool,
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_openai_defaults() {
        let c = Config::default();
        assert_eq!(c.openai.model, "gpt-4o-mini");
        assert!(c.openai.temperature > 0.0 && c.openai.temperature < 2.0);
        assert!(c.openai.streaming);
        assert!(c.openai.api_key.is_empty());
    }

    #[test]
    fn default_max_tool_rounds_matches_spec_default() {
        assert_eq!(Config::default().max_tool_rounds, 8);
    }

    #[test]
    fn mcp_server_default_timeout_matches_spec() {
        let yaml = "name: s1\nurl: http://localhost:9000";
        let s: McpServerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(s.timeout, 30_000);
        assert!(s.enabled);
    }

    #[test]
    fn config_round_trips_through_yaml() {
        let c = Config::default();
        let text = serde_yaml::to_string(&c).unwrap();
        let back: Config = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back.openai.model, c.openai.model);
    }
}
