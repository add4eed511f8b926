// SPDX-License-Identifier: MIT
use std::path::PathBuf;

/// Closed set of configuration-surface error kinds.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found at {0}")]
    Missing(PathBuf),

    #[error("config file at {path} is invalid: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("openai.api_key is missing or a placeholder; run `agentflow setup` and edit {0}")]
    ApiKeyMissing(PathBuf),
}
