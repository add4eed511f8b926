// SPDX-License-Identifier: MIT
use std::collections::HashMap;

/// A configured remote tool-provider endpoint: the static configuration
/// subset — runtime fields `connected`/`last_error`/`tools` live on
/// [`crate::registry::ServerState`].
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteServer {
    pub name: String,
    pub url: String,
    pub enabled: bool,
    pub timeout_ms: u64,
    pub headers: HashMap<String, String>,
}

impl RemoteServer {
    /// Validate the fields `configure` requires before accepting a server:
    /// non-empty name, http(s) URL, positive numeric timeout.
    pub fn is_well_formed(&self) -> bool {
        !self.name.is_empty()
            && (self.url.starts_with("http://") || self.url.starts_with("https://"))
            && self.timeout_ms > 0
    }
}
