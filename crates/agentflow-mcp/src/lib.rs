// SPDX-License-Identifier: MIT
mod client;
mod config;
mod error;
mod registry;

pub use client::McpClient;
pub use config::RemoteServer;
pub use error::McpError;
pub use registry::{RemoteRegistry, RemoteServerStatus};
