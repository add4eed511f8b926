// SPDX-License-Identifier: MIT
use std::path::PathBuf;

use anyhow::Result;

/// `setup` subcommand: copy the sample config template to the live config
/// path if absent.
pub fn run(config_path: Option<PathBuf>) -> Result<()> {
    match agentflow_config::setup(config_path.as_deref())? {
        Some(path) => println!("wrote sample config to {}", path.display()),
        None => println!("config already exists; left untouched"),
    }
    Ok(())
}
