// SPDX-License-Identifier: MIT
use std::path::PathBuf;

use agentflow_tools::ToolOrigin;
use anyhow::Result;
use serde_json::json;

use crate::cli::OutputFormatArg;
use crate::runtime::bootstrap;

/// `info` subcommand: version, tool table, remote-server table. Additionally
/// prints the resolved config path and the active tool-round bound.
pub async fn run(config_path: Option<PathBuf>, output: OutputFormatArg) -> Result<()> {
    let config = agentflow_config::load(config_path.as_deref())?;
    let resolved_path = config_path.unwrap_or_else(agentflow_config::default_config_path);
    let max_tool_rounds = config.max_tool_rounds;

    let runtime = bootstrap(&config).await;
    let statuses = runtime.remote.statuses().await;

    let tools: Vec<_> = runtime
        .catalog
        .entries()
        .iter()
        .map(|d| {
            let origin = match &d.origin {
                ToolOrigin::Local => "local".to_string(),
                ToolOrigin::Remote { server_name } => format!("remote:{server_name}"),
            };
            json!({ "name": d.name, "description": d.description, "origin": origin, "enabled": d.enabled })
        })
        .collect();

    let servers: Vec<_> = statuses
        .iter()
        .map(|s| {
            json!({
                "name": s.name,
                "url": s.url,
                "enabled": s.enabled,
                "status": if s.connected { "연결됨" } else { "연결 실패" },
                "tool_count": s.tool_count,
                "last_error": s.last_error,
            })
        })
        .collect();

    let document = json!({
        "version": env!("CARGO_PKG_VERSION"),
        "config_path": resolved_path.display().to_string(),
        "max_tool_rounds": max_tool_rounds,
        "tools": tools,
        "remote_servers": servers,
    });

    match output {
        OutputFormatArg::Json => println!("{}", serde_json::to_string_pretty(&document)?),
        OutputFormatArg::Yaml => println!("{}", serde_yaml::to_string(&document)?),
        OutputFormatArg::Text => print_text(&document),
    }

    Ok(())
}

fn print_text(document: &serde_json::Value) {
    println!("agentflow {}", document["version"].as_str().unwrap_or("?"));
    println!("config: {}", document["config_path"].as_str().unwrap_or("?"));
    println!("max tool rounds: {}", document["max_tool_rounds"]);

    println!("\nTools:");
    let empty = Vec::new();
    for tool in document["tools"].as_array().unwrap_or(&empty) {
        println!(
            "  {:<24} [{}] {}",
            tool["name"].as_str().unwrap_or(""),
            tool["origin"].as_str().unwrap_or(""),
            tool["description"].as_str().unwrap_or(""),
        );
    }

    println!("\nRemote servers:");
    let servers = document["remote_servers"].as_array().unwrap_or(&empty);
    if servers.is_empty() {
        println!("  (none configured)");
    }
    for server in servers {
        println!(
            "  {:<16} {:<32} {} ({} tools)",
            server["name"].as_str().unwrap_or(""),
            server["url"].as_str().unwrap_or(""),
            server["status"].as_str().unwrap_or(""),
            server["tool_count"],
        );
    }
}
