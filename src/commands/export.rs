// SPDX-License-Identifier: MIT
use std::path::PathBuf;

use agentflow_core::{build_graph, to_json, to_mermaid, GraphToolInfo};
use agentflow_model::{CompletionRequest, Message, ModelProvider, ResponseEvent};
use agentflow_tools::ToolOrigin;
use anyhow::Result;
use futures::StreamExt;

use crate::cli::ExportFormatArg;
use crate::runtime::bootstrap;

const CANNED_DESCRIPTION: &str = "A deterministic agentic loop: normalize the input, reason with \
the model, run any requested tools, loop back until the model stops asking for tools, then \
format the final answer.";

/// `agent export` subcommand: emit the static workflow graph as Mermaid or
/// JSON, with no behavioral coupling to the engine.
pub async fn run(
    config_path: Option<PathBuf>,
    format: ExportFormatArg,
    output: Option<PathBuf>,
    ai_description: bool,
) -> Result<()> {
    let config = agentflow_config::load(config_path.as_deref())?;
    let runtime = bootstrap(&config).await;
    let has_tools = !runtime.catalog.entries().is_empty();
    let graph = build_graph(has_tools);

    let rendered = match format {
        ExportFormatArg::Mermaid => {
            let description =
                if ai_description { Some(generate_description(runtime.model.as_ref(), has_tools).await) } else { None };
            to_mermaid(&graph, description.as_deref())
        }
        ExportFormatArg::Json => {
            let tools: Vec<GraphToolInfo> = runtime
                .catalog
                .entries()
                .iter()
                .map(|d| GraphToolInfo {
                    name: d.name.clone(),
                    description: d.description.clone(),
                    origin: match &d.origin {
                        ToolOrigin::Local => "local".to_string(),
                        ToolOrigin::Remote { server_name } => format!("remote:{server_name}"),
                    },
                })
                .collect();
            let description = if ai_description {
                generate_description(runtime.model.as_ref(), has_tools).await
            } else {
                CANNED_DESCRIPTION.to_string()
            };
            serde_json::to_string_pretty(&to_json(&graph, &tools, "agentflow", &description))?
        }
    };

    match output {
        Some(path) => std::fs::write(&path, rendered)?,
        None => println!("{rendered}"),
    }

    Ok(())
}

/// Ask the configured model for a one-shot prose description of the graph.
/// Falls back to [`CANNED_DESCRIPTION`] on any failure (unreachable
/// provider, empty response) so `--ai-description` never hard-fails the
/// export.
async fn generate_description(model: &dyn ModelProvider, has_tools: bool) -> String {
    let prompt = format!(
        "In two sentences, describe a CLI agent's workflow graph with nodes process_input, \
         generate_response{}, format_output{}.",
        if has_tools { ", call_tools" } else { "" },
        if has_tools { " (call_tools loops back to generate_response)" } else { "" },
    );
    let req = CompletionRequest { messages: vec![Message::user(prompt)], tools: vec![], stream: true };

    let Ok(mut stream) = model.complete(req).await else {
        return CANNED_DESCRIPTION.to_string();
    };

    let mut text = String::new();
    while let Some(event) = stream.next().await {
        if let Ok(ResponseEvent::TextDelta(delta)) = event {
            text.push_str(&delta);
        }
    }
    if text.trim().is_empty() {
        CANNED_DESCRIPTION.to_string()
    } else {
        text
    }
}
