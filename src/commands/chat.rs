// SPDX-License-Identifier: MIT
use std::io::Write;
use std::path::PathBuf;

use agentflow_core::{AgentEvent, Session};
use anyhow::Result;
use tokio::sync::mpsc;

use crate::io::{StdinSource, StdoutSink};
use crate::runtime::{bootstrap, resolve_system_prompt};
use crate::transcript;

/// `chat` subcommand. One-shot if `question` is given or `once` is set;
/// otherwise continuous until `/bye` or EOF.
#[allow(clippy::too_many_arguments)]
pub async fn run(
    config_path: Option<PathBuf>,
    question: Option<String>,
    once: bool,
    no_stream: bool,
    save: Option<PathBuf>,
    debug: bool,
) -> Result<()> {
    let config = agentflow_config::check_settings(config_path.as_deref())?;
    let max_rounds = config.max_tool_rounds;
    let streaming = config.openai.streaming && !no_stream;
    let system_prompt = resolve_system_prompt(&config);

    let runtime = bootstrap(&config).await;
    let mut session = Session::new(runtime.model, runtime.catalog, system_prompt, max_rounds);

    let (tx, rx) = mpsc::channel(128);
    let render_handle = tokio::spawn(render_events(rx, streaming));

    if once || question.is_some() {
        session.run_once(&question.unwrap_or_default(), debug, &tx).await;
    } else {
        let mut input = StdinSource::new();
        let mut output = StdoutSink;
        session.run_continuous(&mut input, &mut output, debug, &tx).await;
    }
    drop(tx);
    let _ = render_handle.await;

    if let Some(path) = &save {
        // Transcript save failures are reported but never change the exit
        // code for `chat`.
        match transcript::save(session.history(), path) {
            Ok(written) => eprintln!("transcript saved to {}", written.display()),
            Err(e) => eprintln!("failed to save transcript: {e}"),
        }
    }

    Ok(())
}

/// Render the event stream to the terminal. In streaming mode, `Text`
/// chunks print as they arrive; in non-streaming mode they are buffered and
/// the full answer (plus a tool-call summary line, if any) prints once at
/// `StreamingComplete` as a single summary block.
async fn render_events(mut rx: mpsc::Receiver<AgentEvent>, streaming: bool) {
    let mut buffered = String::new();
    let mut tool_summary: Vec<String> = Vec::new();

    while let Some(event) = rx.recv().await {
        match event {
            AgentEvent::WorkflowStep { step, status } => {
                eprintln!("[workflow] {step} {status:?}");
            }
            AgentEvent::ToolsPending { tool_calls, .. } => {
                tool_summary = tool_calls.iter().map(|c| c.name.clone()).collect();
            }
            AgentEvent::ToolExecuting { tool_name } => {
                if streaming {
                    eprintln!("[tool] running {tool_name}");
                }
            }
            AgentEvent::AiResponseReady => {}
            AgentEvent::Text(chunk) => {
                if streaming {
                    print!("{chunk}");
                    let _ = std::io::stdout().flush();
                } else {
                    buffered.push_str(&chunk);
                }
            }
            AgentEvent::StreamingComplete { final_response } => {
                if streaming {
                    println!();
                } else {
                    if !tool_summary.is_empty() {
                        println!("[tools used: {}]", tool_summary.join(", "));
                    }
                    println!("{final_response}");
                }
                buffered.clear();
                tool_summary.clear();
            }
            AgentEvent::Error(message) => {
                eprintln!("error: {message}");
                buffered.clear();
                tool_summary.clear();
            }
        }
    }
}
