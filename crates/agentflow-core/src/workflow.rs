// SPDX-License-Identifier: MIT
use std::collections::BTreeMap;

use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::warn;

use agentflow_catalog::Catalog;
use agentflow_model::{CompletionRequest, Message, ModelProvider, ToolCall, ToolSchema};

use crate::cancel::CancelHandle;
use crate::events::{chunk_text, AgentEvent, StepStatus};
use crate::format::format_output;
use crate::state::AgentState;

/// Outcome of one call to [`run_turn`]: either the turn ran to completion
/// (possibly via `LoopLimitExceeded`) or it was cancelled mid-flight at one
/// of its suspension points.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The turn's rewritten message history, for the session orchestrator
    /// to swap into `ConversationState`.
    Completed(Vec<Message>),
    /// Cancelled before producing a final answer. The caller must not
    /// persist any part of this turn — `ConversationState` stays as it was
    /// before the turn started.
    Cancelled,
}

/// Generic apology text for an LLM failure that must not retry.
const LLM_FAILURE_APOLOGY: &str = "Sorry, I ran into a problem generating a response.";

#[derive(Default)]
struct PartialCall {
    id: String,
    name: String,
    arguments: String,
}

/// `process_input` node: inject the system message once, then append the
/// turn's user input.
pub(crate) fn process_input(state: &mut AgentState) {
    if state.messages.is_empty() {
        state.messages.push(Message::system(state.system_prompt.clone()));
    }
    state.messages.push(Message::user(state.user_input.clone()));
}

fn tool_schemas(catalog: &Catalog) -> Vec<ToolSchema> {
    catalog
        .entries()
        .iter()
        .map(|d| ToolSchema { name: d.name.clone(), description: d.description.clone(), parameters: d.args_schema.clone() })
        .collect()
}

/// `generate_response` node. Tool-call extraction across the various shapes
/// a provider might send them in (a structured field, provider-specific
/// kwargs, or a scan of recent messages) is implemented inside
/// `agentflow-model`'s provider drivers, which collapse every provider
/// shape into the single normalized `ResponseEvent::ToolCall` stream
/// consumed here.
pub(crate) async fn generate_response(state: &mut AgentState, model: &dyn ModelProvider, tools: &[ToolSchema]) {
    let req = CompletionRequest { messages: state.messages.clone(), tools: tools.to_vec(), stream: true };

    let mut stream = match model.complete(req).await {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "LLM invocation failed");
            state.messages.push(Message::assistant(LLM_FAILURE_APOLOGY));
            state.tool_calls.clear();
            return;
        }
    };

    let mut text = String::new();
    let mut calls: BTreeMap<u32, PartialCall> = BTreeMap::new();
    let mut failed = false;

    while let Some(item) = stream.next().await {
        match item {
            Ok(agentflow_model::ResponseEvent::TextDelta(delta)) => text.push_str(&delta),
            Ok(agentflow_model::ResponseEvent::ToolCall { index, id, name, arguments }) => {
                let entry = calls.entry(index).or_default();
                if !id.is_empty() {
                    entry.id = id;
                }
                if !name.is_empty() {
                    entry.name = name;
                }
                entry.arguments.push_str(&arguments);
            }
            Ok(agentflow_model::ResponseEvent::Usage { .. }) => {}
            Ok(agentflow_model::ResponseEvent::Done) => break,
            Ok(agentflow_model::ResponseEvent::MaxTokens) => {
                warn!("response truncated at max_tokens");
                break;
            }
            Ok(agentflow_model::ResponseEvent::Error(msg)) => {
                warn!(error = %msg, "LLM stream reported an error");
                failed = true;
                break;
            }
            Err(e) => {
                warn!(error = %e, "LLM stream transport error");
                failed = true;
                break;
            }
        }
    }

    if failed {
        state.messages.push(Message::assistant(LLM_FAILURE_APOLOGY));
        state.tool_calls.clear();
        return;
    }

    let tool_calls: Vec<ToolCall> = calls
        .into_values()
        .enumerate()
        .map(|(position, partial)| {
            let id = if partial.id.is_empty() { format!("call_{position}") } else { partial.id };
            let args = serde_json::from_str(&partial.arguments).unwrap_or_else(|_| serde_json::json!({}));
            ToolCall { id, name: partial.name, args }
        })
        .collect();

    state.messages.push(Message::assistant_with_tool_calls(text, tool_calls.clone()));
    state.tool_calls = tool_calls;
}

/// `call_tools` node. Executions are sequential in `ToolCall` order —
/// deliberately NOT `tokio::spawn`-parallel — so that `ToolResult`
/// positions in `messages` match `ToolCall` positions.
pub(crate) async fn call_tools(state: &mut AgentState, catalog: &Catalog, tx: &mpsc::Sender<AgentEvent>) {
    let pending = std::mem::take(&mut state.tool_calls);
    for call in pending {
        let _ = tx.send(AgentEvent::ToolExecuting { tool_name: call.name.clone() }).await;
        let tools_call = agentflow_tools::ToolCall { id: call.id.clone(), name: call.name.clone(), args: call.args.clone() };
        let output = catalog.invoke(&tools_call).await;
        state.messages.push(Message::tool_result(output.call_id, output.content));
    }
}

/// `format_output` node: shape the most recently appended Assistant
/// message's text through the deterministic Markdown pipeline.
pub(crate) fn format_output_node(state: &mut AgentState) {
    let last_assistant_text = state
        .messages
        .iter()
        .rev()
        .find(|m| m.is_assistant())
        .map(|m| m.text().to_string())
        .unwrap_or_default();
    state.ai_response = format_output(&last_assistant_text);
}

async fn emit_step(tx: &mpsc::Sender<AgentEvent>, step: &str, status: StepStatus, debug: bool) {
    if debug {
        let _ = tx.send(AgentEvent::WorkflowStep { step: step.to_string(), status }).await;
    }
}

/// Run one full user turn through the state machine, enforcing the bounded
/// tool loop and driving the event stream. `cancel` is checked at every
/// suspension point (the LLM call, each tool invocation); a cancellation
/// mid-flight emits a terminal `error` event and returns
/// [`TurnOutcome::Cancelled`] without ever reaching `format_output`.
#[allow(clippy::too_many_arguments)]
pub async fn run_turn(
    model: &dyn ModelProvider,
    catalog: &Catalog,
    history: Vec<Message>,
    system_prompt: &str,
    user_input: &str,
    max_rounds: u32,
    debug: bool,
    tx: &mpsc::Sender<AgentEvent>,
    cancel: &CancelHandle,
) -> TurnOutcome {
    let mut state = AgentState::new(history, system_prompt, user_input);
    let tools = tool_schemas(catalog);

    emit_step(tx, "process_input", StepStatus::Started, debug).await;
    process_input(&mut state);
    emit_step(tx, "process_input", StepStatus::Completed, debug).await;

    let mut tools_pending_sent = false;
    let mut rounds: u32 = 0;
    let mut loop_limit_hit = false;

    loop {
        emit_step(tx, "generate_response", StepStatus::Started, debug).await;
        tokio::select! {
            _ = generate_response(&mut state, model, &tools) => {}
            _ = cancel.cancelled() => {
                let _ = tx.send(AgentEvent::Error("turn cancelled".to_string())).await;
                return TurnOutcome::Cancelled;
            }
        }
        emit_step(tx, "generate_response", StepStatus::Completed, debug).await;

        if state.last_assistant_tool_calls().is_empty() {
            break;
        }

        if rounds >= max_rounds {
            loop_limit_hit = true;
            break;
        }
        rounds += 1;

        if !tools_pending_sent {
            let _ = tx
                .send(AgentEvent::ToolsPending { tool_calls: state.tool_calls.clone(), debug_mode: debug })
                .await;
            tools_pending_sent = true;
        }

        emit_step(tx, "call_tools", StepStatus::Started, debug).await;
        tokio::select! {
            _ = call_tools(&mut state, catalog, tx) => {}
            _ = cancel.cancelled() => {
                let _ = tx.send(AgentEvent::Error("turn cancelled".to_string())).await;
                return TurnOutcome::Cancelled;
            }
        }
        emit_step(tx, "call_tools", StepStatus::Completed, debug).await;
    }

    emit_step(tx, "format_output", StepStatus::Started, debug).await;
    format_output_node(&mut state);
    emit_step(tx, "format_output", StepStatus::Completed, debug).await;

    if loop_limit_hit {
        let _ = tx
            .send(AgentEvent::Error(format!(
                "tool loop exceeded {max_rounds} round trips; best answer: {}",
                state.ai_response
            )))
            .await;
        return TurnOutcome::Completed(state.messages);
    }

    if tools_pending_sent {
        let _ = tx.send(AgentEvent::AiResponseReady).await;
    }

    for event in chunk_text(&state.ai_response) {
        let _ = tx.send(event).await;
    }
    let _ = tx
        .send(AgentEvent::StreamingComplete { final_response: state.ai_response.clone() })
        .await;

    TurnOutcome::Completed(state.messages)
}
