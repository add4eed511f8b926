// SPDX-License-Identifier: MIT
use regex::Regex;

use agentflow_model::ToolCall;

/// A single node's entry/exit, emitted only when debug mode is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Started,
    Completed,
}

/// Typed event sequence emitted per user turn, as a closed set. Finite,
/// ordered, non-restartable. Front-ends MUST ignore unknown
/// variants for forward compatibility — in Rust that discipline lives in
/// the consumer's `match _ => {}` arm, since the enum itself is closed.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    WorkflowStep { step: String, status: StepStatus },
    /// First time tool calls appear in a turn. `debug_mode` mirrors the
    /// caller's debug flag so the front-end can decide whether to also
    /// expect `WorkflowStep` events.
    ToolsPending { tool_calls: Vec<ToolCall>, debug_mode: bool },
    ToolExecuting { tool_name: String },
    /// The final reasoning pass produced text after a tool loop.
    AiResponseReady,
    /// A chunk of the finalized, formatted answer.
    Text(String),
    StreamingComplete { final_response: String },
    Error(String),
}

/// Split the formatted answer line-by-line, and within a line by a token
/// regex that keeps Markdown runs (`**…**`, `*…*`, `` `…` ``) intact as
/// single tokens. The first token of a line is
/// emitted verbatim; subsequent tokens carry a single leading space. A
/// `"\n"` text event separates lines.
pub fn chunk_text(formatted: &str) -> Vec<AgentEvent> {
    let token_re = Regex::new(r"\*\*[^*\n]+\*\*|\*[^*\n]+\*|`[^`\n]+`|\S+").unwrap();
    let lines: Vec<&str> = formatted.split('\n').collect();
    let mut events = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let mut first = true;
        for m in token_re.find_iter(line) {
            let token = m.as_str();
            if first {
                events.push(AgentEvent::Text(token.to_string()));
                first = false;
            } else {
                events.push(AgentEvent::Text(format!(" {token}")));
            }
        }
        if i + 1 < lines.len() {
            events.push(AgentEvent::Text("\n".to_string()));
        }
    }
    events
}
