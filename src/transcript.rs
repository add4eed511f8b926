// SPDX-License-Identifier: MIT
//! Markdown transcript writer. Plain text, no colour or spinners — terminal
//! rendering is out of scope.

use std::path::{Path, PathBuf};

use agentflow_model::Message;
use chrono::Local;

/// Ensure `path` ends in `.md`, appending the suffix if missing.
pub fn with_md_suffix(path: &Path) -> PathBuf {
    if path.extension().and_then(|e| e.to_str()) == Some("md") {
        path.to_path_buf()
    } else {
        let mut s = path.as_os_str().to_owned();
        s.push(".md");
        PathBuf::from(s)
    }
}

/// One user/AI exchange, as it will appear in the transcript.
struct Turn {
    user: String,
    ai: String,
}

/// Group a turn-by-turn history into `(user, ai)` pairs. Each turn's answer
/// is the text of the *last* Assistant message appended before the next
/// User message — i.e. the final, post-tool-loop response, not any
/// intermediate tool-call-bearing Assistant message.
fn group_turns(messages: &[Message]) -> Vec<Turn> {
    let mut turns = Vec::new();
    let mut current_user: Option<String> = None;
    let mut current_ai = String::new();

    for message in messages {
        match message {
            Message::System { .. } | Message::ToolResult { .. } => {}
            Message::User { content } => {
                if let Some(user) = current_user.take() {
                    turns.push(Turn { user, ai: std::mem::take(&mut current_ai) });
                }
                current_user = Some(content.clone());
            }
            Message::Assistant { content, .. } => {
                current_ai = content.clone();
            }
        }
    }
    if let Some(user) = current_user {
        turns.push(Turn { user, ai: current_ai });
    }
    turns
}

/// Render the transcript document for `messages`.
pub fn render(messages: &[Message]) -> String {
    let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S");
    let mut out = format!("# AI 대화 기록\n\n**생성일시**: {generated_at}\n\n---\n");

    for turn in group_turns(messages) {
        out.push_str(&format!("\n**사용자**: {}\n\n**AI**: {}\n", turn.user, turn.ai));
    }
    out
}

/// Write the transcript for `messages` to `path`, auto-suffixing `.md`.
/// Returns the path actually written to.
pub fn save(messages: &[Message], path: &Path) -> std::io::Result<PathBuf> {
    let target = with_md_suffix(path);
    std::fs::write(&target, render(messages))?;
    Ok(target)
}
