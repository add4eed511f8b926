// SPDX-License-Identifier: MIT
use std::sync::Arc;

use tokio::sync::mpsc;

use agentflow_catalog::Catalog;
use agentflow_model::{Message, ModelProvider};

use crate::cancel::CancelHandle;
use crate::events::AgentEvent;
use crate::state::ConversationState;
use crate::workflow::{run_turn, TurnOutcome};

/// One of zero or more lines a [`Session`] reads from in continuous mode.
/// The concrete terminal/pipe implementation lives at the CLI boundary —
/// this crate only encodes the branching policy.
pub trait InputSource {
    /// True when the underlying stream is an interactive terminal.
    fn is_interactive(&self) -> bool;
    /// Read the next line, printing `prompt` first if interactive. `None`
    /// signals EOF.
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// Where continuous mode echoes piped input lines back to, so transcripts
/// stay faithful under piping.
pub trait OutputSink {
    fn echo_line(&mut self, line: &str);
}

const BYE_SENTINEL: &str = "/bye";

/// Owns the running conversation history and the wired-together
/// catalog/model, and exposes one-shot / continuous turn execution.
pub struct Session {
    pub conversation: ConversationState,
    model: Arc<dyn ModelProvider>,
    catalog: Catalog,
    system_prompt: String,
    max_rounds: u32,
}

impl Session {
    pub fn new(model: Arc<dyn ModelProvider>, catalog: Catalog, system_prompt: impl Into<String>, max_rounds: u32) -> Self {
        Self { conversation: ConversationState::new(), model, catalog, system_prompt: system_prompt.into(), max_rounds }
    }

    /// Run one user turn through the workflow engine, swapping the
    /// resulting history into `self.conversation`. Events stream through
    /// `tx` as they occur; the caller decides whether to render them
    /// incrementally (streaming) or buffer them until the terminal event
    /// (non-streaming, buffer until the terminal event and render once).
    pub async fn submit(&mut self, user_input: &str, debug: bool, tx: &mpsc::Sender<AgentEvent>) {
        let history = std::mem::take(&mut self.conversation.messages);
        let snapshot = history.clone();

        let cancel = CancelHandle::new();
        let watcher_cancel = cancel.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                watcher_cancel.cancel();
            }
        });

        let outcome = run_turn(
            self.model.as_ref(),
            &self.catalog,
            history,
            &self.system_prompt,
            user_input,
            self.max_rounds,
            debug,
            tx,
            &cancel,
        )
        .await;
        watcher.abort();

        match outcome {
            TurnOutcome::Completed(updated) => self.conversation.replace(updated),
            TurnOutcome::Cancelled => self.conversation.replace(snapshot),
        }
    }

    /// One-shot mode: a single turn against a fresh
    /// conversation. Callers that want a persisted transcript read
    /// `self.conversation.messages` afterward.
    pub async fn run_once(&mut self, user_input: &str, debug: bool, tx: &mpsc::Sender<AgentEvent>) {
        self.conversation = ConversationState::new();
        self.submit(user_input, debug, tx).await;
    }

    /// Continuous mode: loop reading from `input`, running one
    /// turn per non-empty, non-sentinel line, until `"/bye"` or EOF.
    pub async fn run_continuous<I: InputSource, O: OutputSink>(
        &mut self,
        input: &mut I,
        output: &mut O,
        debug: bool,
        tx: &mpsc::Sender<AgentEvent>,
    ) {
        loop {
            let Some(line) = input.read_line("> ") else {
                break;
            };
            if !input.is_interactive() {
                output.echo_line(&line);
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed == BYE_SENTINEL {
                break;
            }

            self.submit(trimmed, debug, tx).await;
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.conversation.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentflow_mcp::McpClient;
    use agentflow_model::MockProvider;
    use agentflow_tools::ToolRegistry;

    async fn test_catalog() -> Catalog {
        Catalog::build(Arc::new(ToolRegistry::new()), McpClient::new()).await
    }

    struct ScriptedInput {
        lines: Vec<String>,
        interactive: bool,
    }

    impl InputSource for ScriptedInput {
        fn is_interactive(&self) -> bool {
            self.interactive
        }
        fn read_line(&mut self, _prompt: &str) -> Option<String> {
            if self.lines.is_empty() {
                None
            } else {
                Some(self.lines.remove(0))
            }
        }
    }

    #[derive(Default)]
    struct RecordingOutput {
        echoed: Vec<String>,
    }

    impl OutputSink for RecordingOutput {
        fn echo_line(&mut self, line: &str) {
            self.echoed.push(line.to_string());
        }
    }

    #[tokio::test]
    async fn run_once_replaces_conversation_with_single_turn() {
        let catalog = test_catalog().await;
        let mut session = Session::new(Arc::new(MockProvider::new()), catalog, "sys", 8);
        let (tx, mut rx) = mpsc::channel(32);
        let handle = tokio::spawn(async move {
            while rx.recv().await.is_some() {}
        });
        session.run_once("Hello", false, &tx).await;
        drop(tx);
        handle.await.unwrap();

        assert_eq!(session.history().len(), 3);
        assert!(session.history()[0].is_system());
    }

    #[tokio::test]
    async fn continuous_mode_stops_on_bye_sentinel() {
        let catalog = test_catalog().await;
        let mut session = Session::new(Arc::new(MockProvider::new()), catalog, "sys", 8);
        let mut input = ScriptedInput { lines: vec!["hi".into(), "/bye".into(), "never reached".into()], interactive: true };
        let mut output = RecordingOutput::default();
        let (tx, mut rx) = mpsc::channel(128);
        let handle = tokio::spawn(async move {
            while rx.recv().await.is_some() {}
        });

        session.run_continuous(&mut input, &mut output, false, &tx).await;
        drop(tx);
        handle.await.unwrap();

        assert_eq!(input.lines, vec!["never reached".to_string()]);
        assert_eq!(session.history().len(), 3); // one turn: System, User, Assistant
    }

    #[tokio::test]
    async fn continuous_mode_skips_empty_input() {
        let catalog = test_catalog().await;
        let mut session = Session::new(Arc::new(MockProvider::new()), catalog, "sys", 8);
        let mut input = ScriptedInput { lines: vec!["".into(), "   ".into(), "/bye".into()], interactive: true };
        let mut output = RecordingOutput::default();
        let (tx, mut rx) = mpsc::channel(32);
        let handle = tokio::spawn(async move {
            while rx.recv().await.is_some() {}
        });

        session.run_continuous(&mut input, &mut output, false, &tx).await;
        drop(tx);
        handle.await.unwrap();

        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn continuous_mode_terminates_quietly_on_eof() {
        let catalog = test_catalog().await;
        let mut session = Session::new(Arc::new(MockProvider::new()), catalog, "sys", 8);
        let mut input = ScriptedInput { lines: vec!["hi".into()], interactive: false };
        let mut output = RecordingOutput::default();
        let (tx, mut rx) = mpsc::channel(32);
        let handle = tokio::spawn(async move {
            while rx.recv().await.is_some() {}
        });

        session.run_continuous(&mut input, &mut output, false, &tx).await;
        drop(tx);
        handle.await.unwrap();

        assert_eq!(output.echoed, vec!["hi".to_string()]);
        assert_eq!(session.history().len(), 3);
    }

    #[tokio::test]
    async fn piped_input_is_echoed_exactly_once() {
        let catalog = test_catalog().await;
        let mut session = Session::new(Arc::new(MockProvider::new()), catalog, "sys", 8);
        let mut input = ScriptedInput { lines: vec!["one".into(), "two".into()], interactive: false };
        let mut output = RecordingOutput::default();
        let (tx, mut rx) = mpsc::channel(64);
        let handle = tokio::spawn(async move {
            while rx.recv().await.is_some() {}
        });

        session.run_continuous(&mut input, &mut output, false, &tx).await;
        drop(tx);
        handle.await.unwrap();

        assert_eq!(output.echoed, vec!["one".to_string(), "two".to_string()]);
    }
}
