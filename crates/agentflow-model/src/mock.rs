// SPDX-License-Identifier: MIT
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream;

use crate::{provider::ResponseStream, CompletionRequest, Message, ResponseEvent};

/// Deterministic mock provider for tests. Echoes the last user message back
/// as the assistant response.
#[derive(Default)]
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl crate::ModelProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<ResponseStream> {
        let reply = req
            .messages
            .iter()
            .rev()
            .find(|m| matches!(m, Message::User { .. }))
            .map(|m| m.text().to_string())
            .unwrap_or_else(|| "[no input]".to_string());

        let events: Vec<anyhow::Result<ResponseEvent>> = vec![
            Ok(ResponseEvent::TextDelta(format!("MOCK: {reply}"))),
            Ok(ResponseEvent::Usage { input_tokens: 10, output_tokens: 10 }),
            Ok(ResponseEvent::Done),
        ];
        Ok(Box::pin(stream::iter(events)))
    }
}

/// A pre-scripted mock provider. Each call to `complete` pops the next
/// response script from the front of the queue, letting tests specify exact
/// event sequences — including tool calls — without network access.
pub struct ScriptedMockProvider {
    scripts: Arc<Mutex<Vec<Vec<ResponseEvent>>>>,
    name: String,
    /// The last [`CompletionRequest`] seen by this provider, so tests can
    /// inspect what was sent (e.g. that a `ToolResult` was appended).
    pub last_request: Arc<Mutex<Option<CompletionRequest>>>,
    /// When true and exactly one script remains, `complete` replays it
    /// forever instead of draining the queue — for tests that need a model
    /// which keeps requesting the same tool call indefinitely.
    repeat_last: bool,
}

impl ScriptedMockProvider {
    /// `scripts`'s outer `Vec` is the ordered list of calls; the inner `Vec`
    /// is the sequence of events emitted for that call.
    pub fn new(scripts: Vec<Vec<ResponseEvent>>) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(scripts)),
            name: "scripted-mock".into(),
            last_request: Arc::new(Mutex::new(None)),
            repeat_last: false,
        }
    }

    /// Convenience: provider that always returns a single text reply.
    pub fn always_text(reply: impl Into<String>) -> Self {
        let r = reply.into();
        Self::new(vec![vec![
            ResponseEvent::TextDelta(r),
            ResponseEvent::Usage { input_tokens: 5, output_tokens: 5 },
            ResponseEvent::Done,
        ]])
    }

    /// Convenience: provider that returns a tool call on round 1, then a
    /// final text reply on round 2 — the canonical two-round agentic loop.
    pub fn tool_then_text(
        tool_id: impl Into<String>,
        tool_name: impl Into<String>,
        args_json: impl Into<String>,
        final_text: impl Into<String>,
    ) -> Self {
        Self::new(vec![
            vec![
                ResponseEvent::ToolCall {
                    index: 0,
                    id: tool_id.into(),
                    name: tool_name.into(),
                    arguments: args_json.into(),
                },
                ResponseEvent::Done,
            ],
            vec![
                ResponseEvent::TextDelta(final_text.into()),
                ResponseEvent::Usage { input_tokens: 5, output_tokens: 5 },
                ResponseEvent::Done,
            ],
        ])
    }

    /// Convenience: provider whose every call returns an error event,
    /// exercising `generate_response`'s on-failure apology path.
    pub fn always_failing(message: impl Into<String>) -> Self {
        let msg = message.into();
        Self::new(vec![vec![ResponseEvent::Error(msg)]])
    }

    /// Convenience: provider that requests the same tool call on every
    /// round, forever — exercises the bounded tool-call loop.
    pub fn always_requesting_tool(tool_name: impl Into<String>, args_json: impl Into<String>) -> Self {
        let mut provider = Self::new(vec![vec![
            ResponseEvent::ToolCall { index: 0, id: String::new(), name: tool_name.into(), arguments: args_json.into() },
            ResponseEvent::Done,
        ]]);
        provider.repeat_last = true;
        provider
    }
}

#[async_trait]
impl crate::ModelProvider for ScriptedMockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model_name(&self) -> &str {
        "scripted-mock-model"
    }

    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<ResponseStream> {
        *self.last_request.lock().unwrap() = Some(req);

        let mut scripts = self.scripts.lock().unwrap();
        let script = if scripts.is_empty() {
            vec![ResponseEvent::TextDelta("[scripted-mock: no more scripts]".into()), ResponseEvent::Done]
        } else if self.repeat_last && scripts.len() == 1 {
            scripts[0].clone()
        } else {
            scripts.remove(0)
        };
        let events: Vec<anyhow::Result<ResponseEvent>> = script.into_iter().map(Ok).collect();
        Ok(Box::pin(stream::iter(events)))
    }
}

/// A provider whose `complete` never resolves. Used to exercise cancellation
/// deterministically — a `tokio::select!` racing it against a cancel signal
/// always picks the cancel branch, with no timing-dependent flakiness.
#[derive(Default)]
pub struct HangingProvider;

#[async_trait]
impl crate::ModelProvider for HangingProvider {
    fn name(&self) -> &str {
        "hanging-mock"
    }

    fn model_name(&self) -> &str {
        "hanging-mock-model"
    }

    async fn complete(&self, _req: CompletionRequest) -> anyhow::Result<ResponseStream> {
        std::future::pending::<()>().await;
        unreachable!("HangingProvider::complete never resolves")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelProvider;

    #[tokio::test]
    async fn mock_provider_echoes_last_user_message() {
        let provider = MockProvider;
        let req = CompletionRequest {
            messages: vec![Message::user("hello")],
            ..Default::default()
        };
        let mut stream = provider.complete(req).await.unwrap();
        let mut text = String::new();
        while let Some(ev) = futures::StreamExt::next(&mut stream).await {
            if let ResponseEvent::TextDelta(d) = ev.unwrap() {
                text.push_str(&d);
            }
        }
        assert_eq!(text, "MOCK: hello");
    }

    #[tokio::test]
    async fn scripted_mock_pops_scripts_in_order() {
        let provider = ScriptedMockProvider::tool_then_text("c1", "get_current_time", "{}", "it is noon");
        let req = CompletionRequest::default();

        let mut first = provider.complete(req.clone()).await.unwrap();
        let ev = futures::StreamExt::next(&mut first).await.unwrap().unwrap();
        assert!(matches!(ev, ResponseEvent::ToolCall { .. }));

        let mut second = provider.complete(req).await.unwrap();
        let ev = futures::StreamExt::next(&mut second).await.unwrap().unwrap();
        assert_eq!(ev, ResponseEvent::TextDelta("it is noon".into()));
    }

    #[tokio::test]
    async fn always_requesting_tool_repeats_forever() {
        let provider = ScriptedMockProvider::always_requesting_tool("get_current_time", "{}");
        for _ in 0..5 {
            let mut stream = provider.complete(CompletionRequest::default()).await.unwrap();
            let ev = futures::StreamExt::next(&mut stream).await.unwrap().unwrap();
            assert!(matches!(ev, ResponseEvent::ToolCall { .. }));
        }
    }

    #[tokio::test]
    async fn scripted_mock_records_last_request() {
        let provider = ScriptedMockProvider::always_text("ok");
        let req = CompletionRequest { messages: vec![Message::user("ping")], ..Default::default() };
        let _ = provider.complete(req).await.unwrap();
        let recorded = provider.last_request.lock().unwrap();
        assert!(recorded.is_some());
    }
}
