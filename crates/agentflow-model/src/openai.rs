// SPDX-License-Identifier: MIT
//! OpenAI-compatible chat completion driver.
//!
//! Speaks the `/v1/chat/completions` SSE streaming wire format shared by
//! OpenAI and most OpenAI-compatible endpoints (Azure OpenAI behind a
//! compatible base URL, local servers such as Ollama/vLLM/LM Studio).

use anyhow::{bail, Context};
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};
use tracing::debug;

use crate::{provider::ResponseStream, CompletionRequest, Message, ResponseEvent, ToolCall};

pub struct OpenAiProvider {
    model: String,
    api_key: Option<String>,
    chat_url: String,
    max_tokens: u32,
    temperature: f32,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// `base_url` is the API root without `/chat/completions`, e.g.
    /// `https://api.openai.com/v1`. `api_key` is `None` for local servers
    /// that require no authentication.
    pub fn new(
        model: impl Into<String>,
        api_key: Option<String>,
        base_url: Option<String>,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        let base = base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string());
        let base = base.trim_end_matches('/').to_string();
        Self {
            model: model.into(),
            api_key,
            chat_url: format!("{base}/chat/completions"),
            max_tokens,
            temperature,
            client: reqwest::Client::new(),
        }
    }
}

fn role_and_body(m: &Message) -> Value {
    match m {
        Message::System { content } => json!({ "role": "system", "content": content }),
        Message::User { content } => json!({ "role": "user", "content": content }),
        Message::Assistant { content, tool_calls } => {
            let mut body = json!({ "role": "assistant", "content": content });
            if !tool_calls.is_empty() {
                let calls: Vec<Value> = tool_calls
                    .iter()
                    .map(|tc| {
                        json!({
                            "id": tc.id,
                            "type": "function",
                            "function": {
                                "name": tc.name,
                                "arguments": tc.args.to_string(),
                            }
                        })
                    })
                    .collect();
                body["tool_calls"] = json!(calls);
            }
            body
        }
        Message::ToolResult { tool_call_id, content } => {
            json!({ "role": "tool", "tool_call_id": tool_call_id, "content": content })
        }
    }
}

#[async_trait]
impl crate::ModelProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<ResponseStream> {
        let messages: Vec<Value> = req.messages.iter().map(role_and_body).collect();

        let tools: Vec<Value> = req
            .tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    }
                })
            })
            .collect();

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "stream": req.stream,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "stream_options": { "include_usage": true },
        });
        if !tools.is_empty() {
            body["tools"] = json!(tools);
        }

        debug!(
            model = %self.model,
            tool_count = tools.len(),
            message_count = messages.len(),
            "sending completion request"
        );

        let mut http_req = self.client.post(&self.chat_url).json(&body);
        if let Some(key) = &self.api_key {
            http_req = http_req.bearer_auth(key);
        }

        let resp = http_req
            .send()
            .await
            .context("openai completion request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("openai error {status}: {text}");
        }

        let byte_stream = resp.bytes_stream();
        let event_stream = byte_stream
            .scan(String::new(), |buf, chunk| {
                let events: Vec<anyhow::Result<ResponseEvent>> = match chunk {
                    Ok(b) => {
                        buf.push_str(&String::from_utf8_lossy(&b));
                        drain_complete_sse_lines(buf)
                    }
                    Err(e) => vec![Err(anyhow::anyhow!(e))],
                };
                std::future::ready(Some(events))
            })
            .flat_map(futures::stream::iter);

        Ok(Box::pin(event_stream))
    }
}

/// Drain all complete `\n`-terminated SSE lines from `buf`, leaving any
/// trailing partial line for the next chunk.
fn drain_complete_sse_lines(buf: &mut String) -> Vec<anyhow::Result<ResponseEvent>> {
    let mut events = Vec::new();
    while let Some(nl_pos) = buf.find('\n') {
        let line = buf[..nl_pos].trim_end_matches('\r').to_string();
        *buf = buf[nl_pos + 1..].to_string();
        if let Some(ev) = parse_sse_data_line(&line) {
            events.push(ev);
        }
    }
    events
}

fn parse_sse_data_line(line: &str) -> Option<anyhow::Result<ResponseEvent>> {
    let data = line.strip_prefix("data: ")?.trim();
    if data.is_empty() {
        return None;
    }
    if data == "[DONE]" {
        return Some(Ok(ResponseEvent::Done));
    }
    let v: Value = serde_json::from_str(data).ok()?;
    Some(parse_sse_chunk(&v))
}

fn parse_sse_chunk(v: &Value) -> anyhow::Result<ResponseEvent> {
    if let Some(usage) = v.get("usage").filter(|u| !u.is_null()) {
        return Ok(ResponseEvent::Usage {
            input_tokens: usage["prompt_tokens"].as_u64().unwrap_or(0) as u32,
            output_tokens: usage["completion_tokens"].as_u64().unwrap_or(0) as u32,
        });
    }

    let choice = &v["choices"][0];

    if choice["finish_reason"].as_str() == Some("length") {
        return Ok(ResponseEvent::MaxTokens);
    }

    let delta = &choice["delta"];

    if let Some(tool_calls) = delta.get("tool_calls") {
        if let Some(tc) = tool_calls.get(0) {
            let index = tc["index"].as_u64().unwrap_or(0) as u32;
            let id = tc["id"].as_str().unwrap_or("").to_string();
            let name = tc["function"]["name"].as_str().unwrap_or("").to_string();
            let arguments = tc["function"]["arguments"].as_str().unwrap_or("").to_string();
            return Ok(ResponseEvent::ToolCall { index, id, name, arguments });
        }
    }

    if let Some(text) = delta.get("content").and_then(|c| c.as_str()) {
        return Ok(ResponseEvent::TextDelta(text.to_string()));
    }

    Ok(ResponseEvent::TextDelta(String::new()))
}

/// Parse a complete (non-streamed) `arguments` JSON string accumulated from
/// one or more `ToolCall` deltas into a JSON object, defaulting to `{}` on
/// malformed input so a single bad tool call never poisons the whole turn.
pub fn parse_tool_call_args(arguments: &str) -> Value {
    serde_json::from_str(arguments).unwrap_or_else(|_| json!({}))
}

/// Build a [`ToolCall`] from accumulated streaming fragments, synthesizing a
/// positional id when the provider omitted one.
pub fn finalize_tool_call(position: usize, id: &str, name: &str, arguments: &str) -> ToolCall {
    let id = if id.is_empty() { format!("call_{position}") } else { id.to_string() };
    ToolCall { id, name: name.to_string(), args: parse_tool_call_args(arguments) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tool_call_args_defaults_on_malformed_json() {
        assert_eq!(parse_tool_call_args("not json"), json!({}));
        assert_eq!(parse_tool_call_args(r#"{"a":1}"#), json!({"a": 1}));
    }

    #[test]
    fn finalize_tool_call_synthesizes_missing_id() {
        let tc = finalize_tool_call(2, "", "get_current_time", "{}");
        assert_eq!(tc.id, "call_2");
        assert_eq!(tc.name, "get_current_time");
    }

    #[test]
    fn finalize_tool_call_keeps_provider_id() {
        let tc = finalize_tool_call(0, "call_abc", "get_current_time", "{}");
        assert_eq!(tc.id, "call_abc");
    }

    #[test]
    fn drain_complete_sse_lines_leaves_partial_line_buffered() {
        let mut buf = String::from("data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\ndata: partial");
        let events = drain_complete_sse_lines(&mut buf);
        assert_eq!(events.len(), 1);
        assert_eq!(buf, "data: partial");
    }

    #[test]
    fn parse_sse_data_line_done_sentinel() {
        let ev = parse_sse_data_line("data: [DONE]").unwrap().unwrap();
        assert_eq!(ev, ResponseEvent::Done);
    }

    #[test]
    fn parse_sse_chunk_extracts_text_delta() {
        let v: Value = serde_json::from_str(r#"{"choices":[{"delta":{"content":"hello"}}]}"#).unwrap();
        let ev = parse_sse_chunk(&v).unwrap();
        assert_eq!(ev, ResponseEvent::TextDelta("hello".to_string()));
    }

    #[test]
    fn parse_sse_chunk_extracts_tool_call() {
        let v: Value = serde_json::from_str(
            r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"id":"c1","function":{"name":"get_current_time","arguments":"{}"}}]}}]}"#,
        )
        .unwrap();
        let ev = parse_sse_chunk(&v).unwrap();
        assert_eq!(
            ev,
            ResponseEvent::ToolCall { index: 0, id: "c1".into(), name: "get_current_time".into(), arguments: "{}".into() }
        );
    }

    #[test]
    fn parse_sse_chunk_extracts_usage() {
        let v: Value = serde_json::from_str(r#"{"usage":{"prompt_tokens":10,"completion_tokens":5}}"#).unwrap();
        let ev = parse_sse_chunk(&v).unwrap();
        assert_eq!(ev, ResponseEvent::Usage { input_tokens: 10, output_tokens: 5 });
    }

    #[test]
    fn parse_sse_chunk_detects_max_tokens() {
        let v: Value = serde_json::from_str(r#"{"choices":[{"delta":{},"finish_reason":"length"}]}"#).unwrap();
        let ev = parse_sse_chunk(&v).unwrap();
        assert_eq!(ev, ResponseEvent::MaxTokens);
    }
}
