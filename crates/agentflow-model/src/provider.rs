// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::{CompletionRequest, ResponseEvent};

pub type ResponseStream = Pin<Box<dyn Stream<Item = anyhow::Result<ResponseEvent>> + Send>>;

/// Abstract LLM capability: `invoke`/`stream` collapsed into a single
/// `complete` that always returns a stream; non-streaming callers drain it
/// to completion and concatenate the text deltas.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Human-readable provider name for diagnostics (`info`, logging).
    fn name(&self) -> &str;

    /// Model identifier as reported to users.
    fn model_name(&self) -> &str;

    /// Send a completion request and return a streaming response.
    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<ResponseStream>;
}
