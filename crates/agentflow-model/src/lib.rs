// SPDX-License-Identifier: MIT
mod openai;
mod mock;
mod provider;
mod types;

pub use mock::{HangingProvider, MockProvider, ScriptedMockProvider};
pub use openai::OpenAiProvider;
pub use provider::{ModelProvider, ResponseStream};
pub use types::*;
