//! Generation service clients
//!
//! A [`GenerationClient`] takes a synthesized prompt and returns the raw
//! reply text in a single request/response exchange.

mod openai;

use async_trait::async_trait;

use crate::error::ConvertResult;

pub use openai::{ChatChoice, ChatMessage, ChatRequest, ChatResponse, OpenAiClient, ReplyMessage};

/// Text generation backend
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Send `prompt` as the user message and return the reply text
    async fn generate(&self, prompt: &str) -> ConvertResult<String>;
}
