//! Completion service capability and the Anthropic Messages API client

pub mod anthropic;
pub mod error_utils;
pub mod models;
mod parser;
mod retry;
pub mod types;

pub use anthropic::AnthropicClient;
pub use models::AnthropicModel;
pub use retry::RetryPolicy;
pub use types::{ContentBlock, CompletionRequest, CompletionResponse, MISSING_TEXT_PLACEHOLDER, TokenUsage};

use crate::error::BotResult;
use async_trait::async_trait;

/// Anything that can turn a conversation into the next assistant turn
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Produce the assistant's reply to `request.turns`
    async fn complete(&self, request: &CompletionRequest) -> BotResult<CompletionResponse>;
}
