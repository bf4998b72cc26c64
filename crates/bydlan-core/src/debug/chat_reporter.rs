//! Debug reporter that posts into a dedicated chat

use super::DebugReporter;
use crate::chat::{ChatId, MessageId};
use crate::splitter::{TELEGRAM_MAX_MESSAGE_LENGTH, split_message};
use crate::transport::ChatTransport;
use async_trait::async_trait;
use std::sync::Arc;

/// Characters of the original report kept in the fallback notice
const FALLBACK_EXCERPT_CHARS: usize = 256;

/// Posts reports to a debug chat through the regular transport, and always
/// logs them as well.
pub struct ChatDebugReporter {
    transport: Arc<dyn ChatTransport>,
    chat_id: ChatId,
    max_message_len: usize,
}

impl ChatDebugReporter {
    pub fn new(transport: Arc<dyn ChatTransport>, chat_id: ChatId) -> Self {
        Self {
            transport,
            chat_id,
            max_message_len: TELEGRAM_MAX_MESSAGE_LENGTH,
        }
    }

    /// Override the chunk size used when a report is too long
    pub fn with_max_message_len(mut self, max_message_len: usize) -> Self {
        self.max_message_len = max_message_len;
        self
    }

    async fn post(&self, text: &str) -> crate::error::BotResult<()> {
        let mut reply_to: Option<MessageId> = None;
        for chunk in split_message(text, self.max_message_len) {
            let sent = self
                .transport
                .send_message(self.chat_id, reply_to, chunk)
                .await?;
            reply_to = Some(sent);
        }
        Ok(())
    }
}

#[async_trait]
impl DebugReporter for ChatDebugReporter {
    async fn report(&self, text: &str) {
        tracing::info!(message = %text, "debug report");

        if let Err(error) = self.post(text).await {
            tracing::warn!(error = %error, "failed to post debug report");
            let excerpt: String = text.chars().take(FALLBACK_EXCERPT_CHARS).collect();
            let fallback = format!("failed to send debug message, go check logs: {}", excerpt);
            if let Err(error) = self.transport.send_message(self.chat_id, None, &fallback).await {
                tracing::error!(error = %error, "failed to post debug fallback notice");
            }
        }
    }
}
