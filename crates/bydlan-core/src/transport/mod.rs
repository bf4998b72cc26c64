//! Chat transport capability
//!
//! The core only needs two operations from a chat network: look up an
//! earlier message by id and post a reply. [`telegram`] provides the
//! Bot API implementation used in production.

pub mod telegram;

use crate::chat::{ChatId, ChatMessage, MessageId};
use crate::error::BotResult;
use async_trait::async_trait;

/// Narrow interface over a chat network client
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Fetch a message by id; `Ok(None)` when it does not exist or is unknown
    async fn fetch_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> BotResult<Option<ChatMessage>>;

    /// Post `text` to `chat_id`, as a reply to `reply_to` when given, and
    /// return the id of the message that was sent
    async fn send_message(
        &self,
        chat_id: ChatId,
        reply_to: Option<MessageId>,
        text: &str,
    ) -> BotResult<MessageId>;
}
