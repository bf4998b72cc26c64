//! Chat message types

use serde::{Deserialize, Serialize};

/// Identifier of a chat (group) as assigned by the transport
pub type ChatId = i64;

/// Identifier of a message, unique within its chat
pub type MessageId = i64;

/// Author of a chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Transport-level user identifier
    pub id: i64,
    /// Display name shown to other chat members
    pub display_name: Option<String>,
    /// Public handle (username), without the leading `@`
    pub handle: Option<String>,
}

impl Author {
    /// Create an author with only an identifier
    pub fn new(id: i64) -> Self {
        Self {
            id,
            display_name: None,
            handle: None,
        }
    }

    /// Set the display name
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Set the handle
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    /// Display name, treating an empty string as unknown
    pub fn known_display_name(&self) -> Option<&str> {
        self.display_name.as_deref().filter(|name| !name.is_empty())
    }
}

/// A message observed in a chat.
///
/// `reply_to` carries the parent message when the transport delivers it
/// together with the message; `parent_id` is always set for replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub parent_id: Option<MessageId>,
    pub text: Option<String>,
    pub author: Option<Author>,
    pub reply_to: Option<Box<ChatMessage>>,
}

impl ChatMessage {
    /// Create a message without text, author or parent
    pub fn new(chat_id: ChatId, id: MessageId) -> Self {
        Self {
            id,
            chat_id,
            parent_id: None,
            text: None,
            author: None,
            reply_to: None,
        }
    }

    /// Set the message text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the author
    pub fn with_author(mut self, author: Author) -> Self {
        self.author = Some(author);
        self
    }

    /// Mark the message as a reply to `parent_id`
    pub fn replying_to(mut self, parent_id: MessageId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Attach the full parent message (also sets `parent_id`)
    pub fn with_reply_to(mut self, parent: ChatMessage) -> Self {
        self.parent_id = Some(parent.id);
        self.reply_to = Some(Box::new(parent));
        self
    }

    /// Message text, treating an empty string as absent
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// Author display name if both author and name are known
    pub fn author_name(&self) -> Option<&str> {
        self.author.as_ref().and_then(Author::known_display_name)
    }

    /// Author handle if known
    pub fn author_handle(&self) -> Option<&str> {
        self.author.as_ref().and_then(|a| a.handle.as_deref())
    }
}
