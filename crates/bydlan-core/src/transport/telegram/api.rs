//! Bot API wire types, limited to the fields the bot reads

use crate::chat::{Author, ChatMessage};
use crate::error::BotError;
use serde::{Deserialize, Serialize};

/// Envelope of every Bot API response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<u16>,
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseParameters {
    pub retry_after: Option<u64>,
    pub migrate_to_chat_id: Option<i64>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the result, mapping API failures to transport errors
    pub fn into_result(self, method: &str) -> Result<T, BotError> {
        if self.ok {
            if let Some(result) = self.result {
                return Ok(result);
            }
            return Err(BotError::transport(format!("{} returned no result", method)));
        }

        let description = self
            .description
            .unwrap_or_else(|| "no description".to_string());
        let message = format!("{} failed: {}", method, description);
        let retry_after = self.parameters.and_then(|p| p.retry_after);
        match (self.error_code, retry_after) {
            (_, Some(seconds)) => Err(BotError::flood_wait(message, seconds)),
            (Some(code), None) => Err(BotError::transport_with_status(message, code)),
            (None, None) => Err(BotError::transport(message)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TgMessage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TgChat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ChatKind,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TgUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TgMessage {
    pub message_id: i64,
    pub chat: TgChat,
    #[serde(default)]
    pub from: Option<TgUser>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub reply_to_message: Option<Box<TgMessage>>,
}

impl TgMessage {
    /// Whether the message was posted in a group or supergroup
    pub fn is_group(&self) -> bool {
        matches!(self.chat.kind, ChatKind::Group | ChatKind::Supergroup)
    }

    /// Convert into the transport-neutral message type, keeping the
    /// embedded reply target one level deep
    pub fn to_chat_message(&self) -> ChatMessage {
        let mut message = self.to_flat_message();
        if let Some(parent) = self.reply_to_message.as_deref() {
            message = message.with_reply_to(parent.to_flat_message());
        }
        message
    }

    /// Convert without the embedded reply target; `parent_id` is kept
    pub fn to_flat_message(&self) -> ChatMessage {
        let mut message = ChatMessage::new(self.chat.id, self.message_id);
        // Media captions are not message text
        if let Some(text) = self.text.as_deref() {
            message = message.with_text(text);
        }
        if let Some(user) = &self.from {
            message = message.with_author(user.to_author());
        }
        if let Some(parent) = &self.reply_to_message {
            message = message.replying_to(parent.message_id);
        }
        message
    }
}

impl TgUser {
    pub fn to_author(&self) -> Author {
        let mut author = Author::new(self.id);
        if let Some(name) = &self.first_name {
            author = author.with_display_name(name);
        }
        if let Some(username) = &self.username {
            author = author.with_handle(username);
        }
        author
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::{BotIdentity, DEFAULT_TRIGGER_WORD, TriggerEvaluator};
    use serde_json::json;

    fn group_message() -> TgMessage {
        serde_json::from_value(json!({
            "message_id": 12,
            "chat": {"id": -100, "type": "supergroup", "title": "chat"},
            "from": {"id": 5, "is_bot": false, "first_name": "Вася", "username": "vasya"},
            "text": "и 3+3?",
            "reply_to_message": {
                "message_id": 11,
                "chat": {"id": -100, "type": "supergroup"},
                "from": {"id": 99, "is_bot": true, "first_name": "Быдлан", "username": "bydlan_bot"},
                "text": "4",
                "reply_to_message": {
                    "message_id": 10,
                    "chat": {"id": -100, "type": "supergroup"},
                    "text": "быдлан 2+2?"
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_conversion_keeps_reply_target() {
        let message = group_message().to_chat_message();
        assert_eq!(message.id, 12);
        assert_eq!(message.chat_id, -100);
        assert_eq!(message.parent_id, Some(11));
        assert_eq!(message.author_name(), Some("Вася"));

        let parent = message.reply_to.as_deref().unwrap();
        assert_eq!(parent.author_handle(), Some("bydlan_bot"));
        assert_eq!(parent.parent_id, Some(10));
        assert!(parent.reply_to.is_none());
    }

    #[test]
    fn test_captioned_photo_has_no_text() {
        let message: TgMessage = serde_json::from_value(json!({
            "message_id": 1,
            "chat": {"id": -1, "type": "group"},
            "from": {"id": 5, "first_name": "Вася"},
            "photo": [{"file_id": "AgAD", "width": 90, "height": 90}],
            "caption": "быдлан что на фото"
        }))
        .unwrap();
        assert!(message.is_group());

        let converted = message.to_chat_message();
        assert_eq!(converted.text(), None);

        let trigger = TriggerEvaluator::new(DEFAULT_TRIGGER_WORD, BotIdentity::with_handle("bydlan_bot"));
        assert!(!trigger.should_respond(&converted));
    }

    #[test]
    fn test_private_and_unknown_chats_are_not_groups() {
        let private: TgChat = serde_json::from_value(json!({"id": 1, "type": "private"})).unwrap();
        let odd: TgChat = serde_json::from_value(json!({"id": 1, "type": "forum"})).unwrap();
        assert_eq!(private.kind, ChatKind::Private);
        assert_eq!(odd.kind, ChatKind::Unknown);
    }

    #[test]
    fn test_flood_wait_response_maps_to_retry_after() {
        let response: ApiResponse<TgMessage> = serde_json::from_value(json!({
            "ok": false,
            "error_code": 429,
            "description": "Too Many Requests: retry after 7",
            "parameters": {"retry_after": 7}
        }))
        .unwrap();
        let err = response.into_result("sendMessage").unwrap_err();
        assert!(err.is_rate_limited());
        assert_eq!(err.retry_after(), Some(7));
    }

    #[test]
    fn test_api_error_keeps_status_code() {
        let response: ApiResponse<TgUser> = serde_json::from_value(json!({
            "ok": false,
            "error_code": 401,
            "description": "Unauthorized"
        }))
        .unwrap();
        let err = response.into_result("getMe").unwrap_err();
        assert!(matches!(err, BotError::Transport { status_code: Some(401), .. }));
        assert!(err.to_string().contains("Unauthorized"));
    }
}
