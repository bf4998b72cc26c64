//! Bot API client implementing the chat transport

use super::api::{ApiResponse, TgMessage, TgUser, Update};
use super::message_log::MessageLog;
use crate::chat::{ChatId, ChatMessage, MessageId};
use crate::config::TelegramConfig;
use crate::error::{BotError, BotResult};
use crate::transport::ChatTransport;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

/// Slack added on top of the long-polling timeout for the HTTP timeout
const POLL_TIMEOUT_SLACK_SECS: u64 = 10;

/// Telegram transport over the HTTP Bot API
#[derive(Debug)]
pub struct TelegramTransport {
    http_client: Client,
    config: TelegramConfig,
    log: MessageLog,
}

impl TelegramTransport {
    pub fn new(config: TelegramConfig) -> BotResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(
                config.poll_timeout_secs + POLL_TIMEOUT_SLACK_SECS,
            ))
            .build()
            .map_err(|e| BotError::config(format!("Failed to build Telegram HTTP client: {}", e)))?;
        let log = MessageLog::new(config.message_log_capacity);
        Ok(Self {
            http_client,
            config,
            log,
        })
    }

    /// The bot's own account
    pub async fn get_me(&self) -> BotResult<TgUser> {
        self.call("getMe", &json!({})).await
    }

    /// Long-poll for message updates starting at `offset`
    pub async fn get_updates(&self, offset: i64) -> BotResult<Vec<Update>> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": self.config.poll_timeout_secs,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    /// Record an incoming message for later fetch-by-id and convert it
    pub fn observe(&self, message: &TgMessage) -> ChatMessage {
        let message = message.to_chat_message();
        self.log.record(&message);
        message
    }

    pub fn message_log(&self) -> &MessageLog {
        &self.log
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.bot_token,
            method
        )
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> BotResult<T> {
        let response = self
            .http_client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;
        let text = response.text().await?;
        let parsed: ApiResponse<T> = serde_json::from_str(&text)?;
        parsed.into_result(method)
    }

    /// Send with the configured parse mode, falling back to plain text when
    /// Telegram rejects the markup
    async fn send_formatted(
        &self,
        chat_id: ChatId,
        reply_to: Option<MessageId>,
        text: &str,
    ) -> BotResult<TgMessage> {
        let parse_mode = self.config.parse_mode.as_api_value();
        match self.send_with_flood_wait(chat_id, reply_to, text, parse_mode).await {
            Err(err) if parse_mode.is_some() && is_entity_error(&err) => {
                warn!(chat_id, error = %err, "markup rejected, resending as plain text");
                self.send_with_flood_wait(chat_id, reply_to, text, None).await
            }
            result => result,
        }
    }

    async fn send_with_flood_wait(
        &self,
        chat_id: ChatId,
        reply_to: Option<MessageId>,
        text: &str,
        parse_mode: Option<&str>,
    ) -> BotResult<TgMessage> {
        let body = send_message_body(chat_id, reply_to, text, parse_mode);
        match self.call("sendMessage", &body).await {
            Err(err) => match err.retry_after() {
                Some(wait) if wait <= self.config.max_flood_wait_secs => {
                    warn!(chat_id, wait_secs = wait, "flood control, waiting before resend");
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                    self.call("sendMessage", &body).await
                }
                _ => Err(err),
            },
            ok => ok,
        }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn fetch_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> BotResult<Option<ChatMessage>> {
        match self.log.get(chat_id, message_id) {
            Some(logged) => {
                if logged.embedded_only {
                    debug!(
                        chat_id,
                        message_id,
                        "message only known as a reply target, its own parent is unknown"
                    );
                }
                Ok(Some(logged.message))
            }
            None => {
                debug!(chat_id, message_id, "message not in log");
                Ok(None)
            }
        }
    }

    async fn send_message(
        &self,
        chat_id: ChatId,
        reply_to: Option<MessageId>,
        text: &str,
    ) -> BotResult<MessageId> {
        let sent = self.send_formatted(chat_id, reply_to, text).await?;
        self.observe(&sent);
        debug!(chat_id, message_id = sent.message_id, chars = text.chars().count(), "message sent");
        Ok(sent.message_id)
    }
}

fn send_message_body(
    chat_id: ChatId,
    reply_to: Option<MessageId>,
    text: &str,
    parse_mode: Option<&str>,
) -> Value {
    let mut body = json!({
        "chat_id": chat_id,
        "text": text,
    });
    if let Some(reply_to) = reply_to {
        body["reply_parameters"] = json!({
            "message_id": reply_to,
            "allow_sending_without_reply": true,
        });
    }
    if let Some(parse_mode) = parse_mode {
        body["parse_mode"] = json!(parse_mode);
    }
    body
}

fn is_entity_error(err: &BotError) -> bool {
    matches!(err, BotError::Transport { status_code: Some(400), message, .. }
        if message.contains("can't parse entities"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Author;

    fn transport() -> TelegramTransport {
        TelegramTransport::new(TelegramConfig {
            bot_token: "123:abc".into(),
            ..TelegramConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_method_url_embeds_token() {
        assert_eq!(
            transport().method_url("getMe"),
            "https://api.telegram.org/bot123:abc/getMe"
        );
    }

    #[test]
    fn test_send_body_with_reply_and_markdown() {
        let body = send_message_body(-100, Some(7), "4", Some("Markdown"));
        assert_eq!(body["chat_id"], -100);
        assert_eq!(body["text"], "4");
        assert_eq!(body["reply_parameters"]["message_id"], 7);
        assert_eq!(body["parse_mode"], "Markdown");
    }

    #[test]
    fn test_send_body_plain_standalone() {
        let body = send_message_body(-100, None, "hi", None);
        assert!(body.get("reply_parameters").is_none());
        assert!(body.get("parse_mode").is_none());
    }

    #[test]
    fn test_entity_errors_are_detected() {
        let entity = BotError::transport_with_status(
            "sendMessage failed: Bad Request: can't parse entities: unexpected end",
            400,
        );
        let other = BotError::transport_with_status("sendMessage failed: chat not found", 400);
        assert!(is_entity_error(&entity));
        assert!(!is_entity_error(&other));
    }

    #[tokio::test]
    async fn test_fetch_answers_from_observed_messages() {
        let transport = transport();
        let incoming: TgMessage = serde_json::from_value(json!({
            "message_id": 3,
            "chat": {"id": -100, "type": "group"},
            "from": {"id": 5, "first_name": "Вася"},
            "text": "и 3+3?",
            "reply_to_message": {
                "message_id": 2,
                "chat": {"id": -100, "type": "group"},
                "from": {"id": 99, "is_bot": true, "username": "bydlan_bot"},
                "text": "4"
            }
        }))
        .unwrap();

        let converted = transport.observe(&incoming);
        assert_eq!(converted.parent_id, Some(2));

        let parent = transport.fetch_message(-100, 2).await.unwrap().unwrap();
        assert_eq!(parent.author, Some(Author::new(99).with_handle("bydlan_bot")));
        assert!(transport.message_log().get(-100, 2).unwrap().embedded_only);
        assert!(!transport.message_log().get(-100, 3).unwrap().embedded_only);
        assert!(transport.fetch_message(-100, 1).await.unwrap().is_none());
    }
}
