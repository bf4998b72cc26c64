//! Telegram Bot API transport
//!
//! Talks to the HTTP Bot API directly with `reqwest`. The Bot API cannot
//! look messages up by id, so every message the transport sees or sends is
//! kept in a bounded [`MessageLog`] that backs
//! [`ChatTransport::fetch_message`](super::ChatTransport::fetch_message).
//! Ordinary group messages are only delivered when the bot's privacy mode
//! is disabled.

pub mod api;
mod client;
mod message_log;

pub use api::{ChatKind, TgChat, TgMessage, TgUser, Update};
pub use client::TelegramTransport;
pub use message_log::{LoggedMessage, MessageLog};
