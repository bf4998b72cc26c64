//! Deciding which chat messages the bot answers

use crate::chat::ChatMessage;
use parking_lot::RwLock;
use std::sync::Arc;

/// Trigger word used by the reference deployment
pub const DEFAULT_TRIGGER_WORD: &str = "быдлан";

/// The bot's own handle, learned after the transport session starts.
///
/// Clones share the same cell, so the value set by the bootstrap code is
/// seen by every component holding a clone.
#[derive(Debug, Clone, Default)]
pub struct BotIdentity {
    handle: Arc<RwLock<Option<String>>>,
}

impl BotIdentity {
    /// Create an identity whose handle is not known yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an identity with a known handle
    pub fn with_handle(handle: impl Into<String>) -> Self {
        let identity = Self::new();
        identity.set_handle(handle);
        identity
    }

    /// Register the bot's handle (a leading `@` is dropped)
    pub fn set_handle(&self, handle: impl Into<String>) {
        let handle = handle.into();
        let handle = handle.trim_start_matches('@').to_string();
        *self.handle.write() = Some(handle);
    }

    /// Current handle, if registered
    pub fn handle(&self) -> Option<String> {
        self.handle.read().clone()
    }

    /// Whether `candidate` is the bot's registered handle
    pub fn is_bot_handle(&self, candidate: Option<&str>) -> bool {
        match (candidate, self.handle.read().as_deref()) {
            (Some(candidate), Some(own)) => candidate == own,
            _ => false,
        }
    }
}

/// Pure predicate over incoming messages
#[derive(Debug, Clone)]
pub struct TriggerEvaluator {
    trigger_word: String,
    identity: BotIdentity,
}

impl TriggerEvaluator {
    /// Create an evaluator for `trigger_word` (matched case-insensitively)
    pub fn new(trigger_word: impl AsRef<str>, identity: BotIdentity) -> Self {
        Self {
            trigger_word: trigger_word.as_ref().to_lowercase(),
            identity,
        }
    }

    /// The lower-cased trigger word
    pub fn trigger_word(&self) -> &str {
        &self.trigger_word
    }

    /// Whether the bot must answer `message`.
    ///
    /// 1. no text: never
    /// 2. text starts with the trigger word: always
    /// 3. reply to a message written by the bot: always
    pub fn should_respond(&self, message: &ChatMessage) -> bool {
        let Some(text) = message.text() else {
            return false;
        };
        if self.starts_with_trigger(text) {
            return true;
        }
        message
            .reply_to
            .as_deref()
            .is_some_and(|parent| self.identity.is_bot_handle(parent.author_handle()))
    }

    /// Drop the first whitespace-delimited token when `text` starts with the
    /// trigger word, so inflected forms ("быдланчик") are removed whole.
    /// Other text is returned unchanged.
    pub fn strip_trigger_prefix<'a>(&self, text: &'a str) -> &'a str {
        if !self.starts_with_trigger(text) {
            return text;
        }
        match text.char_indices().find(|(_, c)| c.is_whitespace()) {
            Some((idx, separator)) => &text[idx + separator.len_utf8()..],
            None => "",
        }
    }

    fn starts_with_trigger(&self, text: &str) -> bool {
        text.to_lowercase().starts_with(&self.trigger_word)
    }
}
