//! Role-tagged conversation turns

use serde::{Deserialize, Serialize};

/// Who produced a turn, from the completion service's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// Any chat member other than the bot
    User,
    /// The bot itself
    Assistant,
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// One unit of conversation content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ConversationTurn {
    /// A turn written by a chat member, prefixed with their display name
    pub fn user(author_name: Option<&str>, text: &str) -> Self {
        Self {
            role: TurnRole::User,
            text: compose_user_line(author_name, text),
        }
    }

    /// A turn written by the bot
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
        }
    }
}

/// Format a group-chat line as `"<name>: <text>"`, or just `text` when the
/// author's name is unknown.
pub fn compose_user_line(author_name: Option<&str>, text: &str) -> String {
    match author_name.filter(|name| !name.is_empty()) {
        Some(name) => format!("{}: {}", name, text),
        None => text.to_string(),
    }
}
