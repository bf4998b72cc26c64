//! Request and response types for completion calls

use crate::conversation::{ConversationTurn, TurnRole};
use serde::{Deserialize, Serialize};

/// Substituted when a completion carries no text at all
pub const MISSING_TEXT_PLACEHOLDER: &str = "<assistant text not found in response>";

/// Everything the completion service needs for one call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    /// Oldest first
    pub turns: Vec<ConversationTurn>,
}

/// One content fragment of an assistant message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    Thinking { thinking: String },
    /// Any fragment kind the bot does not use (tool calls, redacted thinking, ...)
    #[serde(other)]
    Other,
}

/// Token accounting reported by the service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Assistant message returned by the completion service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub role: TurnRole,
    pub content: Vec<ContentBlock>,
    pub model: Option<String>,
    pub stop_reason: Option<String>,
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    /// Response consisting of a single text block
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: vec![ContentBlock::Text { text: text.into() }],
            model: None,
            stop_reason: None,
            usage: None,
        }
    }

    /// Text fragments in order, skipping every other fragment kind
    pub fn text_blocks(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// All text fragments concatenated, or the placeholder when the
    /// response holds no text
    pub fn reply_text(&self) -> String {
        let text: String = self.text_blocks().collect();
        if text.is_empty() {
            MISSING_TEXT_PLACEHOLDER.to_string()
        } else {
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_text_skips_thinking() {
        let response = CompletionResponse {
            role: TurnRole::Assistant,
            content: vec![
                ContentBlock::Thinking {
                    thinking: "hmm".into(),
                },
                ContentBlock::Text { text: "2+2=".into() },
                ContentBlock::Other,
                ContentBlock::Text { text: "4".into() },
            ],
            model: None,
            stop_reason: None,
            usage: None,
        };
        assert_eq!(response.reply_text(), "2+2=4");
    }

    #[test]
    fn test_reply_text_placeholder_without_text() {
        let mut response = CompletionResponse::from_text("");
        response.content = vec![ContentBlock::Thinking {
            thinking: "only thoughts".into(),
        }];
        assert_eq!(response.reply_text(), MISSING_TEXT_PLACEHOLDER);
        assert_eq!(CompletionResponse::from_text("").reply_text(), MISSING_TEXT_PLACEHOLDER);
    }

    #[test]
    fn test_unknown_blocks_deserialize_as_other() {
        let block: ContentBlock =
            serde_json::from_str(r#"{"type":"tool_use","id":"x","name":"web_search","input":{}}"#).unwrap();
        assert_eq!(block, ContentBlock::Other);
    }
}
