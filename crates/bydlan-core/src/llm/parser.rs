//! Parsing of Messages API responses

use super::types::{CompletionResponse, ContentBlock, TokenUsage};
use crate::conversation::TurnRole;
use crate::error::{BotError, BotResult};
use serde_json::Value;

/// Turn a `/v1/messages` response body into a [`CompletionResponse`]
pub(super) fn parse_anthropic(response: Value) -> BotResult<CompletionResponse> {
    if response["type"].as_str() == Some("error") {
        let message = response["error"]["message"].as_str().unwrap_or("unknown error");
        return Err(BotError::completion_with_provider(
            format!("Anthropic returned an error: {}", message),
            "anthropic",
        ));
    }

    let blocks = response["content"]
        .as_array()
        .ok_or_else(|| BotError::completion_with_provider("No content in Anthropic response", "anthropic"))?;

    let content = blocks
        .iter()
        .map(|block| serde_json::from_value::<ContentBlock>(block.clone()).unwrap_or(ContentBlock::Other))
        .collect();

    let usage = response["usage"].as_object().map(|usage| TokenUsage {
        input_tokens: usage.get("input_tokens").and_then(|v| v.as_u64()).unwrap_or(0),
        output_tokens: usage.get("output_tokens").and_then(|v| v.as_u64()).unwrap_or(0),
    });

    Ok(CompletionResponse {
        role: TurnRole::Assistant,
        content,
        model: response["model"].as_str().map(|s| s.to_string()),
        stop_reason: response["stop_reason"].as_str().map(|s| s.to_string()),
        usage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_text_and_thinking() {
        let body = json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-7-sonnet-latest",
            "content": [
                {"type": "thinking", "thinking": "2 and 2", "signature": "sig"},
                {"type": "text", "text": "4"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 12, "output_tokens": 3}
        });
        let parsed = parse_anthropic(body).unwrap();
        assert_eq!(parsed.content.len(), 2);
        assert_eq!(parsed.reply_text(), "4");
        assert_eq!(parsed.stop_reason.as_deref(), Some("end_turn"));
        assert_eq!(parsed.usage.unwrap().output_tokens, 3);
    }

    #[test]
    fn test_parse_error_body() {
        let body = json!({"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}});
        let err = parse_anthropic(body).unwrap_err();
        assert!(err.to_string().contains("Overloaded"));
    }

    #[test]
    fn test_missing_content_is_an_error() {
        assert!(parse_anthropic(json!({"type": "message"})).is_err());
    }
}
