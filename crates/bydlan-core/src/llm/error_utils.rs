//! Sanitizing of provider error bodies before they reach logs or chat.

use crate::error::BotError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

const MAX_ERROR_TEXT_CHARS: usize = 1_024;
const REDACTED: &str = "[REDACTED]";

static BEARER_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bBearer\s+[A-Za-z0-9._\-+/=]{8,}").expect("valid bearer token regex")
});

static KEY_VALUE_SECRET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b(api[_-]?key|access[_-]?token|token|secret|password|authorization|x-api-key)\b\s*[:=]\s*["']?[^"',\s}]+"#,
    )
    .expect("valid key/value secret regex")
});

/// Telegram bot tokens look like `123456789:AA...`
static BOT_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{6,}:[A-Za-z0-9_-]{30,}").expect("valid bot token regex"));

/// Redact secrets and truncate large payloads.
pub fn sanitize_provider_error_text(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "<empty error response body>".to_string();
    }

    if let Ok(mut json) = serde_json::from_str::<Value>(trimmed) {
        redact_json_value(&mut json);
        let serialized =
            serde_json::to_string(&json).unwrap_or_else(|_| "<unserializable error>".to_string());
        return truncate_with_suffix(serialized);
    }

    truncate_with_suffix(redact_inline_secrets(trimmed))
}

fn redact_json_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if is_sensitive_key(key) {
                    *val = Value::String(REDACTED.to_string());
                } else {
                    redact_json_value(val);
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                redact_json_value(item);
            }
        }
        Value::String(s) => {
            *s = redact_inline_secrets(s);
        }
        _ => {}
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.to_ascii_lowercase().replace(['-', ' '], "_");
    normalized.contains("api_key")
        || normalized.contains("token")
        || normalized.contains("secret")
        || normalized.contains("password")
        || normalized.contains("authorization")
}

fn redact_inline_secrets(input: &str) -> String {
    let redacted = BEARER_TOKEN_RE.replace_all(input, "Bearer [REDACTED]");
    let redacted = BOT_TOKEN_RE.replace_all(&redacted, REDACTED);
    KEY_VALUE_SECRET_RE
        .replace_all(&redacted, "$1=[REDACTED]")
        .into_owned()
}

fn truncate_with_suffix(input: String) -> String {
    let char_count = input.chars().count();
    if char_count <= MAX_ERROR_TEXT_CHARS {
        return input;
    }

    let truncated: String = input.chars().take(MAX_ERROR_TEXT_CHARS).collect();
    format!(
        "{}... [truncated {} chars]",
        truncated,
        char_count - MAX_ERROR_TEXT_CHARS
    )
}

/// Build a completion error from a non-success HTTP response.
pub async fn handle_http_error(response: reqwest::Response, provider: &str) -> BotError {
    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    let sanitized = sanitize_provider_error_text(&error_text);
    BotError::completion_with_provider(
        format!("{} API error (status {}): {}", provider, status, sanitized),
        provider,
    )
}
