//! From trait implementations for BotError conversions

use super::types::BotError;

impl From<anyhow::Error> for BotError {
    fn from(error: anyhow::Error) -> Self {
        Self::other(error.to_string())
    }
}

impl From<std::io::Error> for BotError {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
            path: None,
            context: None,
        }
    }
}

impl From<serde_json::Error> for BotError {
    fn from(error: serde_json::Error) -> Self {
        Self::json(error.to_string())
    }
}

impl From<reqwest::Error> for BotError {
    fn from(error: reqwest::Error) -> Self {
        // The URL of a Telegram call embeds the bot token
        let url = error
            .url()
            .map(|u| format!("{}://{}", u.scheme(), u.host_str().unwrap_or_default()));
        let error = error.without_url();
        if error.is_timeout() {
            return Self::Timeout {
                seconds: 0,
                context: Some(error.to_string()),
            };
        }
        Self::Http {
            message: error.to_string(),
            url,
            status_code: error.status().map(|s| s.as_u16()),
            context: None,
        }
    }
}
