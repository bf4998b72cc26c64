//! Anthropic model identifiers and their token limits

/// Max tokens used for models outside the known list
pub const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Models the bot knows how to size requests for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnthropicModel {
    Claude37SonnetLatest,
    ClaudeSonnet4,
}

impl AnthropicModel {
    /// Default model of the reference deployment
    pub const DEFAULT: AnthropicModel = AnthropicModel::Claude37SonnetLatest;

    /// API identifier
    pub fn id(&self) -> &'static str {
        match self {
            Self::Claude37SonnetLatest => "claude-3-7-sonnet-latest",
            Self::ClaudeSonnet4 => "claude-sonnet-4-20250514",
        }
    }

    /// Output budget sent as `max_tokens`.
    ///
    /// Raised above the 8192 default so an extended-thinking budget fits.
    pub fn max_tokens(&self) -> u32 {
        match self {
            Self::Claude37SonnetLatest | Self::ClaudeSonnet4 => 20_000,
        }
    }

    /// Look up a known model by its API identifier
    pub fn from_id(id: &str) -> Option<Self> {
        [Self::Claude37SonnetLatest, Self::ClaudeSonnet4]
            .into_iter()
            .find(|model| model.id() == id)
    }
}

/// `max_tokens` for an arbitrary model id
pub fn max_tokens_for(model_id: &str) -> u32 {
    AnthropicModel::from_id(model_id)
        .map(|model| model.max_tokens())
        .unwrap_or(DEFAULT_MAX_TOKENS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_models() {
        assert_eq!(max_tokens_for("claude-3-7-sonnet-latest"), 20_000);
        assert_eq!(max_tokens_for("claude-sonnet-4-20250514"), 20_000);
        assert_eq!(AnthropicModel::DEFAULT.id(), "claude-3-7-sonnet-latest");
    }

    #[test]
    fn test_unknown_model_uses_default() {
        assert_eq!(max_tokens_for("claude-haiku-whatever"), DEFAULT_MAX_TOKENS);
    }
}
