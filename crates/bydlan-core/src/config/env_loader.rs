//! Environment variable-based configuration loading
//!
//! Credentials use the plain `TG_BOT_TOKEN` / `ANTHROPIC_API_KEY` names;
//! every tunable lives under the `BYDLAN_` prefix.

use super::model::{BotConfig, ParseMode};
use crate::error::{BotError, BotResult};
use std::path::Path;
use std::str::FromStr;

/// Seed the process environment from a `.env` file.
///
/// With `path = None` the usual `.env` lookup from the working directory is
/// used and a missing file is not an error.
pub fn load_dotenv(path: Option<&Path>) -> BotResult<()> {
    match path {
        Some(path) => dotenv::from_path(path).map_err(|e| {
            BotError::config_with_context(
                format!("Failed to load env file: {}", e),
                path.display().to_string(),
            )
        }),
        None => {
            if let Err(e) = dotenv::dotenv() {
                if !e.not_found() {
                    return Err(BotError::config(format!("Failed to load .env: {}", e)));
                }
            }
            Ok(())
        }
    }
}

/// Load configuration from the process environment
pub fn load_from_env() -> BotResult<BotConfig> {
    load_from_lookup(|key| std::env::var(key).ok())
}

/// Load configuration through an arbitrary variable lookup
pub fn load_from_lookup<F>(lookup: F) -> BotResult<BotConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
    let mut config = BotConfig::default();

    // Credentials
    if let Some(token) = var("TG_BOT_TOKEN") {
        config.telegram.bot_token = token;
    }
    if let Some(key) = var("ANTHROPIC_API_KEY") {
        config.anthropic.api_key = key;
    }

    // Endpoints
    if let Some(url) = var("TELEGRAM_API_URL") {
        config.telegram.api_url = url;
    }
    if let Some(url) = var("ANTHROPIC_BASE_URL") {
        config.anthropic.base_url = url;
    }

    // Completion
    if let Some(model) = var("BYDLAN_MODEL") {
        config.anthropic.model = model;
    }
    if let Some(value) = var("BYDLAN_MAX_TOKENS") {
        config.anthropic.max_tokens = Some(parse_number("BYDLAN_MAX_TOKENS", &value)?);
    }
    if let Some(value) = var("BYDLAN_THINKING_BUDGET") {
        config.anthropic.thinking_budget = Some(parse_number("BYDLAN_THINKING_BUDGET", &value)?);
    }

    // Conversation
    if let Some(word) = var("BYDLAN_TRIGGER_WORD") {
        config.conversation.trigger_word = word;
    }
    if let Some(value) = var("BYDLAN_CACHE_CAPACITY") {
        config.conversation.cache_capacity = parse_number("BYDLAN_CACHE_CAPACITY", &value)?;
    }
    if let Some(value) = var("BYDLAN_STEP_DELAY_MS") {
        config.conversation.step_delay_ms = parse_number("BYDLAN_STEP_DELAY_MS", &value)?;
    }
    if let Some(value) = var("BYDLAN_ANOMALY_DELAY_MS") {
        config.conversation.anomaly_delay_ms = parse_number("BYDLAN_ANOMALY_DELAY_MS", &value)?;
    }
    if let Some(prompt) = var("BYDLAN_SYSTEM_PROMPT") {
        config.conversation.system_prompt = prompt;
    } else if let Some(path) = var("BYDLAN_SYSTEM_PROMPT_FILE") {
        config.conversation.system_prompt = std::fs::read_to_string(&path)
            .map_err(|e| BotError::io_with_path(e.to_string(), &path))?
            .trim()
            .to_string();
    }

    // Runtime
    if let Some(value) = var("BYDLAN_WORKERS") {
        config.workers = parse_number("BYDLAN_WORKERS", &value)?;
    }
    if let Some(value) = var("BYDLAN_DEBUG_CHAT_ID") {
        config.debug_chat_id = Some(parse_number("BYDLAN_DEBUG_CHAT_ID", &value)?);
    }
    if let Some(value) = var("BYDLAN_PARSE_MODE") {
        config.telegram.parse_mode = value.parse::<ParseMode>()?;
    }

    Ok(config)
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> BotResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| BotError::config(format!("Invalid {} value: '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_credentials_are_read() {
        let config = load_from_lookup(lookup(&[
            ("TG_BOT_TOKEN", "123:abc"),
            ("ANTHROPIC_API_KEY", "sk-test"),
        ]))
        .unwrap();

        assert_eq!(config.telegram.bot_token, "123:abc");
        assert_eq!(config.anthropic.api_key, "sk-test");
        tokio_test::assert_ok!(config.validate());
    }

    #[test]
    fn test_empty_environment_gives_defaults_that_fail_validation() {
        let config = load_from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, BotConfig::default());
        tokio_test::assert_err!(config.validate());
    }

    #[test]
    fn test_tunables_override_defaults() {
        let config = load_from_lookup(lookup(&[
            ("BYDLAN_TRIGGER_WORD", "бот"),
            ("BYDLAN_MODEL", "claude-sonnet-4-20250514"),
            ("BYDLAN_THINKING_BUDGET", "4000"),
            ("BYDLAN_WORKERS", "8"),
            ("BYDLAN_DEBUG_CHAT_ID", "-100123"),
            ("BYDLAN_PARSE_MODE", "plain"),
            ("BYDLAN_STEP_DELAY_MS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.conversation.trigger_word, "бот");
        assert_eq!(config.anthropic.model, "claude-sonnet-4-20250514");
        assert_eq!(config.anthropic.thinking_budget, Some(4000));
        assert_eq!(config.workers, 8);
        assert_eq!(config.debug_chat_id, Some(-100123));
        assert_eq!(config.telegram.parse_mode, ParseMode::Plain);
        assert_eq!(config.conversation.step_delay_ms, 0);
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = load_from_lookup(lookup(&[("BYDLAN_WORKERS", "  ")])).unwrap();
        assert_eq!(config.workers, 4);
    }

    #[test]
    fn test_invalid_number_is_a_config_error() {
        let err = load_from_lookup(lookup(&[("BYDLAN_WORKERS", "many")])).unwrap_err();
        assert!(matches!(err, BotError::Config { .. }));
        assert!(err.to_string().contains("BYDLAN_WORKERS"));
    }

    #[test]
    fn test_system_prompt_file() {
        let path = std::env::temp_dir().join(format!("bydlan-prompt-{}.txt", std::process::id()));
        std::fs::write(&path, "  говори кратко\n").unwrap();

        let config = load_from_lookup(lookup(&[(
            "BYDLAN_SYSTEM_PROMPT_FILE",
            path.to_str().unwrap(),
        )]))
        .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.conversation.system_prompt, "говори кратко");
    }

    #[test]
    fn test_missing_system_prompt_file_is_an_error() {
        let result = load_from_lookup(lookup(&[(
            "BYDLAN_SYSTEM_PROMPT_FILE",
            "/nonexistent/bydlan/prompt.txt",
        )]));
        assert!(result.is_err());
    }
}
