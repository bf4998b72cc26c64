//! Anthropic Messages API client

use super::error_utils::handle_http_error;
use super::models::max_tokens_for;
use super::parser::parse_anthropic;
use super::retry::RetryPolicy;
use super::types::{CompletionRequest, CompletionResponse};
use super::CompletionProvider;
use crate::config::AnthropicConfig;
use crate::error::{BotError, BotResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::instrument;

const PROVIDER: &str = "anthropic";

/// Completion provider backed by `POST /v1/messages`
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    config: AnthropicConfig,
    http_client: Client,
    retry: RetryPolicy,
}

impl AnthropicClient {
    /// Build a client from configuration
    pub fn new(config: AnthropicConfig) -> BotResult<Self> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| BotError::config(format!("Failed to build Anthropic HTTP client: {}", e)))?;
        let retry = RetryPolicy {
            max_retries: config.max_retries,
            ..RetryPolicy::default()
        };
        Ok(Self {
            config,
            http_client,
            retry,
        })
    }

    /// Override the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// JSON body for one request
    pub fn request_body(&self, request: &CompletionRequest) -> Value {
        let max_tokens = self
            .config
            .max_tokens
            .unwrap_or_else(|| max_tokens_for(&request.model));

        let messages: Vec<Value> = request
            .turns
            .iter()
            .map(|turn| json!({"role": turn.role.to_string(), "content": turn.text}))
            .collect();

        let mut body = json!({
            "model": request.model,
            "max_tokens": max_tokens,
            "system": request.system_prompt,
            "messages": messages,
        });

        if let Some(budget) = self.config.thinking_budget {
            body["thinking"] = json!({"type": "enabled", "budget_tokens": budget});
        }

        body
    }

    async fn send_once(&self, body: &Value) -> BotResult<CompletionResponse> {
        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));

        let response = self
            .http_client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", &self.config.api_version)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                BotError::completion_with_provider(format!("Anthropic request failed: {}", e), PROVIDER)
                    .with_context("Failed to send HTTP request to Anthropic API")
            })?;

        if !response.status().is_success() {
            return Err(handle_http_error(response, "Anthropic").await);
        }

        let response_json: Value = response.json().await.map_err(|e| {
            BotError::completion_with_provider(format!("Failed to parse Anthropic response: {}", e), PROVIDER)
        })?;

        parse_anthropic(response_json)
    }
}

#[async_trait]
impl CompletionProvider for AnthropicClient {
    #[instrument(skip(self, request), fields(model = %request.model, turns = request.turns.len()))]
    async fn complete(&self, request: &CompletionRequest) -> BotResult<CompletionResponse> {
        let body = self.request_body(request);
        let response = self.retry.run("anthropic.messages", || self.send_once(&body)).await?;

        if let Some(usage) = &response.usage {
            tracing::info!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                stop_reason = response.stop_reason.as_deref().unwrap_or("unknown"),
                "completion finished"
            );
        }
        Ok(response)
    }
}
