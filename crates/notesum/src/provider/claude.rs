//! Anthropic Messages API backend.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{SummaryFuture, SummaryOptions, SummaryProvider, http_client, require_api_key};
use crate::api::errors::{describe_http_error, describe_transport_error};
use crate::api::retry::{RetryConfig, with_retry};
use crate::prompt::build_prompt;

pub const CLAUDE_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Value of the `anthropic-version` header.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize, Debug)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Serialize, Debug)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    model: Option<String>,
    usage: Option<Usage>,
}

#[derive(Deserialize, Debug)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Usage {
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
}

/// Summarizes through Claude.
pub struct ClaudeProvider {
    client: reqwest::Client,
    endpoint: String,
    retry: RetryConfig,
}

impl ClaudeProvider {
    pub fn new() -> Result<Self, String> {
        Ok(Self {
            client: http_client()?,
            endpoint: CLAUDE_API_URL.to_string(),
            retry: RetryConfig::default(),
        })
    }

    /// Send requests to `endpoint` instead of the public API.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn send(&self, api_key: &str, body: &MessagesRequest<'_>) -> Result<String, String> {
        debug!(
            "Claude request: model={}, max_tokens={}, prompt={} chars",
            body.model,
            body.max_tokens,
            body.messages.iter().map(|m| m.content.len()).sum::<usize>()
        );
        let start = Instant::now();

        let resp = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| describe_transport_error(&e))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| format!("failed to read response: {e}"))?;

        debug!(
            "Claude response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(describe_http_error(status.as_u16(), &text));
        }

        let parsed: MessagesResponse =
            serde_json::from_str(&text).map_err(|e| format!("failed to parse response: {e}"))?;

        if let Some(ref usage) = parsed.usage {
            debug!(
                "Token usage: input={}, output={}, model={}",
                usage.input_tokens.unwrap_or(0),
                usage.output_tokens.unwrap_or(0),
                parsed.model.as_deref().unwrap_or(body.model),
            );
        }

        parsed
            .content
            .into_iter()
            .filter(|b| b.block_type == "text")
            .find_map(|b| b.text)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| "the AI response was empty".to_string())
    }
}

impl SummaryProvider for ClaudeProvider {
    fn name(&self) -> &'static str {
        "claude"
    }

    fn summarize<'a>(
        &'a self,
        content: &'a str,
        options: &'a SummaryOptions,
    ) -> SummaryFuture<'a> {
        Box::pin(async move {
            let api_key = require_api_key(options)?;
            let prompt = build_prompt(content, options.length);
            let body = MessagesRequest {
                model: &options.model,
                max_tokens: options.length.max_tokens(),
                messages: vec![RequestMessage {
                    role: "user",
                    content: &prompt,
                }],
            };
            let body = &body;
            with_retry(&self.retry, move || self.send(api_key, body)).await
        })
    }
}
