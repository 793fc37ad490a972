//! OpenAI Chat Completions backend.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{SummaryFuture, SummaryOptions, SummaryProvider, http_client, require_api_key};
use crate::api::errors::{describe_http_error, describe_transport_error};
use crate::api::retry::{RetryConfig, with_retry};
use crate::prompt::build_prompt;

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Usage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
}

/// Summarizes through OpenAI chat models.
pub struct OpenAiProvider {
    client: reqwest::Client,
    endpoint: String,
    retry: RetryConfig,
}

impl OpenAiProvider {
    pub fn new() -> Result<Self, String> {
        Ok(Self {
            client: http_client()?,
            endpoint: OPENAI_API_URL.to_string(),
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

    async fn send(&self, api_key: &str, body: &ChatRequest<'_>) -> Result<String, String> {
        debug!(
            "OpenAI request: model={}, max_tokens={}",
            body.model, body.max_tokens
        );
        let start = Instant::now();

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {api_key}"))
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
            "OpenAI response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(describe_http_error(status.as_u16(), &text));
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| format!("failed to parse response: {e}"))?;

        if let Some(ref usage) = parsed.usage {
            debug!(
                "Token usage: prompt={}, completion={}",
                usage.prompt_tokens.unwrap_or(0),
                usage.completion_tokens.unwrap_or(0),
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| "the AI response was empty".to_string())
    }
}

impl SummaryProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn summarize<'a>(
        &'a self,
        content: &'a str,
        options: &'a SummaryOptions,
    ) -> SummaryFuture<'a> {
        Box::pin(async move {
            let api_key = require_api_key(options)?;
            let prompt = build_prompt(content, options.length);
            let body = ChatRequest {
                model: &options.model,
                max_tokens: options.length.max_tokens(),
                messages: vec![ChatMessage {
                    role: "user",
                    content: &prompt,
                }],
            };
            let body = &body;
            with_retry(&self.retry, move || self.send(api_key, body)).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_choices_parse() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(parsed.choices.is_empty());
        assert!(parsed.usage.is_none());
    }

    #[test]
    fn request_shape() {
        let body = ChatRequest {
            model: "gpt-4",
            max_tokens: 1024,
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4");
        assert_eq!(json["messages"][0]["content"], "hi");
    }
}
