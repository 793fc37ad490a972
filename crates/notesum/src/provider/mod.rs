//! Summarization backends.
//!
//! A [`SummaryProvider`] turns note text into summary text. One
//! implementation exists per backend, and [`create_provider`] picks one from
//! a [`ProviderKind`]. Providers are the only part of the crate that touches
//! the network; the section engine never sees them.

pub mod claude;
pub mod openai;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::prompt::SummaryLength;

pub use claude::ClaudeProvider;
pub use openai::OpenAiProvider;

/// Per-request timeout for provider calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Models offered for the Claude backend, default first.
pub const CLAUDE_MODELS: &[&str] = &[
    "claude-3-5-sonnet-20241022",
    "claude-3-5-haiku-20241022",
    "claude-3-opus-20240229",
    "claude-3-sonnet-20240229",
    "claude-3-haiku-20240307",
];

/// Models offered for the OpenAI backend, default first.
pub const OPENAI_MODELS: &[&str] = &["gpt-4-turbo-preview", "gpt-4", "gpt-3.5-turbo"];

/// Boxed future returned by [`SummaryProvider::summarize`].
pub type SummaryFuture<'a> = Pin<Box<dyn Future<Output = Result<String, String>> + Send + 'a>>;

/// Which backend produces summaries.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Claude,
    #[value(name = "openai")]
    OpenAi,
}

impl ProviderKind {
    /// Models offered for this backend, default first.
    pub fn models(self) -> &'static [&'static str] {
        match self {
            ProviderKind::Claude => CLAUDE_MODELS,
            ProviderKind::OpenAi => OPENAI_MODELS,
        }
    }

    pub fn default_model(self) -> &'static str {
        self.models()[0]
    }

    /// Environment variable conventionally holding this backend's key.
    pub fn api_key_env(self) -> &'static str {
        match self {
            ProviderKind::Claude => "ANTHROPIC_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Claude => write!(f, "claude"),
            ProviderKind::OpenAi => write!(f, "openai"),
        }
    }
}

/// Options for a single summarization request.
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    pub api_key: String,
    pub model: String,
    pub length: SummaryLength,
}

/// A backend that summarizes note content.
///
/// Uses a boxed future so that the trait is dyn-compatible.
pub trait SummaryProvider: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Summarize `content`. Errors are user-facing messages.
    fn summarize<'a>(&'a self, content: &'a str, options: &'a SummaryOptions)
    -> SummaryFuture<'a>;
}

/// Create the provider for `kind` with its default endpoint.
pub fn create_provider(kind: ProviderKind) -> Result<Box<dyn SummaryProvider>, String> {
    Ok(match kind {
        ProviderKind::Claude => Box::new(ClaudeProvider::new()?),
        ProviderKind::OpenAi => Box::new(OpenAiProvider::new()?),
    })
}

/// Build the HTTP client shared by the providers.
pub(crate) fn http_client() -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .user_agent(concat!("notesum/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| format!("failed to build HTTP client: {e}"))
}

/// Reject a missing API key before any request is made.
pub(crate) fn require_api_key(options: &SummaryOptions) -> Result<&str, String> {
    let key = options.api_key.trim();
    if key.is_empty() {
        Err("API key is not configured".to_string())
    } else {
        Ok(key)
    }
}
