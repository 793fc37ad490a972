//! Persistent user settings.
//!
//! Settings live in a small JSON file. Every field has a default, so a missing
//! file or a file written by an older version still loads. The API key may
//! also come from the environment, which keeps it out of the file entirely.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::files::write_atomic;
use crate::prompt::SummaryLength;
use crate::provider::{ProviderKind, SummaryOptions};

/// Checked before the provider-specific variable.
pub const API_KEY_ENV: &str = "NOTESUM_API_KEY";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub provider: ProviderKind,
    pub api_key: String,
    pub model: String,
    pub summary_length: SummaryLength,
    pub first_run_complete: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let provider = ProviderKind::default();
        Self {
            provider,
            api_key: String::new(),
            model: provider.default_model().to_string(),
            summary_length: SummaryLength::default(),
            first_run_complete: false,
        }
    }
}

impl Settings {
    /// `$HOME/.config/notesum/settings.json`, or a relative path when `HOME`
    /// is unset.
    pub fn default_path() -> PathBuf {
        let base = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        base.join(".config").join("notesum").join("settings.json")
    }

    /// Load settings from `path`, falling back to defaults when the file does
    /// not exist.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            debug!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read settings: {e}"))?;
        let mut settings: Settings =
            serde_json::from_str(&data).map_err(|e| format!("failed to parse settings: {e}"))?;
        if settings.model.trim().is_empty() {
            settings.model = settings.provider.default_model().to_string();
        }
        debug!(
            "loaded settings from {} (provider={}, model={})",
            path.display(),
            settings.provider,
            settings.model
        );
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| format!("failed to serialize settings: {e}"))?;
        write_atomic(path, &data)?;
        debug!("saved settings to {}", path.display());
        Ok(())
    }

    /// Switch provider. A provider change resets the model to the new
    /// provider's default.
    pub fn set_provider(&mut self, provider: ProviderKind) {
        if provider != self.provider {
            self.provider = provider;
            self.model = provider.default_model().to_string();
        }
    }

    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.set_provider(provider);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_summary_length(mut self, length: SummaryLength) -> Self {
        self.summary_length = length;
        self
    }

    /// The configured key, else [`API_KEY_ENV`], else the provider's own
    /// variable. Empty when none is set.
    pub fn resolve_api_key(&self) -> String {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// [`resolve_api_key`](Self::resolve_api_key) with an explicit variable
    /// lookup.
    pub fn resolve_api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> String {
        if !self.api_key.trim().is_empty() {
            return self.api_key.trim().to_string();
        }
        [API_KEY_ENV, self.provider.api_key_env()]
            .into_iter()
            .filter_map(&lookup)
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
            .unwrap_or_default()
    }

    /// Request options for one summarization.
    pub fn summary_options(&self) -> SummaryOptions {
        SummaryOptions {
            api_key: self.resolve_api_key(),
            model: self.model.clone(),
            length: self.summary_length,
        }
    }

    /// The resolved key with all but the last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        mask_key(&self.resolve_api_key())
    }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.trim().chars().collect();
    match chars.len() {
        0 => "(not set)".to_string(),
        n if n <= 4 => "*".repeat(n),
        n => {
            let tail: String = chars[n - 4..].iter().collect();
            format!("{}{tail}", "*".repeat(n - 4))
        }
    }
}
