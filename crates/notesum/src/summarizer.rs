//! Producing a summary for a note and writing it into the note.
//!
//! [`SummarizerService`] owns one [`SummaryProvider`]. It sends only the
//! note's body (no front matter, no existing summary section) and refuses
//! notes that are empty, too short to be worth summarizing, or too long.

use tracing::{debug, info};

use crate::provider::{ProviderKind, SummaryOptions, SummaryProvider, create_provider};
use crate::section::{self, Document};

/// Notes shorter than this (in characters, trimmed) are not summarized.
pub const MIN_NOTE_CHARS: usize = 100;

/// Notes longer than this (in characters) are rejected.
pub const MAX_NOTE_CHARS: usize = 100_000;

pub struct SummarizerService {
    provider: Box<dyn SummaryProvider>,
}

impl SummarizerService {
    /// Create a service backed by the provider for `kind`.
    pub fn new(kind: ProviderKind) -> Result<Self, String> {
        Ok(Self::with_provider(create_provider(kind)?))
    }

    pub fn with_provider(provider: Box<dyn SummaryProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &dyn SummaryProvider {
        self.provider.as_ref()
    }

    /// Summarize `content` after validating it.
    pub async fn summarize(&self, content: &str, options: &SummaryOptions) -> Result<String, String> {
        validate_input(content)?;
        debug!(
            "summarizing {} chars with {} ({})",
            content.chars().count(),
            self.provider.name(),
            options.model
        );
        self.provider.summarize(content, options).await
    }

    /// Summarize a whole note and return the note with its summary section
    /// created or updated at `timestamp`.
    pub async fn summarize_note(
        &self,
        note: &str,
        options: &SummaryOptions,
        timestamp: &str,
    ) -> Result<String, String> {
        let body = note_body(note);
        let summary = self.summarize(&body, options).await?;
        info!("received summary ({} chars)", summary.chars().count());
        Ok(section::upsert(note, &summary, timestamp))
    }
}

/// The part of a note worth summarizing: everything except the front matter
/// and the managed summary section, trimmed.
pub fn note_body(note: &str) -> String {
    let doc = Document::new(note);
    let front_matter_end = section::locator::insertion_point_in(&doc).line;
    let summary = section::locator::locate_in(&doc).map(|s| s.start_line..s.end_line + 1);

    let mut body = String::with_capacity(note.len());
    for i in front_matter_end..doc.line_count() {
        if summary.as_ref().is_some_and(|r| r.contains(&i)) {
            continue;
        }
        body.push_str(doc.raw_line(i));
    }
    body.trim().to_string()
}

/// Reject notes that should not be sent to a provider.
pub fn validate_input(content: &str) -> Result<(), String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err("the note is empty".to_string());
    }
    if trimmed.chars().count() < MIN_NOTE_CHARS {
        return Err(format!(
            "the note is too short to summarize (at least {MIN_NOTE_CHARS} characters required)"
        ));
    }
    if content.chars().count() > MAX_NOTE_CHARS {
        return Err(format!(
            "the note is too long to summarize (at most {MAX_NOTE_CHARS} characters)"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::SummaryLength;
    use crate::provider::SummaryFuture;
    use std::sync::{Arc, Mutex};

    /// Echoes a fixed summary and records what it was asked to summarize.
    struct FixedProvider {
        reply: String,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl SummaryProvider for FixedProvider {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn summarize<'a>(
            &'a self,
            content: &'a str,
            _options: &'a SummaryOptions,
        ) -> SummaryFuture<'a> {
            self.seen.lock().unwrap().push(content.to_string());
            let reply = self.reply.clone();
            Box::pin(async move { Ok(reply) })
        }
    }

    fn options() -> SummaryOptions {
        SummaryOptions {
            api_key: "key".into(),
            model: "model".into(),
            length: SummaryLength::Standard,
        }
    }

    fn long_note() -> String {
        format!("# Title\n\n{}\n", "word ".repeat(40))
    }

    #[test]
    fn validation_bounds() {
        assert_eq!(validate_input("   \n").unwrap_err(), "the note is empty");
        assert!(validate_input("short").unwrap_err().contains("too short"));
        assert!(validate_input(&"x".repeat(MIN_NOTE_CHARS)).is_ok());
        assert!(
            validate_input(&"x".repeat(MAX_NOTE_CHARS + 1))
                .unwrap_err()
                .contains("too long")
        );
    }

    #[test]
    fn body_excludes_front_matter_and_summary() {
        let note = "---\ntags: [a]\n---\n## Summary\nold\n\n*Updated: T*\n\n# Title\nreal body\n";
        assert_eq!(note_body(note), "# Title\nreal body");
    }

    #[test]
    fn body_without_structure_is_whole_note() {
        assert_eq!(note_body("\n  plain note  \n"), "plain note");
    }

    fn service(reply: &str) -> (SummarizerService, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let provider = FixedProvider {
            reply: reply.to_string(),
            seen: Arc::clone(&seen),
        };
        (SummarizerService::with_provider(Box::new(provider)), seen)
    }

    #[tokio::test]
    async fn summarize_note_writes_section() {
        let (service, _) = service("S1");
        let note = long_note();

        let out = service
            .summarize_note(&note, &options(), "2024-01-01 10:00")
            .await
            .unwrap();
        assert!(out.starts_with("## Summary\nS1\n\n*Updated: 2024-01-01 10:00*\n\n# Title\n"));
        assert_eq!(service.provider().name(), "fixed");
    }

    #[tokio::test]
    async fn existing_summary_is_not_resent() {
        let (service, seen) = service("S2");
        let note = format!("## Summary\nS1\n\n*Updated: T1*\n\n{}", long_note());

        let out = service.summarize_note(&note, &options(), "T2").await.unwrap();
        assert!(out.contains("### T1\nS1\n"));
        assert!(out.starts_with("## Summary\nS2\n"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].starts_with("# Title"));
        assert!(!seen[0].contains("S1"));
    }

    #[tokio::test]
    async fn short_note_is_rejected_before_provider() {
        let (service, seen) = service("unused");
        let err = service
            .summarize_note("# tiny\n", &options(), "T")
            .await
            .unwrap_err();
        assert!(err.contains("too short"));
        assert!(seen.lock().unwrap().is_empty());
    }
}
