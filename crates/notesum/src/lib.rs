//! Versioned summary sections for Markdown notes.
//!
//! `notesum` keeps one `## Summary` section near the top of a note and
//! rewrites it whenever a new summary is produced. Earlier summaries are not
//! lost: each update moves the previous text into a collapsible `<details>`
//! history inside the section, oldest first. Everything outside the section
//! is left byte-for-byte intact.
//!
//! The section engine in [`section`] is pure and synchronous. It takes a
//! finished summary string and a note, and returns the new note. Producing
//! the summary is a separate concern handled by a [`SummaryProvider`]
//! (Claude or OpenAI) behind a [`SummarizerService`].
//!
//! # Getting started
//!
//! Writing a summary you already have:
//!
//! ```
//! use notesum::section;
//!
//! let note = "# Title\nbody text\n";
//! let note = section::upsert(note, "S1", "2024-01-01 10:00");
//! let note = section::upsert(&note, "S2", "2024-01-02 11:00");
//!
//! let located = section::locate(&note).unwrap();
//! let block = section::SummaryBlock::parse(&located.raw_text);
//! assert_eq!(block.content, "S2");
//! assert_eq!(block.history.unwrap().entries()[0].content, "S1");
//! ```
//!
//! Summarizing a note through a provider:
//!
//! ```ignore
//! use notesum::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), String> {
//!     let settings = Settings::load(&Settings::default_path())?;
//!     let service = SummarizerService::new(settings.provider)?;
//!
//!     let note = std::fs::read_to_string("note.md").map_err(|e| e.to_string())?;
//!     let updated = service
//!         .summarize_note(&note, &settings.summary_options(), &current_timestamp())
//!         .await?;
//!     std::fs::write("note.md", updated).map_err(|e| e.to_string())?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`section`] | Locating, creating, updating and removing the summary section |
//! | [`provider`] | [`SummaryProvider`] trait, Claude and OpenAI backends |
//! | [`summarizer`] | Input validation and note-to-section orchestration |
//! | [`prompt`] | Prompt text and [`SummaryLength`](prompt::SummaryLength) |
//! | [`api`] | Retry with backoff, HTTP error messages |
//! | [`config`] | [`Settings`](config::Settings) file and API key lookup |
//! | [`timestamp`] | Section timestamp format |
//! | [`files`] | Text file reads and atomic writes |

pub mod api;
pub mod config;
pub mod files;
pub mod prelude;
pub mod prompt;
pub mod provider;
pub mod section;
pub mod summarizer;
pub mod timestamp;

pub use provider::{ProviderKind, SummaryProvider, create_provider};
pub use summarizer::SummarizerService;
