//! Convenience re-exports for common `notesum` types.
//!
//! ```ignore
//! use notesum::prelude::*;
//! ```
//!
//! Lower-level pieces (markers, line edits, retry classification) stay in
//! their modules.

// ── Section engine ──────────────────────────────────────────────────
pub use crate::section::{
    HistoryEntry, LocatedSection, Removal, SummaryBlock, insertion_point, locate, remove, upsert,
};

// ── Summarization ───────────────────────────────────────────────────
pub use crate::prompt::SummaryLength;
pub use crate::provider::{
    ClaudeProvider, OpenAiProvider, ProviderKind, SummaryOptions, SummaryProvider,
    create_provider,
};
pub use crate::summarizer::SummarizerService;

// ── Settings and time ───────────────────────────────────────────────
pub use crate::config::Settings;
pub use crate::timestamp::current_timestamp;
