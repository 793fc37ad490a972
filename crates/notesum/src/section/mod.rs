//! The managed summary section: locating it and rewriting it with history.
//!
//! A note carries at most one section headed `## Summary`. Writing a new
//! summary either creates that section (after any front matter) or replaces
//! its content, moving the previous content into a collapsible
//! `<details>` history that only ever grows:
//!
//! ```text
//! ## Summary
//! <current summary>
//!
//! *Updated: 2024-01-02 11:00*
//!
//! <details>
//! <summary>Summary history</summary>
//!
//! ### 2024-01-01 10:00
//! <previous summary>
//!
//! </details>
//! ```
//!
//! - [`locator`] finds the section ([`locate`]) and the spot for a new one
//!   ([`insertion_point`]).
//! - [`writer`] creates or updates ([`apply`], [`upsert`]) and deletes
//!   ([`remove`]) the section, either as whole documents or as [`LineEdit`]s.
//! - [`block`] parses a section into [`SummaryBlock`] and its
//!   [`HistoryContainer`].
//!
//! Nothing here performs I/O or returns an error. Malformed sections are
//! repaired on the next write rather than rejected.

pub mod block;
pub mod document;
pub mod locator;
pub mod markers;
pub mod writer;

pub use block::{HistoryContainer, HistoryEntry, SummaryBlock};
pub use document::{Document, Position};
pub use locator::{LocatedSection, insertion_point, locate};
pub use writer::{LineEdit, Removal, apply, plan_apply, plan_remove, remove, upsert};
