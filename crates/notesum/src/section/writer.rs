//! Create, update and remove the managed section.
//!
//! All operations are pure: they take the document text and return either a
//! new document or a [`LineEdit`] describing the change, leaving every line
//! outside the section untouched. Callers that locate and apply in two steps
//! must not let the document change in between.

use std::ops::Range;

use tracing::{debug, info, warn};

use super::block::{HistoryContainer, HistoryEntry, SummaryBlock};
use super::document::Document;
use super::locator::{LocatedSection, insertion_point_in, locate_in};

/// Replace the half-open line range `lines` with `replacement`.
///
/// An empty range is a pure insertion before line `lines.start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEdit {
    pub lines: Range<usize>,
    pub replacement: String,
}

impl LineEdit {
    /// Apply the edit to `text`. The range is clamped to the document, and
    /// inserting past a final line without a terminator supplies one first.
    pub fn apply(&self, text: &str) -> String {
        let doc = Document::new(text);
        let (start, end) = doc.clamp(self.lines.clone());
        let (head, _) = text.split_at(doc.byte_offset(start));
        let (_, tail) = text.split_at(doc.byte_offset(end));

        let mut out = String::with_capacity(text.len() + self.replacement.len() + 1);
        out.push_str(head);
        if !head.is_empty() && !head.ends_with('\n') && !self.replacement.is_empty() {
            out.push_str(doc.line_ending());
        }
        out.push_str(&self.replacement);
        out.push_str(tail);
        out
    }
}

/// Outcome of [`remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// The resulting document; the input unchanged when nothing was removed.
    pub document: String,
    /// Whether a section was found and deleted.
    pub removed: bool,
}

/// Compute the edit that writes `content` into the section.
///
/// With no located section, a new block is inserted at the insertion point.
/// Otherwise the section is rewritten: its previous content becomes the
/// newest history entry (stamped with its previous label, or with
/// `timestamp` when the label is missing) and the new content takes its
/// place.
pub fn plan_apply(
    text: &str,
    located: Option<&LocatedSection>,
    content: &str,
    timestamp: &str,
) -> LineEdit {
    let doc = Document::new(text);
    match located {
        None => {
            let at = insertion_point_in(&doc);
            info!(line = at.line, "creating summary section");
            LineEdit {
                lines: at.line..at.line,
                replacement: match_line_ending(
                    SummaryBlock::render(content, timestamp, None),
                    doc.line_ending(),
                ),
            }
        }
        Some(section) => {
            let previous = SummaryBlock::parse(&section.raw_text);
            let superseded_at = previous.timestamp.unwrap_or_else(|| {
                debug!("previous summary has no timestamp label; using the new timestamp");
                timestamp.to_string()
            });
            let entry = HistoryEntry::new(superseded_at, previous.content);

            let history = match previous.history {
                Some(mut history) => {
                    if !history.is_closed() {
                        warn!("summary history container is not closed; repairing");
                    }
                    history.push(&entry);
                    history
                }
                None => HistoryContainer::with_entry(&entry),
            };

            info!(
                start_line = section.start_line,
                end_line = section.end_line,
                superseded = %entry.timestamp,
                "updating summary section"
            );
            LineEdit {
                lines: section.start_line..section.end_line + 1,
                replacement: match_line_ending(
                    SummaryBlock::render(content, timestamp, Some(&history)),
                    doc.line_ending(),
                ),
            }
        }
    }
}

/// Rewrite `\n`-terminated `block` to use the document's line ending.
fn match_line_ending(block: String, ending: &str) -> String {
    if ending == "\n" {
        block
    } else {
        block.replace("\r\n", "\n").replace('\n', ending)
    }
}

/// Write `content` into the section and return the new document.
pub fn apply(
    text: &str,
    located: Option<&LocatedSection>,
    content: &str,
    timestamp: &str,
) -> String {
    plan_apply(text, located, content, timestamp).apply(text)
}

/// Locate the section and write `content` into it in one step.
pub fn upsert(text: &str, content: &str, timestamp: &str) -> String {
    let located = locate_in(&Document::new(text));
    apply(text, located.as_ref(), content, timestamp)
}

/// The edit that deletes the section, or `None` when there is none.
pub fn plan_remove(located: Option<&LocatedSection>) -> Option<LineEdit> {
    located.map(|section| LineEdit {
        lines: section.start_line..section.end_line + 1,
        replacement: String::new(),
    })
}

/// Delete the section, including all of its history.
///
/// This is irreversible: the superseded summaries are gone once the result
/// replaces the caller's document.
pub fn remove(text: &str, located: Option<&LocatedSection>) -> Removal {
    match plan_remove(located) {
        Some(edit) => {
            info!(
                start_line = edit.lines.start,
                end_line = edit.lines.end - 1,
                "removing summary section"
            );
            Removal {
                document: edit.apply(text),
                removed: true,
            }
        }
        None => {
            debug!("no summary section to remove");
            Removal {
                document: text.to_string(),
                removed: false,
            }
        }
    }
}
