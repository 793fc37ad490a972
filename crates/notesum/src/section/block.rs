//! Parsed structure of the managed section.
//!
//! A section body is scanned line by line for three kinds of structural
//! lines: timestamp labels, the history container's opening marker, and its
//! matching closing marker. Everything else is summary content. The current
//! timestamp is the last label before the history container, and the
//! container is the first opening marker after that label (or after the
//! heading when there is no label), running to its balanced closing marker.
//!
//! Summary text is escaped on write (see [`escape_text`]) so that none of its
//! lines can be mistaken for structure, and unescaped on read.

use super::document::Document;
use super::markers::{
    HISTORY_CAPTION, HISTORY_CLOSE, HISTORY_OPEN, SECTION_MARKER, entry_heading, escape_text,
    is_history_close, is_history_open, is_section_marker, parse_entry_heading,
    parse_timestamp_label, timestamp_label, unescape_text,
};

/// One superseded version of the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// When the superseded content was written.
    pub timestamp: String,
    /// The superseded content.
    pub content: String,
}

impl HistoryEntry {
    pub fn new(timestamp: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            content: content.into(),
        }
    }

    /// `### <timestamp>`, the content, then a blank line. Content lines that
    /// would read as structure are escaped.
    pub fn render(&self) -> String {
        let content = escape_text(trim_line_breaks(&self.content));
        if content.is_empty() {
            format!("{}\n\n", entry_heading(&self.timestamp))
        } else {
            format!("{}\n{content}\n\n", entry_heading(&self.timestamp))
        }
    }
}

/// The collapsible container holding [`HistoryEntry`] records.
///
/// Existing container text is kept byte-for-byte; new entries are spliced in
/// right before the closing marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryContainer {
    text: String,
    /// Nesting levels left open at the end of the text. Zero when well formed.
    unclosed: usize,
}

impl HistoryContainer {
    /// A fresh container holding a single entry.
    pub fn with_entry(entry: &HistoryEntry) -> Self {
        Self {
            text: format!(
                "{HISTORY_OPEN}\n{HISTORY_CAPTION}\n\n{}{HISTORY_CLOSE}\n",
                entry.render()
            ),
            unclosed: 0,
        }
    }

    /// Whether the opening marker has a matching closing marker.
    pub fn is_closed(&self) -> bool {
        self.unclosed == 0
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Append `entry` as the newest entry.
    ///
    /// A well-formed container gets the entry immediately before its closing
    /// marker. An unclosed one has any inner levels closed, the entry
    /// appended at the end, and a fresh closing marker added.
    pub fn push(&mut self, entry: &HistoryEntry) {
        if self.is_closed() {
            let doc = Document::new(&self.text);
            let close_line = doc.line_count().saturating_sub(1);
            let head = doc.span(0..close_line);
            let closing = doc.raw_line(close_line);
            let mut text = String::with_capacity(self.text.len() + entry.content.len() + 32);
            text.push_str(head);
            text.push_str(&entry.render());
            text.push_str(closing);
            if !text.ends_with('\n') {
                text.push('\n');
            }
            self.text = text;
            return;
        }

        if !self.text.ends_with('\n') {
            self.text.push('\n');
        }
        for _ in 1..self.unclosed {
            self.text.push_str(HISTORY_CLOSE);
            self.text.push('\n');
        }
        self.text.push_str(&entry.render());
        self.text.push_str(HISTORY_CLOSE);
        self.text.push('\n');
        self.unclosed = 0;
    }

    /// Entries in insertion order, oldest first.
    ///
    /// Only `###` headings directly inside the container start entries;
    /// headings nested in an inner container belong to the enclosing entry.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        let doc = Document::new(&self.text);
        let mut entries = Vec::new();
        let mut current: Option<(String, Vec<&str>)> = None;
        let mut depth = 0usize;

        for (_, line) in doc.lines() {
            if is_history_open(line) {
                depth += 1;
                if depth == 1 {
                    continue;
                }
            } else if is_history_close(line) {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    break;
                }
            } else if depth == 1 {
                if let Some(timestamp) = parse_entry_heading(line) {
                    if let Some((ts, body)) = current.take() {
                        entries.push(HistoryEntry::new(ts, unescape_text(&join_trimmed(&body))));
                    }
                    current = Some((timestamp.to_string(), Vec::new()));
                    continue;
                }
            }
            if let Some((_, body)) = current.as_mut() {
                body.push(line);
            }
        }

        if let Some((ts, body)) = current {
            entries.push(HistoryEntry::new(ts, unescape_text(&join_trimmed(&body))));
        }
        entries
    }
}

/// The managed section split into its logical parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryBlock {
    /// Current summary text, without labels or history.
    pub content: String,
    /// Timestamp of the current content, if a non-empty label was present.
    pub timestamp: Option<String>,
    /// The history container, if one exists.
    pub history: Option<HistoryContainer>,
}

impl SummaryBlock {
    /// Parse a section's raw text. Never fails: anything unrecognized is
    /// treated as content.
    pub fn parse(raw: &str) -> Self {
        let doc = Document::new(raw);
        let n = doc.line_count();
        let body_start = usize::from(n > 0 && is_section_marker(doc.line(0)));

        // The section's own label is the last one before the history
        // container, and the container is the first opening marker after it.
        let mut label = None;
        let mut open = None;
        for i in body_start..n {
            let line = doc.line(i);
            if parse_timestamp_label(line).is_some() {
                label = Some(i);
            } else if label.is_some() && is_history_open(line) {
                open = Some(i);
                break;
            }
        }
        if label.is_none() {
            open = (body_start..n).find(|&i| is_history_open(doc.line(i)));
        }
        let history_range = open.map(|open| {
            let (end, unclosed) = container_extent(&doc, open);
            (open, end, unclosed)
        });
        let timestamp = label
            .and_then(|i| parse_timestamp_label(doc.line(i)))
            .filter(|ts| !ts.is_empty())
            .map(str::to_string);

        let in_history =
            |i: usize| history_range.is_some_and(|(open, end, _)| i >= open && i < end);

        let content_lines: Vec<&str> = (body_start..n)
            .filter(|&i| !in_history(i))
            .map(|i| doc.line(i))
            .filter(|line| parse_timestamp_label(line).is_none())
            .collect();

        let history = history_range.map(|(open, end, unclosed)| HistoryContainer {
            text: doc.span(open..end).to_string(),
            unclosed,
        });

        Self {
            content: unescape_text(&join_trimmed(&content_lines)),
            timestamp,
            history,
        }
    }

    /// Serialize a section: heading, content, blank line, timestamp label,
    /// blank line, then the history container (if any) and a blank line.
    pub fn render(content: &str, timestamp: &str, history: Option<&HistoryContainer>) -> String {
        let mut out = format!(
            "{SECTION_MARKER}\n{}\n\n{}\n\n",
            escape_text(trim_line_breaks(content)),
            timestamp_label(timestamp)
        );
        if let Some(history) = history {
            out.push_str(history.as_str());
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }
}

/// End (exclusive) of the container opened at `open`, and how many levels
/// remain open if it runs off the end of the section.
fn container_extent(doc: &Document<'_>, open: usize) -> (usize, usize) {
    let mut depth = 0usize;
    for i in open..doc.line_count() {
        let line = doc.line(i);
        if is_history_open(line) {
            depth += 1;
        } else if is_history_close(line) {
            depth -= 1;
            if depth == 0 {
                return (i + 1, 0);
            }
        }
    }
    (doc.line_count(), depth)
}

/// Join lines with `\n`, dropping blank lines at both ends.
fn join_trimmed(lines: &[&str]) -> String {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end]
            .iter()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

fn trim_line_breaks(text: &str) -> &str {
    text.trim_end_matches(['\n', '\r'])
}
