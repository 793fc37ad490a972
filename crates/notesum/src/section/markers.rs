//! Fixed marker vocabulary for the managed summary section.
//!
//! Every marker is recognized as a whole line (after trimming), never as a
//! substring, so summary text that merely mentions a marker is inert.

use std::borrow::Cow;

/// Heading line that identifies the managed section.
pub const SECTION_MARKER: &str = "## Summary";

/// Opening and closing lines of the front matter block.
pub const FRONT_MATTER_MARKER: &str = "---";

/// Opening line of the collapsible history container.
pub const HISTORY_OPEN: &str = "<details>";

/// Closing line of the collapsible history container.
pub const HISTORY_CLOSE: &str = "</details>";

/// Caption line emitted right after [`HISTORY_OPEN`].
pub const HISTORY_CAPTION: &str = "<summary>Summary history</summary>";

/// Level of [`ENTRY_PREFIX`] headings.
const ENTRY_LEVEL: usize = 3;

/// Prepended to summary lines that would otherwise read as structure.
const ESCAPE: char = '\\';

const LABEL_PREFIX: &str = "*Updated: ";
const LABEL_SUFFIX: &str = "*";
const ENTRY_PREFIX: &str = "### ";

/// Level of a Markdown ATX heading: the number of leading `#` characters
/// when followed by whitespace. Lines without a heading return `None`.
pub fn heading_level(line: &str) -> Option<usize> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if hashes == 0 {
        return None;
    }
    match line.trim_start_matches('#').chars().next() {
        Some(c) if c.is_whitespace() => Some(hashes),
        _ => None,
    }
}

/// Level of [`SECTION_MARKER`].
pub fn section_level() -> usize {
    heading_level(SECTION_MARKER).unwrap_or(2)
}

/// Whether `line` is the section marker.
pub fn is_section_marker(line: &str) -> bool {
    line.trim() == SECTION_MARKER
}

/// Whether `line` ends the managed section: a heading of the same or a
/// coarser level than the marker. Matched against the untrimmed line, so an
/// indented `##` does not count.
pub fn is_section_terminator(line: &str) -> bool {
    heading_level(line).is_some_and(|level| level <= section_level())
}

pub fn is_front_matter_marker(line: &str) -> bool {
    line.trim_end() == FRONT_MATTER_MARKER
}

pub fn is_history_open(line: &str) -> bool {
    line.trim() == HISTORY_OPEN
}

pub fn is_history_close(line: &str) -> bool {
    line.trim() == HISTORY_CLOSE
}

/// `*Updated: <timestamp>*`
pub fn timestamp_label(timestamp: &str) -> String {
    format!("{LABEL_PREFIX}{timestamp}{LABEL_SUFFIX}")
}

/// Timestamp carried by a label line, or `None` if `line` is not a label.
/// A label with an empty timestamp yields `Some("")`.
pub fn parse_timestamp_label(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix(LABEL_PREFIX)?;
    let inner = inner.strip_suffix(LABEL_SUFFIX)?;
    Some(inner.trim())
}

/// `### <timestamp>`
pub fn entry_heading(timestamp: &str) -> String {
    format!("{ENTRY_PREFIX}{timestamp}")
}

/// Timestamp carried by a history entry heading.
pub fn parse_entry_heading(line: &str) -> Option<&str> {
    if heading_level(line) != Some(3) {
        return None;
    }
    line.strip_prefix("###").map(str::trim)
}

/// Escape every line of summary text that the parser would otherwise treat
/// as structure: history markers, timestamp labels, and headings of level 1
/// to 3 (which would end the section or start a history entry). A `\\` is
/// inserted after the indentation, which Markdown renders away.
///
/// Lines that already carry escapes get one more, so [`unescape_text`]
/// always restores the original.
pub fn escape_text(text: &str) -> String {
    map_lines(text, |indent, body, bare| {
        is_structural(indent, bare).then(|| format!("{indent}{ESCAPE}{body}"))
    })
}

/// Inverse of [`escape_text`].
pub fn unescape_text(text: &str) -> String {
    map_lines(text, |indent, body, bare| {
        let rest = body.strip_prefix(ESCAPE)?;
        is_structural(indent, bare).then(|| format!("{indent}{rest}"))
    })
}

fn is_structural(indent: &str, bare: &str) -> bool {
    is_history_open(bare)
        || is_history_close(bare)
        || parse_timestamp_label(bare).is_some()
        || (indent.is_empty() && heading_level(bare).is_some_and(|level| level <= ENTRY_LEVEL))
}

/// Apply `rewrite` to each `\n`-separated line as `(indent, body, bare)`,
/// where `body` follows the indentation and `bare` is `body` without leading
/// escapes. Lines for which it returns `None` are kept as they are.
fn map_lines(text: &str, rewrite: impl Fn(&str, &str, &str) -> Option<String>) -> String {
    text.split('\n')
        .map(|line| {
            let body = line.trim_start();
            let (indent, _) = line.split_at(line.len() - body.len());
            let bare = body.trim_start_matches(ESCAPE);
            rewrite(indent, body, bare).map_or(Cow::Borrowed(line), Cow::Owned)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
