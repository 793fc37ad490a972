//! Finding the managed section and the insertion point for a new one.

use tracing::trace;

use super::document::{Document, Position};
use super::markers::{is_front_matter_marker, is_section_marker, is_section_terminator};

/// The managed section as found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedSection {
    /// Index of the marker line.
    pub start_line: usize,
    /// Index of the last line belonging to the section (inclusive).
    pub end_line: usize,
    /// Exact text of lines `start_line..=end_line`, terminators included.
    pub raw_text: String,
}

impl LocatedSection {
    /// Number of lines spanned by the section.
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

/// Locate the managed section.
///
/// The first line that trims to the section marker starts the section; later
/// duplicates are ignored. The section runs up to (not including) the next
/// heading of the same or a coarser level, or to the last line.
pub fn locate(text: &str) -> Option<LocatedSection> {
    locate_in(&Document::new(text))
}

pub(crate) fn locate_in(doc: &Document<'_>) -> Option<LocatedSection> {
    let start_line = doc
        .lines()
        .find(|(_, line)| is_section_marker(line))
        .map(|(i, _)| i)?;

    let end_line = ((start_line + 1)..doc.line_count())
        .find(|&i| is_section_terminator(doc.line(i)))
        .map(|i| i - 1)
        .unwrap_or(doc.line_count() - 1);

    trace!(start_line, end_line, "located summary section");

    Some(LocatedSection {
        start_line,
        end_line,
        raw_text: doc.span(start_line..end_line + 1).to_string(),
    })
}

/// Where a new section goes when none exists: right after a leading front
/// matter block, otherwise at the very top.
///
/// Front matter is recognized only when line 0 is `---` and a later line is
/// `---` as well.
pub fn insertion_point(text: &str) -> Position {
    insertion_point_in(&Document::new(text))
}

pub(crate) fn insertion_point_in(doc: &Document<'_>) -> Position {
    if doc.is_empty() || !is_front_matter_marker(doc.line(0)) {
        return Position::default();
    }
    (1..doc.line_count())
        .find(|&i| is_front_matter_marker(doc.line(i)))
        .map(|close| Position::new(close + 1, 0))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_section() {
        assert_eq!(locate("# Title\nbody\n"), None);
        assert_eq!(locate(""), None);
    }

    #[test]
    fn section_runs_to_end_of_document() {
        let text = "# Title\n## Summary\nS1\n\n*Updated: t*\n";
        let found = locate(text).unwrap();
        assert_eq!(found.start_line, 1);
        assert_eq!(found.end_line, 4);
        assert_eq!(found.raw_text, "## Summary\nS1\n\n*Updated: t*\n");
    }

    #[test]
    fn section_stops_before_sibling_or_parent_heading() {
        let text = "## Summary\nS1\n### kept\nmore\n## Next\ntail\n";
        let found = locate(text).unwrap();
        assert_eq!(found.end_line, 3);
        assert!(found.raw_text.ends_with("more\n"));

        let text = "## Summary\nS1\n# Parent\n";
        assert_eq!(locate(text).unwrap().end_line, 1);
    }

    #[test]
    fn marker_as_last_line() {
        let found = locate("intro\n## Summary").unwrap();
        assert_eq!(found.start_line, 1);
        assert_eq!(found.end_line, 1);
        assert_eq!(found.raw_text, "## Summary");
    }

    #[test]
    fn first_duplicate_marker_wins() {
        let text = "## Summary\nfirst\n## Summary\nsecond\n";
        let found = locate(text).unwrap();
        assert_eq!(found.start_line, 0);
        // The duplicate is itself a level-2 heading, so it ends the section.
        assert_eq!(found.end_line, 1);
    }

    #[test]
    fn insertion_at_top_without_front_matter() {
        assert_eq!(insertion_point("# Title\n"), Position::new(0, 0));
        assert_eq!(insertion_point(""), Position::new(0, 0));
    }

    #[test]
    fn insertion_after_front_matter() {
        let text = "---\ntags: [a]\n---\n# Title\n";
        assert_eq!(insertion_point(text), Position::new(3, 0));
    }

    #[test]
    fn unterminated_front_matter_is_ignored() {
        let text = "---\ntags: [a]\n# Title\n";
        assert_eq!(insertion_point(text), Position::new(0, 0));
    }

    #[test]
    fn front_matter_must_start_at_line_zero() {
        let text = "\n---\na: b\n---\n";
        assert_eq!(insertion_point(text), Position::new(0, 0));
    }
}
