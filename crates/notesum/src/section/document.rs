//! Line-addressed, read-only view over a document buffer.
//!
//! A line is a run of text ending in `\n`; the final line may lack the
//! terminator. An empty buffer has zero lines. Every line keeps its
//! terminator when sliced, so joining consecutive spans reproduces the
//! original bytes exactly.

use std::ops::Range;

/// A `(line, column)` position in a document, both 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Borrowed view of a document split into lines.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    text: &'a str,
    /// Byte offset where each line starts.
    starts: Vec<usize>,
}

impl<'a> Document<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut starts = Vec::new();
        let mut offset = 0;
        for raw in text.split_inclusive('\n') {
            starts.push(offset);
            offset += raw.len();
        }
        Self { text, starts }
    }

    /// The full underlying text.
    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Line `index` without its `\n` / `\r\n` terminator.
    ///
    /// Out-of-range indices yield `""`.
    pub fn line(&self, index: usize) -> &'a str {
        self.raw_line(index).trim_end_matches(['\n', '\r'])
    }

    /// Line `index` including its terminator.
    pub fn raw_line(&self, index: usize) -> &'a str {
        if index >= self.starts.len() {
            return "";
        }
        self.text
            .get(self.starts[index]..self.byte_offset(index + 1))
            .unwrap_or_default()
    }

    /// Iterate over `(index, line)` pairs, terminators stripped.
    pub fn lines(&self) -> impl Iterator<Item = (usize, &'a str)> + '_ {
        (0..self.line_count()).map(move |i| (i, self.line(i)))
    }

    /// Byte offset at which line `index` begins. Indices at or past the end
    /// map to the end of the text.
    pub fn byte_offset(&self, index: usize) -> usize {
        self.starts.get(index).copied().unwrap_or(self.text.len())
    }

    /// Exact text covering the half-open line range, terminators included.
    /// The range is clamped to the document.
    pub fn span(&self, lines: Range<usize>) -> &'a str {
        let (start, end) = self.clamp(lines);
        self.text
            .get(self.byte_offset(start)..self.byte_offset(end))
            .unwrap_or_default()
    }

    /// Terminator used by the first terminated line: `"\r\n"` or `"\n"`.
    /// Documents without any terminator default to `"\n"`.
    pub fn line_ending(&self) -> &'static str {
        match self.text.split_inclusive('\n').next() {
            Some(line) if line.ends_with("\r\n") => "\r\n",
            _ => "\n",
        }
    }

    pub(crate) fn clamp(&self, lines: Range<usize>) -> (usize, usize) {
        let end = lines.end.min(self.line_count());
        let start = lines.start.min(end);
        (start, end)
    }
}
