//! Block parser & document builder: explanation text → render calls.
//!
//! The generation stage produces loosely markdown-like text: numbered
//! sections (`1. Overview:`), numbered sub-sections (`1.2 Details`), fenced
//! code blocks, pipe-delimited tables, and plain prose with `**bold**`
//! markers. This module walks that text line by line and drives a
//! [`DocumentSink`] with one render call per completed block.
//!
//! ## State machine
//!
//! Three mutually exclusive states — `Normal`, `InCodeBlock`, `InTable` —
//! plus an always-present pending-section buffer (current heading label +
//! content not yet emitted). Classification runs in a fixed priority order: blank-line skip,
//! fence toggle, in-fence passthrough, table row, table termination,
//! sub-heading, section heading, paragraph. The order is load-bearing: a
//! heading-shaped line inside a fence is code, a fence marker between table
//! rows does not end the table, and the line that does end a table is
//! reclassified rather than dropped.
//!
//! Malformed structures degrade instead of failing: a table with a lone row
//! is skipped, an unclosed fence drops its buffer at end of input, and both
//! are reported as [`ParseWarning`]s in the returned [`ParseStats`]. The
//! only errors that leave this module are the sink's own.

use crate::error::ParseWarning;
use crate::pipeline::inline;
use crate::sink::DocumentSink;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

static SECTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{1,2})\.\s*(.+?)(:|$)").unwrap());

static SUBHEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{1,2})\.(\d+)\s+(.+)").unwrap());

static TABLE_ROW_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\|(.+?)\|$").unwrap());

/// Active multi-line block, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    InCodeBlock,
    InTable,
}

/// The in-progress (heading, buffered content) pair not yet emitted.
///
/// Sub-headings ride along in the buffer so they flush at their input
/// position between paragraphs; they never affect the label and never
/// trigger a flush themselves.
#[derive(Debug, Default)]
struct PendingSection {
    label: String,
    items: Vec<PendingItem>,
}

#[derive(Debug)]
enum PendingItem {
    Paragraph(String),
    SubHeading(String),
}

/// Counts of rendered blocks plus the degradations encountered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseStats {
    pub headings: usize,
    pub subheadings: usize,
    pub paragraphs: usize,
    pub code_blocks: usize,
    pub tables: usize,
    pub warnings: Vec<ParseWarning>,
}

impl ParseStats {
    /// Total number of render calls issued to the sink.
    pub fn blocks(&self) -> usize {
        self.headings + self.subheadings + self.paragraphs + self.code_blocks + self.tables
    }
}

/// Line-by-line builder that flushes completed blocks into a sink.
///
/// One builder serves one conversion: feed the text (all at once or in
/// chunks), then call [`finish`](Self::finish) to flush whatever is still
/// buffered and get the sink back. The builder owns the sink for the
/// duration, so a conversion can never observe a half-written document
/// from another one.
pub struct DocumentBuilder<S: DocumentSink> {
    sink: S,
    state: State,
    pending: PendingSection,
    code_lines: Vec<String>,
    table_rows: Vec<String>,
    stats: ParseStats,
}

impl<S: DocumentSink> DocumentBuilder<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            state: State::Normal,
            pending: PendingSection::default(),
            code_lines: Vec::new(),
            table_rows: Vec::new(),
            stats: ParseStats::default(),
        }
    }

    /// Feed a chunk of explanation text, line by line.
    pub fn feed(&mut self, text: &str) -> Result<(), S::Error> {
        for line in text.lines() {
            self.line(line)?;
        }
        Ok(())
    }

    /// Classify and process a single input line.
    pub fn line(&mut self, raw: &str) -> Result<(), S::Error> {
        let line = raw.trim();
        if line.is_empty() {
            return Ok(());
        }

        // Fence markers win over everything else; the language tag after
        // the backticks is ignored.
        if line.starts_with("```") {
            return self.toggle_fence();
        }
        if self.state == State::InCodeBlock {
            // Verbatim passthrough — heading- and table-shaped lines included.
            self.code_lines.push(line.to_string());
            return Ok(());
        }

        if TABLE_ROW_RE.is_match(line) {
            self.table_rows.push(line.to_string());
            self.state = State::InTable;
            return Ok(());
        }
        if self.state == State::InTable {
            // A non-table line ends the table. Buffered prose goes out
            // first to keep input order, then the table; the current line
            // falls through to be classified as heading or paragraph.
            self.flush_pending()?;
            self.flush_table()?;
            self.state = State::Normal;
        }

        // Sub-heading before section: every sub-heading line also matches
        // the section pattern, never the reverse. The sub-heading joins the
        // pending buffer (keeping its input position) but neither flushes
        // the section nor replaces its label.
        if let Some(m) = SUBHEADING_RE.find(line) {
            self.pending
                .items
                .push(PendingItem::SubHeading(m.as_str().to_string()));
            return Ok(());
        }
        if let Some(m) = SECTION_RE.find(line) {
            self.flush_pending()?;
            self.pending.label = m.as_str().to_string();
            return Ok(());
        }

        self.pending
            .items
            .push(PendingItem::Paragraph(line.to_string()));
        Ok(())
    }

    /// Flush everything still buffered and return the sink with stats.
    ///
    /// Buffered table rows flush even when input ended inside an unclosed
    /// fence; the fence's own buffer is dropped (and reported) — there is
    /// no way to tell how the dangling block was meant to end.
    pub fn finish(mut self) -> Result<(S, ParseStats), S::Error> {
        if self.state == State::InCodeBlock && !self.code_lines.is_empty() {
            debug!(
                lines = self.code_lines.len(),
                "dropping unterminated code fence"
            );
            self.stats.warnings.push(ParseWarning::UnterminatedCodeBlock {
                lines: self.code_lines.len(),
            });
            self.code_lines.clear();
        }

        if !self.table_rows.is_empty() {
            self.flush_pending()?;
            self.flush_table()?;
        } else {
            self.flush_pending()?;
        }
        Ok((self.sink, self.stats))
    }

    fn toggle_fence(&mut self) -> Result<(), S::Error> {
        if self.state == State::InCodeBlock {
            if !self.code_lines.is_empty() {
                let lines = std::mem::take(&mut self.code_lines);
                self.sink.code_block(&lines)?;
                self.stats.code_blocks += 1;
            }
            // Rows buffered before the fence opened are still pending.
            self.state = if self.table_rows.is_empty() {
                State::Normal
            } else {
                State::InTable
            };
        } else {
            self.state = State::InCodeBlock;
        }
        Ok(())
    }

    /// Emit the pending heading (if labelled) and its buffered content in
    /// input order, clearing both.
    fn flush_pending(&mut self) -> Result<(), S::Error> {
        let label = std::mem::take(&mut self.pending.label);
        let items = std::mem::take(&mut self.pending.items);

        if !label.is_empty() {
            self.sink.heading(&label)?;
            self.stats.headings += 1;
        }
        for item in &items {
            match item {
                PendingItem::Paragraph(text) => {
                    if inline::has_dangling_marker(text) {
                        self.stats.warnings.push(ParseWarning::UnterminatedBold);
                    }
                    self.sink.paragraph(&inline::bold_spans(text))?;
                    self.stats.paragraphs += 1;
                }
                PendingItem::SubHeading(text) => {
                    self.sink.subheading(text)?;
                    self.stats.subheadings += 1;
                }
            }
        }
        Ok(())
    }

    /// Render the buffered rows as a table, or skip them when malformed.
    ///
    /// Row 0 is the header, row 1 is assumed to be the markdown separator
    /// and skipped unconditionally, the rest are data. Column counts are
    /// not validated; short rows render partially filled.
    fn flush_table(&mut self) -> Result<(), S::Error> {
        let rows = std::mem::take(&mut self.table_rows);
        if rows.len() < 2 {
            debug!(rows = rows.len(), "skipping malformed table");
            self.stats
                .warnings
                .push(ParseWarning::MalformedTable { rows: rows.len() });
            return Ok(());
        }

        let headers = split_header_cells(&rows[0]);
        let data: Vec<Vec<String>> = rows[2..].iter().map(|r| split_row_cells(r)).collect();
        self.sink.table(&headers, &data)?;
        self.stats.tables += 1;
        Ok(())
    }
}

/// Run the whole transform in one call: feed `text`, finish, return the
/// sink and stats.
pub fn build_document<S: DocumentSink>(text: &str, sink: S) -> Result<(S, ParseStats), S::Error> {
    let mut builder = DocumentBuilder::new(sink);
    builder.feed(text)?;
    builder.finish()
}

/// Header cells tolerate markdown emphasis: `| **Name** |` → `Name`.
fn split_header_cells(row: &str) -> Vec<String> {
    row.split('|')
        .filter(|cell| !cell.trim().is_empty())
        .map(|cell| cell.trim_matches(|c: char| c == ' ' || c == '*').to_string())
        .collect()
}

fn split_row_cells(row: &str) -> Vec<String> {
    row.split('|')
        .filter(|cell| !cell.trim().is_empty())
        .map(|cell| cell.trim().to_string())
        .collect()
}
