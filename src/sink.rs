//! The document-sink capability interface.
//!
//! The block parser never touches a concrete output format. It classifies
//! lines and calls the five render operations below, in input order, on
//! whatever [`DocumentSink`] it was handed. Decoupling classification from
//! rendering lets either half be tested on its own: the parser against
//! [`RecordingSink`], a sink against hand-written events.
//!
//! The crate ships two implementations: [`crate::html::HtmlSink`] for the
//! final artifact and [`RecordingSink`] for tests, stats, and the streaming
//! API. Callers with their own output format (PDF, docx, terminal, …)
//! implement the trait themselves.

use serde::{Deserialize, Serialize};

/// A contiguous run of paragraph text, tagged plain or bold.
///
/// Concatenating the `text` of a paragraph's spans reproduces the source
/// line with the `**…**` delimiters removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

/// Receiver for rendered blocks, called in input order by the parser.
///
/// The associated `Error` type lets a sink surface its own failure mode
/// (I/O, closed channel, …); the parser propagates it unchanged and never
/// produces errors of its own — malformed input degrades, it does not fail.
pub trait DocumentSink {
    type Error;

    /// A top-level numbered section heading, e.g. `"1. Overview:"`.
    fn heading(&mut self, text: &str) -> Result<(), Self::Error>;

    /// A numbered sub-heading, e.g. `"1.2 Details"`.
    fn subheading(&mut self, text: &str) -> Result<(), Self::Error>;

    /// A paragraph as an ordered sequence of plain/bold spans.
    fn paragraph(&mut self, spans: &[Span]) -> Result<(), Self::Error>;

    /// A fenced code block, one element per source line.
    fn code_block(&mut self, lines: &[String]) -> Result<(), Self::Error>;

    /// A table: header cells plus data rows. Rows may carry fewer cells
    /// than there are headers; sinks render what they get.
    fn table(&mut self, headers: &[String], rows: &[Vec<String>]) -> Result<(), Self::Error>;
}

/// One rendered block, as recorded by [`RecordingSink`] and emitted by the
/// streaming API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentEvent {
    Heading {
        text: String,
    },
    Subheading {
        text: String,
    },
    Paragraph {
        spans: Vec<Span>,
    },
    CodeBlock {
        lines: Vec<String>,
    },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

impl DocumentEvent {
    /// Replay this event into another sink.
    pub fn replay<S: DocumentSink>(&self, sink: &mut S) -> Result<(), S::Error> {
        match self {
            DocumentEvent::Heading { text } => sink.heading(text),
            DocumentEvent::Subheading { text } => sink.subheading(text),
            DocumentEvent::Paragraph { spans } => sink.paragraph(spans),
            DocumentEvent::CodeBlock { lines } => sink.code_block(lines),
            DocumentEvent::Table { headers, rows } => sink.table(headers, rows),
        }
    }
}

/// A sink that records every render call as a [`DocumentEvent`].
///
/// The backbone of the test suite (assert on the exact call sequence) and
/// of [`crate::stream`]. Recording cannot fail, so `Error = Infallible`.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub events: Vec<DocumentEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentSink for RecordingSink {
    type Error = std::convert::Infallible;

    fn heading(&mut self, text: &str) -> Result<(), Self::Error> {
        self.events.push(DocumentEvent::Heading {
            text: text.to_string(),
        });
        Ok(())
    }

    fn subheading(&mut self, text: &str) -> Result<(), Self::Error> {
        self.events.push(DocumentEvent::Subheading {
            text: text.to_string(),
        });
        Ok(())
    }

    fn paragraph(&mut self, spans: &[Span]) -> Result<(), Self::Error> {
        self.events.push(DocumentEvent::Paragraph {
            spans: spans.to_vec(),
        });
        Ok(())
    }

    fn code_block(&mut self, lines: &[String]) -> Result<(), Self::Error> {
        self.events.push(DocumentEvent::CodeBlock {
            lines: lines.to_vec(),
        });
        Ok(())
    }

    fn table(&mut self, headers: &[String], rows: &[Vec<String>]) -> Result<(), Self::Error> {
        self.events.push(DocumentEvent::Table {
            headers: headers.to_vec(),
            rows: rows.to_vec(),
        });
        Ok(())
    }
}
