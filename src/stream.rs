//! Streaming conversion API: emit blocks as they are rendered.
//!
//! ## Why stream?
//!
//! The eager [`crate::convert::convert`] returns only after the whole
//! artifact is assembled. A stream-based API lets callers display blocks as
//! the parser flushes them — a terminal preview, an incremental writer, a
//! server-sent-events bridge — without buffering the document.
//!
//! Blocks are always emitted in input order: the core transform is a
//! single-pass state machine, so there is no out-of-order completion to
//! worry about.

use crate::config::ConversionConfig;
use crate::error::Code2SpecError;
use crate::pipeline::{generate, input, parser};
use crate::sink::{DocumentEvent, DocumentSink, Span};
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of rendered block events.
pub type BlockStream = Pin<Box<dyn Stream<Item = DocumentEvent> + Send>>;

/// Convert a source file or URL, streaming blocks as the explanation is
/// rendered.
///
/// The LLM call itself is not streamed — the explanation is generated in
/// full, then parsed on a blocking worker while events flow to the caller.
///
/// # Returns
/// - `Ok(BlockStream)` — a stream of [`DocumentEvent`]s in input order
/// - `Err(Code2SpecError)` — fatal error (input unreadable, provider not
///   configured, generation failed)
pub async fn convert_stream(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<BlockStream, Code2SpecError> {
    let input_str = input_str.as_ref();
    info!("starting streaming conversion: {}", input_str);

    let source = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let provider = crate::convert::resolve_provider(config)?;
    let generation = generate::generate_explanation(&provider, &source.text, config).await?;

    Ok(render_stream(generation.explanation))
}

/// Stream the blocks of existing explanation text.
///
/// No LLM involved. Parsing runs on `spawn_blocking`, so this must be
/// called from within a tokio runtime; dropping the stream stops the
/// parse at the next render call.
pub fn render_stream(explanation: String) -> BlockStream {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::task::spawn_blocking(move || {
        let sink = ChannelSink { tx };
        // The only possible error is a dropped receiver; the parse simply
        // stops at that point.
        let _ = parser::build_document(&explanation, sink);
    });

    Box::pin(UnboundedReceiverStream::new(rx))
}

/// Receiver half of [`render_stream`] went away.
#[derive(Debug)]
struct ChannelClosed;

/// Sink that forwards every render call into an mpsc channel.
struct ChannelSink {
    tx: mpsc::UnboundedSender<DocumentEvent>,
}

impl ChannelSink {
    fn send(&self, event: DocumentEvent) -> Result<(), ChannelClosed> {
        self.tx.send(event).map_err(|_| ChannelClosed)
    }
}

impl DocumentSink for ChannelSink {
    type Error = ChannelClosed;

    fn heading(&mut self, text: &str) -> Result<(), Self::Error> {
        self.send(DocumentEvent::Heading {
            text: text.to_string(),
        })
    }

    fn subheading(&mut self, text: &str) -> Result<(), Self::Error> {
        self.send(DocumentEvent::Subheading {
            text: text.to_string(),
        })
    }

    fn paragraph(&mut self, spans: &[Span]) -> Result<(), Self::Error> {
        self.send(DocumentEvent::Paragraph {
            spans: spans.to_vec(),
        })
    }

    fn code_block(&mut self, lines: &[String]) -> Result<(), Self::Error> {
        self.send(DocumentEvent::CodeBlock {
            lines: lines.to_vec(),
        })
    }

    fn table(&mut self, headers: &[String], rows: &[Vec<String>]) -> Result<(), Self::Error> {
        self.send(DocumentEvent::Table {
            headers: headers.to_vec(),
            rows: rows.to_vec(),
        })
    }
}
