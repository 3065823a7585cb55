//! # code2spec
//!
//! Generate technical-specification documents from source code using LLMs.
//!
//! ## Why this crate?
//!
//! Teams that maintain legacy code (ABAP, PL/SQL, COBOL, aging services in
//! any language) routinely need written specifications for audits,
//! migrations, and handovers. An LLM writes a decent first draft — but as
//! free-form markdown-ish text, not a document anyone signs off on. This
//! crate asks the model for a *structured* explanation (numbered sections,
//! sub-sections, code fences, pipe tables, bold terms) and then renders that
//! dialect deterministically into a styled document through a pluggable
//! sink, degrading gracefully wherever the model strays from the format.
//!
//! ## Pipeline Overview
//!
//! ```text
//! source code
//!  │
//!  ├─ 1. Input     resolve local file, URL, or raw snippet
//!  ├─ 2. Generate  LLM call with retry/backoff (openai / anthropic / …)
//!  ├─ 3. Parse     line classifier + block state machine
//!  └─ 4. Sink      renderHeading / renderParagraph / … → HTML artifact
//! ```
//!
//! Stages 3–4 are pure and synchronous: the same explanation text always
//! produces the same sequence of sink calls, and anything that is not an
//! LLM call runs without an API key (see
//! [`render_explanation`](crate::convert::render_explanation)).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use code2spec::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let config = ConversionConfig::default();
//!     let output = convert("src/billing.abap", &config).await?;
//!     std::fs::write("billing_spec.html", &output.document)?;
//!     eprintln!("tokens: {} in / {} out",
//!         output.stats.input_tokens,
//!         output.stats.output_tokens);
//!     Ok(())
//! }
//! ```
//!
//! ## Bring your own sink
//!
//! The parser talks to a [`DocumentSink`](crate::sink::DocumentSink) trait,
//! not to HTML. Implement the five render methods to target docx, PDF, a
//! terminal, or anything else:
//!
//! ```rust
//! use code2spec::{build_document, RecordingSink};
//!
//! let (sink, stats) = build_document("1. Purpose:\nPrints **totals**.",
//!     RecordingSink::new()).unwrap();
//! assert_eq!(stats.headings, 1);
//! assert_eq!(sink.events.len(), 2);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `code2spec` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! code2spec = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod html;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod sink;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_source, convert_sync, convert_to_file, render_explanation};
pub use error::{Code2SpecError, ParseWarning};
pub use html::HtmlSink;
pub use output::{ConversionOutput, ConversionStats};
pub use pipeline::inline::bold_spans;
pub use pipeline::parser::{build_document, DocumentBuilder, ParseStats};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use sink::{DocumentEvent, DocumentSink, RecordingSink, Span};
pub use stream::{convert_stream, render_stream, BlockStream};
