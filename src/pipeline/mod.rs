//! Pipeline stages for source-to-specification conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different artifact sink) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ generate ──▶ parse ──▶ sink
//! (path/URL)  (LLM)    (blocks)   (HTML/custom)
//! ```
//!
//! 1. [`input`]    — canonicalise the user-supplied path, URL, or raw snippet
//! 2. [`generate`] — drive the LLM call with retry/backoff; the only stage
//!    with network I/O
//! 3. [`inline`]   — split paragraph text into plain/bold spans
//! 4. [`parser`]   — classify lines, buffer multi-line blocks, flush render
//!    calls into the caller's [`crate::sink::DocumentSink`]

pub mod generate;
pub mod inline;
pub mod input;
pub mod parser;
