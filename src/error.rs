//! Error types for the code2spec library.
//!
//! Two distinct types reflect two distinct failure modes:
//!
//! * [`Code2SpecError`] — **Fatal**: the conversion cannot proceed at all
//!   (missing source file, provider not configured, generation exhausted its
//!   retries). Returned as `Err(Code2SpecError)` from the top-level
//!   `convert*` functions.
//!
//! * [`ParseWarning`] — **Non-fatal**: the explanation text contained a
//!   structure the renderer degrades on rather than fails on (a one-row
//!   table, an unclosed code fence, a dangling bold marker). Collected in
//!   [`crate::pipeline::parser::ParseStats`] so callers can inspect what was
//!   skipped; the rendered document is still produced.
//!
//! The parser itself never raises for malformed input. Sink failures use the
//! sink's own associated error type and pass through the builder unchanged.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the code2spec library.
///
/// Render-level degradations use [`ParseWarning`] and are reported in the
/// conversion output rather than propagated here.
#[derive(Debug, Error)]
pub enum Code2SpecError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Source file was not found at the given path.
    #[error("source file not found: '{path}'\nCheck the path exists and is readable.")]
    SourceNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The file exists but is not valid UTF-8 text.
    #[error("'{path}' is not UTF-8 text — code2spec takes source code, not binaries")]
    NotText { path: PathBuf },

    /// The resolved source snippet was empty.
    #[error("source from '{origin}' is empty — nothing to explain")]
    EmptySource { origin: String },

    /// HTTP URL was syntactically valid but the download failed.
    #[error("failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Explanation generation failed after all retries.
    #[error("explanation generation failed after {retries} retries: {detail}")]
    GenerationFailed { retries: u32, detail: String },

    /// Every generation attempt exceeded the per-call timeout.
    ///
    /// Individual timeouts are retried like any other transient failure;
    /// this surfaces only when the retry budget is spent on timeouts alone.
    #[error("LLM call timed out after {secs}s")]
    ApiTimeout { secs: u64 },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output document file.
    #[error("failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// A non-fatal degradation encountered while rendering the explanation.
///
/// None of these abort the conversion; each names the structure that was
/// skipped or rewritten so callers (and the `--json` CLI output) can see
/// what best-effort rendering left out.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// A table flush found fewer than 2 buffered rows; nothing was rendered.
    #[error("table with {rows} row(s) skipped — a header and separator row are required")]
    MalformedTable { rows: usize },

    /// Input ended inside an open code fence; the buffered lines were dropped.
    #[error("unterminated code fence — {lines} buffered line(s) dropped")]
    UnterminatedCodeBlock { lines: usize },

    /// A `**` marker had no closing pair and was rendered as literal text.
    #[error("unterminated bold marker rendered as literal text")]
    UnterminatedBold,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_failed_display() {
        let e = Code2SpecError::GenerationFailed {
            retries: 3,
            detail: "HTTP 429".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("3 retries"), "got: {msg}");
        assert!(msg.contains("HTTP 429"));
    }

    #[test]
    fn empty_source_display_names_origin() {
        let e = Code2SpecError::EmptySource {
            origin: "stdin".into(),
        };
        assert!(e.to_string().contains("stdin"));
    }

    #[test]
    fn parse_warning_serialises_with_kind_tag() {
        let w = ParseWarning::MalformedTable { rows: 1 };
        let json = serde_json::to_string(&w).unwrap();
        assert!(json.contains("\"kind\":\"malformed_table\""), "got: {json}");
    }

    #[test]
    fn parse_warning_display() {
        let w = ParseWarning::UnterminatedCodeBlock { lines: 4 };
        assert!(w.to_string().contains("4 buffered line(s)"));
    }
}
