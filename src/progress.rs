//! Progress-callback trait for conversion stage events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline moves through its stages.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a terminal spinner, a WebSocket, or a log record without
//! the library knowing how the host application communicates. The trait is
//! `Send + Sync` and all methods have no-op defaults, so callers only
//! override what they care about.

use std::sync::Arc;

/// Called by the conversion pipeline as it moves through its stages.
///
/// A conversion is one generation call followed by one render pass, so the
/// events are stage-level rather than per-item: start, generation
/// start/retry/complete, render complete, conversion complete.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after the source snippet has been resolved.
    ///
    /// # Arguments
    /// * `source_bytes` — size of the resolved source text
    fn on_conversion_start(&self, source_bytes: usize) {
        let _ = source_bytes;
    }

    /// Called just before the first LLM request is sent.
    fn on_generation_start(&self) {}

    /// Called before each retry of a failed LLM request.
    ///
    /// # Arguments
    /// * `attempt`     — 1-indexed retry number
    /// * `max_retries` — configured retry budget
    /// * `backoff_ms`  — delay being applied before this retry
    fn on_generation_retry(&self, attempt: u32, max_retries: u32, backoff_ms: u64) {
        let _ = (attempt, max_retries, backoff_ms);
    }

    /// Called when the explanation text has been generated.
    ///
    /// # Arguments
    /// * `explanation_bytes` — size of the generated text
    /// * `output_tokens`     — completion tokens reported by the provider
    fn on_generation_complete(&self, explanation_bytes: usize, output_tokens: u64) {
        let _ = (explanation_bytes, output_tokens);
    }

    /// Called when the explanation has been rendered into the sink.
    ///
    /// # Arguments
    /// * `blocks`   — number of render calls issued
    /// * `warnings` — number of non-fatal degradations recorded
    fn on_render_complete(&self, blocks: usize, warnings: usize) {
        let _ = (blocks, warnings);
    }

    /// Called once when the conversion has finished.
    fn on_conversion_complete(&self, total_duration_ms: u64) {
        let _ = total_duration_ms;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
