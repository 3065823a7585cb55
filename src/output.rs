//! Output types returned by the `convert*` entry points.

use crate::pipeline::parser::ParseStats;
use serde::{Deserialize, Serialize};

/// The result of a full conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The rendered document artifact (HTML for the built-in sink).
    pub document: String,

    /// The raw markdown-like explanation text the LLM produced.
    ///
    /// Kept alongside the artifact so callers can re-render it into a
    /// different sink without paying for another generation.
    pub explanation: String,

    /// Block counts and non-fatal warnings from the render pass.
    pub blocks: ParseStats,

    /// Token usage and timing.
    pub stats: ConversionStats,
}

/// Token usage and per-stage timing for one conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Prompt tokens reported by the provider.
    pub input_tokens: u64,

    /// Completion tokens reported by the provider.
    pub output_tokens: u64,

    /// Retries spent before the generation succeeded.
    pub retries: u32,

    /// Wall-clock time of the LLM stage.
    pub generation_duration_ms: u64,

    /// Wall-clock time of the parse/render stage.
    pub render_duration_ms: u64,

    /// End-to-end wall-clock time, input resolution included.
    pub total_duration_ms: u64,
}
