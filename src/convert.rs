//! Eager (full-document) conversion entry points.
//!
//! ## Why eager vs. streaming?
//!
//! This module provides the simpler API: generate the whole explanation,
//! render it, return the finished artifact. Use
//! [`crate::stream::convert_stream`] instead when you want block events
//! progressively (terminal preview, incremental writers).

use crate::config::ConversionConfig;
use crate::error::Code2SpecError;
use crate::html::HtmlSink;
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::parser::{self, ParseStats};
use crate::pipeline::{generate, input};
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Convert a source file or URL into a technical-specification document.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input_str` — Local file path or HTTP/HTTPS URL to a source snippet
/// * `config` — Conversion configuration
///
/// # Errors
/// Returns `Err(Code2SpecError)` for fatal errors only: unreadable input,
/// unconfigured provider, generation retries exhausted, …. Malformed
/// structures in the generated text never fail the conversion; they appear
/// as warnings in `output.blocks.warnings`.
pub async fn convert(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Code2SpecError> {
    let input_str = input_str.as_ref();
    info!("starting conversion: {}", input_str);
    let source = input::resolve_input(input_str, config.download_timeout_secs).await?;
    run(source, config).await
}

/// Convert an in-memory source snippet.
///
/// The recommended API when the code comes from stdin, a request body, or
/// an editor buffer rather than a file on disk.
pub async fn convert_source(
    code: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Code2SpecError> {
    let source = input::resolve_inline(code.as_ref())?;
    run(source, config).await
}

/// Convert and write the document artifact directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Code2SpecError> {
    let output = convert(input_str, config).await?;
    let path = output_path.as_ref();

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Code2SpecError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension("html.tmp");
    tokio::fs::write(&tmp_path, &output.document)
        .await
        .map_err(|e| Code2SpecError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Code2SpecError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(output.stats)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Code2SpecError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Code2SpecError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(convert(input_str, config))
}

/// Render existing explanation text into the built-in HTML sink.
///
/// No LLM provider, no API key, no async runtime — just the core
/// transform. Useful for re-rendering a stored explanation or for testing
/// prompt output by hand.
pub fn render_explanation(explanation: &str, title: &str) -> (String, ParseStats) {
    let sink = HtmlSink::with_title(title);
    let (sink, stats) = match parser::build_document(explanation, sink) {
        Ok(v) => v,
        Err(never) => match never {},
    };
    (sink.finish(), stats)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// The shared pipeline behind every `convert*` entry point.
async fn run(
    source: input::ResolvedSource,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Code2SpecError> {
    let total_start = Instant::now();

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(source.text.len());
    }

    // ── Generate ─────────────────────────────────────────────────────────
    let provider = resolve_provider(config)?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_start();
    }
    let generation = generate::generate_explanation(&provider, &source.text, config).await?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_complete(generation.explanation.len(), generation.output_tokens);
    }

    // ── Render ───────────────────────────────────────────────────────────
    let render_start = Instant::now();
    let sink = HtmlSink::with_title(&config.title);
    let (sink, blocks) = match parser::build_document(&generation.explanation, sink) {
        Ok(v) => v,
        Err(never) => match never {},
    };
    let document = sink.finish();
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    if !blocks.warnings.is_empty() {
        warn!(
            "{} degradation(s) recorded while rendering — see output.blocks.warnings",
            blocks.warnings.len()
        );
    }
    if let Some(ref cb) = config.progress_callback {
        cb.on_render_complete(blocks.blocks(), blocks.warnings.len());
    }

    let stats = ConversionStats {
        input_tokens: generation.input_tokens,
        output_tokens: generation.output_tokens,
        retries: generation.retries,
        generation_duration_ms: generation.duration_ms,
        render_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "conversion complete: {} blocks, {} tokens out, {}ms total",
        blocks.blocks(),
        stats.output_tokens,
        stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(stats.total_duration_ms);
    }

    Ok(ConversionOutput {
        document,
        explanation: generation.explanation,
        blocks,
        stats,
    })
}

/// Instantiate a named provider with the given model.
fn create_text_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, Code2SpecError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        Code2SpecError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// The four-level fallback chain lets library users and CLI users each set
/// exactly as much or as little as they need:
///
/// 1. **Pre-built provider** (`config.provider`) — the caller constructed
///    and configured the provider entirely; we use it as-is. Useful in
///    tests or when the caller needs custom middleware.
///
/// 2. **Named provider + model** (`config.provider_name`) — reads the
///    corresponding API key (`OPENAI_API_KEY`, etc.) from the environment.
///
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`) —
///    a provider and model chosen at the execution-environment level
///    (Makefile, shell script, CI). Checked before full auto-detection so
///    the model choice is honoured even when multiple API keys are present.
///
/// 4. **Full auto-detection** (`ProviderFactory::from_env`) — scans all
///    known API key variables and picks the first available provider.
pub(crate) fn resolve_provider(
    config: &ConversionConfig,
) -> Result<Arc<dyn LLMProvider>, Code2SpecError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or("gpt-4.1-nano");
        return create_text_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_text_provider(&prov, &model);
        }
    }

    // Prefer OpenAI explicitly when an OpenAI API key is present, so users
    // with multiple provider keys get a deterministic default.
    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or("gpt-4.1-nano");
            return create_text_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| Code2SpecError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {e}"
            ),
        })?;

    Ok(llm_provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_explanation_produces_styled_html() {
        let (html, stats) = render_explanation(
            "1. Purpose:\nThe report prints **totals**.\n```\nWRITE total.\n```",
            "SPEC — ZDEMO",
        );
        assert!(html.contains("<h1>SPEC — ZDEMO</h1>"));
        assert!(html.contains("<h2>1. Purpose:</h2>"));
        assert!(html.contains("<strong>totals</strong>"));
        assert!(html.contains("<pre><code>WRITE total.</code></pre>"));
        assert_eq!(stats.blocks(), 3);
    }

    #[test]
    fn render_explanation_reports_warnings() {
        let (_, stats) = render_explanation("|lonely|row|", "T");
        assert_eq!(stats.warnings.len(), 1);
        assert_eq!(stats.tables, 0);
    }
}
