//! LLM interaction: build the chat request and call the provider.
//!
//! This module turns a source snippet into an explanation-text request and
//! returns the raw markdown-like response. It is intentionally thin — all
//! prompt engineering lives in [`crate::prompts`] so it can be changed
//! without touching retry or error-handling logic here.
//!
//! ## Retry Strategy
//!
//! HTTP 429 / 503 errors from LLM APIs are transient. Exponential backoff
//! (`retry_backoff_ms * 2^attempt`) keeps retries polite: with 500 ms base
//! and 3 retries the wait sequence is 500 ms → 1 s → 2 s. Each attempt also
//! runs under the configured per-call timeout; a timed-out attempt is
//! retried like any other transient failure.

use crate::config::ConversionConfig;
use crate::error::Code2SpecError;
use crate::prompts::{user_prompt, DEFAULT_SYSTEM_PROMPT};
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// The generated explanation plus the accounting that went into it.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Raw markdown-like explanation text.
    pub explanation: String,
    /// Prompt tokens reported by the provider.
    pub input_tokens: u64,
    /// Completion tokens reported by the provider.
    pub output_tokens: u64,
    /// Wall-clock time including retries.
    pub duration_ms: u64,
    /// Retries spent before success.
    pub retries: u32,
}

/// Generate the specification explanation for a source snippet.
///
/// ## Message Layout
///
/// 1. **System message** — the 5-rule dialect prompt (or user-supplied
///    override from the config)
/// 2. **User message** — the fenced source snippet, with an optional
///    language tag
///
/// Returns a fatal error only after the retry budget is exhausted; partial
/// failures along the way are logged and retried.
pub async fn generate_explanation(
    provider: &Arc<dyn LLMProvider>,
    source: &str,
    config: &ConversionConfig,
) -> Result<Generation, Code2SpecError> {
    let start = Instant::now();
    let system_prompt = config
        .system_prompt
        .as_deref()
        .unwrap_or(DEFAULT_SYSTEM_PROMPT);

    let messages = vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user(user_prompt(source, config.language.as_deref())),
    ];

    let options = build_options(config);
    let call_timeout = Duration::from_secs(config.api_timeout_secs);

    let mut last_err: Option<String> = None;
    let mut all_timeouts = true;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = config.retry_backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "generation retry {}/{} after {}ms",
                attempt, config.max_retries, backoff
            );
            if let Some(ref cb) = config.progress_callback {
                cb.on_generation_retry(attempt, config.max_retries, backoff);
            }
            sleep(Duration::from_millis(backoff)).await;
        }

        match timeout(call_timeout, provider.chat(&messages, Some(&options))).await {
            Ok(Ok(response)) => {
                if response.content.trim().is_empty() {
                    warn!("attempt {}: provider returned an empty response", attempt + 1);
                    all_timeouts = false;
                    last_err = Some("provider returned an empty response".to_string());
                    continue;
                }

                let duration = start.elapsed();
                debug!(
                    "generated {} bytes, {} input / {} output tokens, {:?}",
                    response.content.len(),
                    response.prompt_tokens,
                    response.completion_tokens,
                    duration
                );

                return Ok(Generation {
                    explanation: response.content,
                    input_tokens: response.prompt_tokens as u64,
                    output_tokens: response.completion_tokens as u64,
                    duration_ms: duration.as_millis() as u64,
                    retries: attempt,
                });
            }
            Ok(Err(e)) => {
                let err_msg = format!("{e}");
                warn!("attempt {} failed — {}", attempt + 1, err_msg);
                all_timeouts = false;
                last_err = Some(err_msg);
            }
            Err(_elapsed) => {
                warn!(
                    "attempt {} timed out after {}s",
                    attempt + 1,
                    config.api_timeout_secs
                );
                last_err = Some(format!("timed out after {}s", config.api_timeout_secs));
            }
        }
    }

    // All retries exhausted.
    if all_timeouts {
        return Err(Code2SpecError::ApiTimeout {
            secs: config.api_timeout_secs,
        });
    }
    Err(Code2SpecError::GenerationFailed {
        retries: config.max_retries,
        detail: last_err.unwrap_or_else(|| "unknown error".to_string()),
    })
}

/// Build `CompletionOptions` from the conversion config.
fn build_options(config: &ConversionConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_options_defaults() {
        let config = ConversionConfig::default();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(0.2));
        assert_eq!(opts.max_tokens, Some(4096));
    }
}
