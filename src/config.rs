//! Configuration types for code-to-specification conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across threads, log them, and diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A dozen-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! documented defaults for the rest.

use crate::error::Code2SpecError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Configuration for one source-to-specification conversion.
///
/// Built via [`ConversionConfig::builder()`] or
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use code2spec::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .model("gpt-4.1-nano")
///     .language("abap")
///     .title("TECHNICAL SPECIFICATION — ZMM_REPORT")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// LLM model identifier, e.g. "gpt-4.1-nano", "claude-sonnet-4-20250514".
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, auto-detected from the environment.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for the explanation. Default: 0.2.
    ///
    /// Low temperature keeps the model faithful to the submitted code and,
    /// just as important, to the numbered-section dialect the renderer
    /// consumes. Higher values produce freer prose that still renders, but
    /// with more of it falling through to plain paragraphs.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate. Default: 4096.
    ///
    /// A full specification for a few hundred lines of source lands around
    /// 1 500–3 000 output tokens. Setting this too low truncates the
    /// explanation mid-sentence — typically visible as a dangling table or
    /// code fence in the warnings list.
    pub max_tokens: usize,

    /// Maximum retry attempts on a transient LLM failure. Default: 3.
    ///
    /// Most 5xx and timeout errors are transient. Permanent errors (bad API
    /// key, 400) keep failing and surface as
    /// [`Code2SpecError::GenerationFailed`] once the budget is spent.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    ///
    /// Doubles after each attempt: 500 ms → 1 s → 2 s.
    pub retry_backoff_ms: u64,

    /// Custom system prompt. If None, uses the built-in default
    /// ([`crate::prompts::DEFAULT_SYSTEM_PROMPT`]).
    pub system_prompt: Option<String>,

    /// Source-language hint passed to the model (e.g. "abap", "rust").
    /// If None, the model infers the language itself.
    pub language: Option<String>,

    /// Document title rendered at the top of the artifact.
    /// Default: "TECHNICAL SPECIFICATION".
    pub title: String,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Per-LLM-call timeout in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Optional stage-level progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.2,
            max_tokens: 4096,
            max_retries: 3,
            retry_backoff_ms: 500,
            system_prompt: None,
            language: None,
            title: "TECHNICAL SPECIFICATION".to_string(),
            download_timeout_secs: 120,
            api_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("language", &self.language)
            .field("title", &self.title)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = Some(lang.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Code2SpecError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(Code2SpecError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.title.trim().is_empty() {
            return Err(Code2SpecError::InvalidConfig(
                "title must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let config = ConversionConfig::builder().build().unwrap();
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.title, "TECHNICAL SPECIFICATION");
    }

    #[test]
    fn temperature_is_clamped() {
        let config = ConversionConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(config.temperature, 2.0);
    }

    #[test]
    fn zero_max_tokens_is_rejected() {
        let result = ConversionConfig::builder().max_tokens(0).build();
        assert!(matches!(result, Err(Code2SpecError::InvalidConfig(_))));
    }

    #[test]
    fn empty_title_is_rejected() {
        let result = ConversionConfig::builder().title("  ").build();
        assert!(matches!(result, Err(Code2SpecError::InvalidConfig(_))));
    }

    #[test]
    fn debug_does_not_dump_the_provider() {
        let config = ConversionConfig::default();
        let s = format!("{config:?}");
        assert!(s.contains("max_retries"));
    }
}
