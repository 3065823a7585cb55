//! Input resolution: normalise a user-supplied path or URL to source text.
//!
//! The pipeline downstream wants one thing: a non-empty UTF-8 snippet.
//! Everything that can go wrong at the boundary — missing file, unreadable
//! file, a binary handed in by mistake, a dead URL — is caught here and
//! mapped to a specific [`Code2SpecError`] so the caller gets a precise
//! message instead of a provider error three stages later.

use crate::error::Code2SpecError;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Sources larger than this almost certainly exceed the model context once
/// wrapped in the prompt; resolution still proceeds, but with a warning.
const LARGE_SOURCE_BYTES: usize = 256 * 1024;

/// Where the source text came from.
#[derive(Debug, Clone)]
pub enum SourceOrigin {
    /// A local file.
    Local(PathBuf),
    /// Downloaded from a URL.
    Remote(String),
    /// Handed in directly (stdin, API caller).
    Inline,
}

impl SourceOrigin {
    /// Short human-readable label for error messages and logs.
    pub fn label(&self) -> String {
        match self {
            SourceOrigin::Local(p) => p.display().to_string(),
            SourceOrigin::Remote(url) => url.clone(),
            SourceOrigin::Inline => "inline source".to_string(),
        }
    }
}

/// The resolved source snippet.
#[derive(Debug, Clone)]
pub struct ResolvedSource {
    pub text: String,
    pub origin: SourceOrigin,
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to source text.
///
/// If the input is a URL, download it. Otherwise treat it as a local file
/// path, validating existence, readability, and UTF-8.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedSource, Code2SpecError> {
    let resolved = if is_url(input) {
        download_url(input, timeout_secs).await?
    } else {
        resolve_local(input)?
    };
    validate(resolved)
}

/// Wrap an in-memory snippet, applying the same validation as file inputs.
pub fn resolve_inline(text: impl Into<String>) -> Result<ResolvedSource, Code2SpecError> {
    validate(ResolvedSource {
        text: text.into(),
        origin: SourceOrigin::Inline,
    })
}

fn validate(source: ResolvedSource) -> Result<ResolvedSource, Code2SpecError> {
    if source.text.trim().is_empty() {
        return Err(Code2SpecError::EmptySource {
            origin: source.origin.label(),
        });
    }
    if source.text.len() > LARGE_SOURCE_BYTES {
        warn!(
            bytes = source.text.len(),
            origin = %source.origin.label(),
            "source is unusually large; the explanation may be truncated"
        );
    }
    Ok(source)
}

fn resolve_local(path_str: &str) -> Result<ResolvedSource, Code2SpecError> {
    let path = PathBuf::from(path_str);

    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Code2SpecError::SourceNotFound { path });
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Code2SpecError::PermissionDenied { path });
        }
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            return Err(Code2SpecError::NotText { path });
        }
        Err(e) => {
            return Err(Code2SpecError::Internal(format!(
                "reading '{}': {e}",
                path.display()
            )));
        }
    };

    debug!("resolved local source: {} ({} bytes)", path.display(), text.len());
    Ok(ResolvedSource {
        text,
        origin: SourceOrigin::Local(path),
    })
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedSource, Code2SpecError> {
    info!("downloading source from: {url}");

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Code2SpecError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            Code2SpecError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            Code2SpecError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(Code2SpecError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let text = response
        .text()
        .await
        .map_err(|e| Code2SpecError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("downloaded {} bytes", text.len());
    Ok(ResolvedSource {
        text,
        origin: SourceOrigin::Remote(url.to_string()),
    })
}
