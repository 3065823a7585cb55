//! CLI binary for code2spec.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use code2spec::{
    convert, convert_source, render_explanation, ConversionConfig, ConversionOutput,
    ConversionProgressCallback, ConversionStats, ParseStats, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a single spinner that walks through the
/// pipeline stages (generate → render) with per-stage messages.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, source_bytes: usize) {
        self.bar.set_prefix("Generating");
        self.bar
            .set_message(format!("specification for {source_bytes} bytes of source"));
    }

    fn on_generation_retry(&self, attempt: u32, max_retries: u32, backoff_ms: u64) {
        self.bar.set_message(format!(
            "retry {attempt}/{max_retries} in {backoff_ms}ms"
        ));
    }

    fn on_generation_complete(&self, explanation_bytes: usize, output_tokens: u64) {
        self.bar.set_prefix("Rendering");
        self.bar.set_message(format!(
            "{explanation_bytes} bytes ({output_tokens} tokens)"
        ));
    }

    fn on_conversion_complete(&self, _total_duration_ms: u64) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion (HTML to stdout)
  code2spec src/report.abap

  # Write the document to a file
  code2spec src/report.abap -o report_spec.html

  # Read source from stdin
  cat src/report.abap | code2spec - -o report_spec.html

  # Language hint and custom title
  code2spec --language abap --title "SPEC — ZMM_REPORT" zmm_report.abap

  # Use a specific model
  code2spec --model gpt-4.1 --provider openai src/report.abap

  # Convert straight from a URL
  code2spec https://raw.githubusercontent.com/acme/app/main/src/billing.rs

  # Print the raw explanation text instead of the rendered document
  code2spec --raw src/report.abap

  # Re-render stored explanation text (no API key needed)
  code2spec --from-explanation explanation.txt -o spec.html

  # Structured JSON output with stats and warnings
  code2spec --json src/report.abap > result.json

SUPPORTED PROVIDERS & MODELS:
  Provider     Model                      Input $/1M  Output $/1M
  ─────────    ─────────────────────────  ──────────  ───────────
  openai       gpt-4.1-nano (default)     $0.10       $0.40
  openai       gpt-4.1-mini               $0.40       $1.60
  openai       gpt-4.1                    $2.00       $8.00
  anthropic    claude-sonnet-4-20250514   $3.00       $15.00
  gemini       gemini-2.0-flash           $0.10       $0.40
  ollama       llama3.2, qwen2.5-coder    free        free

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID

SETUP:
  1. Set API key:     export OPENAI_API_KEY=sk-...
  2. Convert:         code2spec src/report.abap -o spec.html
"#;

/// Generate technical-specification documents from source code using LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "code2spec",
    version,
    about = "Generate technical-specification documents from source code using LLMs",
    long_about = "Turn a source-code file (local path, URL, or stdin) into a styled \
technical-specification document. The explanation is drafted by an LLM \
(OpenAI, Anthropic, Gemini, Ollama, or any OpenAI-compatible endpoint) and \
rendered deterministically into HTML.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Source file path, HTTP/HTTPS URL, or '-' for stdin.
    input: String,

    /// Write the document to this file instead of stdout.
    #[arg(short, long, env = "CODE2SPEC_OUTPUT")]
    output: Option<PathBuf>,

    /// LLM model ID (e.g. gpt-4.1-nano, claude-sonnet-4-20250514).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama.
    #[arg(
        long,
        env = "EDGEQUAKE_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: openai, anthropic, gemini, azure, ollama, or any OpenAI-compatible URL."
    )]
    provider: Option<String>,

    /// Source-language hint passed to the model (e.g. abap, rust, plsql).
    #[arg(short, long, env = "CODE2SPEC_LANGUAGE")]
    language: Option<String>,

    /// Document title rendered at the top of the artifact.
    #[arg(long, env = "CODE2SPEC_TITLE", default_value = "TECHNICAL SPECIFICATION")]
    title: String,

    /// Max LLM output tokens.
    #[arg(long, env = "CODE2SPEC_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "CODE2SPEC_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Retries on LLM failure.
    #[arg(long, env = "CODE2SPEC_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "CODE2SPEC_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Print the raw explanation text instead of the rendered document.
    #[arg(long)]
    raw: bool,

    /// Treat the input as already-generated explanation text and render it
    /// directly. No LLM call, no API key needed.
    #[arg(long)]
    from_explanation: bool,

    /// Output structured JSON (document, explanation, stats) instead of HTML.
    #[arg(long, env = "CODE2SPEC_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "CODE2SPEC_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CODE2SPEC_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CODE2SPEC_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds for URL inputs.
    #[arg(long, env = "CODE2SPEC_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Per-LLM-call timeout in seconds.
    #[arg(long, env = "CODE2SPEC_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the spinner is active; the
    // spinner provides the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.from_explanation;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Explanation-only mode (no LLM) ───────────────────────────────────
    if cli.from_explanation {
        let explanation = read_text_input(&cli.input, cli.download_timeout)
            .await
            .context("Failed to read explanation text")?;
        let (document, blocks) = render_explanation(&explanation, &cli.title);

        let output = ConversionOutput {
            document,
            explanation,
            blocks,
            stats: ConversionStats::default(),
        };
        emit(&cli, &output)?;
        print_warnings(&cli, &output.blocks);
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb).await?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output = if cli.input == "-" {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read source from stdin")?;
        convert_source(&source, &config).await
    } else {
        convert(&cli.input, &config).await
    }
    .context("Conversion failed")?;

    emit(&cli, &output)?;
    print_warnings(&cli, &output.blocks);

    if !cli.quiet && !cli.json {
        eprintln!(
            "{} {} blocks  {}  {}ms total",
            green("✔"),
            bold(&output.blocks.blocks().to_string()),
            dim(&format!(
                "{} tokens in / {} tokens out",
                output.stats.input_tokens, output.stats.output_tokens
            )),
            output.stats.total_duration_ms,
        );
    }

    Ok(())
}

/// Write the selected representation to the output file or stdout.
fn emit(cli: &Cli, output: &ConversionOutput) -> Result<()> {
    let payload = if cli.json {
        let mut json =
            serde_json::to_string_pretty(output).context("Failed to serialise output")?;
        json.push('\n');
        json
    } else if cli.raw {
        let mut text = output.explanation.clone();
        if !text.ends_with('\n') {
            text.push('\n');
        }
        text
    } else {
        output.document.clone()
    };

    match cli.output {
        Some(ref path) => {
            atomic_write(path, &payload)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !cli.quiet {
                eprintln!("{} wrote {}", cyan("→"), bold(&path.display().to_string()));
            }
        }
        None => {
            io::stdout()
                .lock()
                .write_all(payload.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

/// Temp file + rename so a crash never leaves a half-written artifact.
fn atomic_write(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("html.tmp");
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)
}

fn print_warnings(cli: &Cli, blocks: &ParseStats) {
    if cli.quiet || cli.json {
        return;
    }
    for warning in &blocks.warnings {
        eprintln!("{} {}", yellow("⚠"), warning);
    }
}

/// Read input as plain text: stdin, URL, or local file.
async fn read_text_input(input: &str, download_timeout: u64) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    let resolved = code2spec::pipeline::input::resolve_input(input, download_timeout).await?;
    Ok(resolved.text)
}

/// Map CLI args to `ConversionConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let system_prompt = if let Some(ref path) = cli.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {:?}", path))?,
        )
    } else {
        None
    };

    let mut builder = ConversionConfig::builder()
        .title(cli.title.clone())
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .max_retries(cli.max_retries)
        .download_timeout_secs(cli.download_timeout)
        .api_timeout_secs(cli.api_timeout);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    let mut config = builder.build().context("Invalid configuration")?;

    // Apply optional fields the builder requires values for.
    config.model = cli.model.clone();
    config.provider_name = cli.provider.clone();
    config.language = cli.language.clone();
    config.system_prompt = system_prompt;

    Ok(config)
}
