//! CLI binary for edgequake-docsum.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `SummaryConfig` and prints the summary.

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use edgequake_docsum::{
    check_upload_size, DocumentSummarizer, ExtractionResult, InputSource, Resolver,
    SummaryConfig, SummaryOutput, SummaryResponse,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarise pasted text
  docsum --text "$(cat notes.txt)"

  # Summarise a PDF (text layer, or OCR for scans)
  docsum --file laporan.pdf

  # Summarise a web page or remote PDF
  docsum --url https://example.com/artikel

  # Summary in English with a shorter budget
  docsum --language English --max-tokens 256 --file paper.pdf

  # Show the text that would be summarised (no API key needed)
  docsum --extract-only --file scan.pdf

  # Boundary JSON: {summary, source_type, original_length} or {error}
  docsum --json --url https://example.com/report.pdf

LIMITS:
  Uploaded files must be .pdf and at most 1 MiB.
  Text shorter than 10 characters is rejected; text longer than 10,000
  characters is summarised from its first 10,000 characters.

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key (default model gemini-2.0-flash)
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (gemini, openai, anthropic, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to libpdfium, or the directory holding it

OCR:
  Scanned PDFs are read with the tesseract CLI. Install tesseract with the
  language packs named by --ocr-lang (default: eng, ind).
"#;

/// Summarise text, PDF files and web pages with an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "docsum",
    version,
    about = "Summarise text, PDF files and web pages with an LLM",
    long_about = "Resolve a document (pasted text, an uploaded PDF, or a URL) to clean text \
and summarise it. PDFs are read from their text layer, falling back to OCR for scans; URLs \
may point at a PDF, plain text or an HTML page.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP,
    group(ArgGroup::new("source").required(true).multiple(false).args(["text", "file", "url"]))
)]
struct Cli {
    /// Text to summarise.
    #[arg(long)]
    text: Option<String>,

    /// PDF file to summarise (max 1 MiB).
    #[arg(long)]
    file: Option<PathBuf>,

    /// HTTP/HTTPS URL of a PDF, text file or web page.
    #[arg(long)]
    url: Option<String>,

    /// Max LLM output tokens for the summary.
    #[arg(long, env = "DOCSUM_MAX_TOKENS", default_value_t = 512)]
    max_tokens: usize,

    /// Print the JSON response instead of plain text.
    #[arg(long, env = "DOCSUM_JSON")]
    json: bool,

    /// Print the resolved text and its source type; no LLM call.
    #[arg(long)]
    extract_only: bool,

    /// LLM model ID (e.g. gemini-2.0-flash, gpt-4.1-nano).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: gemini, openai, anthropic, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// Language the summary is written in.
    #[arg(long, env = "DOCSUM_LANGUAGE", default_value = "Indonesian")]
    language: String,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "DOCSUM_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// OCR language (repeatable): eng, ind, ...
    #[arg(long = "ocr-lang", env = "DOCSUM_OCR_LANG", value_delimiter = ',',
          default_values_t = vec!["eng".to_string(), "ind".to_string()])]
    ocr_lang: Vec<String>,

    /// tesseract executable.
    #[arg(long, env = "DOCSUM_TESSERACT", default_value = "tesseract")]
    tesseract: String,

    /// Most pages of a scanned PDF to OCR.
    #[arg(long, env = "DOCSUM_MAX_OCR_PAGES", default_value_t = 50)]
    max_ocr_pages: usize,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "DOCSUM_DOWNLOAD_TIMEOUT", default_value_t = 30)]
    download_timeout: u64,

    /// Overall deadline for one document, in seconds.
    #[arg(long, env = "DOCSUM_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCSUM_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCSUM_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives enough feedback; library INFO logs would tear it.
    let show_spinner = !cli.quiet && !cli.json && !cli.verbose;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_spinner {
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

    let config = build_config(&cli).await?;
    let source = match read_source(&cli, &config).await {
        Ok(source) => source,
        Err(e) if cli.json => {
            print_json(&SummaryResponse::Failure {
                error: format!("{e:#}"),
            })?;
            std::process::exit(1);
        }
        Err(e) => return Err(e),
    };

    let progress = show_spinner.then(|| spinner(source_label(&source)));

    // ── Extract-only mode ────────────────────────────────────────────────
    if cli.extract_only {
        let resolver = Resolver::new(&config).context("Failed to build resolver")?;
        let result = resolver
            .resolve_within(source, config.request_timeout_secs)
            .await;
        if let Some(bar) = progress {
            bar.finish_and_clear();
        }
        let extraction = result.context("Failed to extract text")?;
        print_extraction(&cli, &extraction)?;
        return Ok(());
    }

    // ── Summarise ────────────────────────────────────────────────────────
    let summarizer = DocumentSummarizer::new(config).context("Failed to initialise summariser")?;
    let result = summarizer.summarize(source, Some(cli.max_tokens)).await;
    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    if cli.json {
        let failed = result.is_err();
        print_json(&SummaryResponse::from(result))?;
        if failed {
            std::process::exit(1);
        }
        return Ok(());
    }

    match result {
        Ok(output) => {
            println!("{}", output.summary);
            if !cli.quiet {
                print_footer(&output);
            }
            Ok(())
        }
        Err(e) => {
            if !cli.quiet {
                eprintln!("{} {}", red("✘"), e);
            }
            Err(e).context("Failed to summarise document")
        }
    }
}

/// Build a [`SummaryConfig`] from parsed CLI arguments.
async fn build_config(cli: &Cli) -> Result<SummaryConfig> {
    let mut builder = SummaryConfig::builder()
        .max_output_tokens(cli.max_tokens)
        .summary_language(cli.language.clone())
        .ocr_languages(cli.ocr_lang.iter().cloned())
        .tesseract_cmd(cli.tesseract.clone())
        .max_ocr_pages(cli.max_ocr_pages)
        .download_timeout_secs(cli.download_timeout)
        .request_timeout_secs(cli.timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref path) = cli.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {}", path.display()))?;
        builder = builder.system_prompt(prompt);
    }

    builder.build().context("Invalid configuration")
}

/// Turn the chosen flag into an [`InputSource`].
///
/// For files the size ceiling is checked against metadata first, so an
/// oversized file is never read into memory.
async fn read_source(cli: &Cli, config: &SummaryConfig) -> Result<InputSource> {
    if let Some(ref path) = cli.file {
        let meta = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("Cannot open {}", path.display()))?;
        check_upload_size(meta.len(), config.max_upload_bytes)?;
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return Ok(InputSource::UploadedFile {
            bytes,
            filename: file_name(path),
        });
    }

    let source = InputSource::from_fields(cli.text.clone(), None, cli.url.clone())?;
    Ok(source)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn source_label(source: &InputSource) -> String {
    match source {
        InputSource::RawText(_) => "Reading text…".to_string(),
        InputSource::UploadedFile { filename, .. } => format!("Reading {filename}…"),
        InputSource::RemoteUrl(url) => format!("Fetching {url}…"),
    }
}

fn spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Summarising");
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize response")?
    );
    Ok(())
}

fn print_extraction(cli: &Cli, extraction: &ExtractionResult) -> Result<()> {
    if cli.json {
        return print_json(extraction);
    }

    println!("{}", extraction.text);
    if !cli.quiet {
        let mut facts = vec![format!("{} chars", extraction.original_chars)];
        if let Some(pages) = extraction.page_count {
            facts.push(format!("{pages} pages"));
        }
        if extraction.truncated {
            facts.push(format!("truncated to {}", extraction.text.chars().count()));
        }
        eprintln!(
            "{} {}  {}",
            green("✔"),
            bold(&extraction.source_type.to_string()),
            dim(&facts.join(" · "))
        );
    }
    Ok(())
}

fn print_footer(output: &SummaryOutput) {
    let mut facts = vec![format!("{} chars", output.original_length)];
    if let Some(pages) = output.page_count {
        facts.push(format!("{pages} pages"));
    }
    if output.truncated {
        facts.push("truncated".to_string());
    }
    eprintln!(
        "{} {}  {}",
        green("✔"),
        bold(&output.source_type.to_string()),
        dim(&facts.join(" · "))
    );
}
