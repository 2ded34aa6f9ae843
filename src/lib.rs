//! # edgequake-docsum
//!
//! Summarise pasted text, PDF files and web pages with an LLM.
//!
//! ## Why this crate?
//!
//! A summariser is only as good as the text it is given. Users hand over
//! whatever they have: a copied paragraph, a born-digital PDF, a scanned
//! letter, a link to an article or a link to a PDF. This crate resolves every
//! one of those to clean, length-bounded text through a fixed fallback chain,
//! then asks a chat model for a summary.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input (text | file | URL)
//!  │
//!  ├─ 1. Guard    upload ceiling (1 MiB), .pdf extension
//!  ├─ 2. Fetch    download URLs (timeout, redirects, size cap)
//!  ├─ 3. Extract  PDF text layer → OCR → UTF-8 → HTML, first hit wins
//!  ├─ 4. Bound    reject < 10 chars, truncate to 10,000
//!  ├─ 5. Model    one chat call with retry/backoff
//!  └─ 6. Output   {summary, source_type, original_length}
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_docsum::{DocumentSummarizer, InputSource, SummaryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from GEMINI_API_KEY / OPENAI_API_KEY / ...
//!     let summarizer = DocumentSummarizer::new(SummaryConfig::default())?;
//!     let source = InputSource::RemoteUrl("https://example.com/report.pdf".into());
//!     let output = summarizer.summarize(source, None).await?;
//!     println!("{} ({})", output.summary, output.source_type);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docsum` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-docsum = { version = "0.1", default-features = false }
//! ```
//!
//! ## Runtime requirements
//!
//! PDF handling needs a pdfium shared library (system path or
//! `PDFIUM_LIB_PATH`). OCR of scanned PDFs needs the `tesseract` executable
//! with the configured language packs. Neither is needed for text or HTML.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod resolve;
pub mod summarize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{SummaryConfig, SummaryConfigBuilder};
pub use error::{DocSumError, ExtractionFailure};
pub use output::{ExtractionResult, SourceType, SummaryOutput, SummaryRequest, SummaryResponse};
pub use pipeline::input::{check_upload_size, InputSource};
pub use resolve::{Collaborators, Resolver};
pub use summarize::{DocumentSummarizer, LlmSummarizer, Summarizer};
