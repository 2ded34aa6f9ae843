//! Error types for the edgequake-docsum library.
//!
//! Two layers reflect two distinct failure modes:
//!
//! * [`ExtractionFailure`]: the document could not be turned into usable
//!   text (wrong file type, nothing readable, download failed). Returned by
//!   [`crate::resolve::Resolver::resolve`]. Every variant carries a
//!   human-readable detail only; raw document bytes never end up in an error.
//!
//! * [`DocSumError`]: the whole request failed, either because resolution
//!   failed or because the summarisation collaborator did. Returned by
//!   [`crate::summarize::DocumentSummarizer`].
//!
//! Collaborator faults ([`PdfFault`], [`RenderFault`], [`OcrFault`]) stay
//! inside the extractors; the Resolver only ever sees "this strategy found
//! nothing" or one of the [`ExtractionFailure`] variants.

use thiserror::Error;

/// Why a document could not be resolved to text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionFailure {
    /// No text, file or URL was supplied.
    #[error("No input supplied: provide text, a PDF file or a URL")]
    NotFound,

    /// A direct upload was not a `.pdf` file.
    #[error("Unsupported file '{filename}': only PDF files are supported")]
    UnsupportedFormat { filename: String },

    /// No strategy recovered enough text to summarise.
    #[error("Text is too short or could not be read ({chars} characters, need at least {min})")]
    EmptyContent { chars: usize, min: usize },

    /// The URL could not be fetched.
    #[error("Failed to download '{url}': {detail}")]
    DownloadError { url: String, detail: String },

    /// The bytes were fetched or uploaded but nothing could decode them.
    #[error("Could not decode document: {detail}")]
    DecodeError { detail: String },
}

/// All fatal errors returned by the summarisation facade.
#[derive(Debug, Error)]
pub enum DocSumError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input resolution failed.
    #[error(transparent)]
    Extraction(#[from] ExtractionFailure),

    /// The upload exceeds the configured ceiling; rejected before extraction.
    #[error("Upload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: u64, limit: u64 },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The model answered with blank output.
    #[error("Failed to produce summary: the model returned an empty response")]
    SummarizationFailure,

    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM API kept failing after all retries.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// Resolve + summarise did not finish within the request deadline.
    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocSumError {
    /// True for errors caused by the request itself rather than by the
    /// service or its collaborators.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DocSumError::Extraction(_) | DocSumError::PayloadTooLarge { .. }
        )
    }
}

/// Structural PDF extraction fault.
#[derive(Debug, Clone, Error)]
pub enum PdfFault {
    /// Buffer does not start with `%PDF-`.
    #[error("missing %PDF- signature (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    /// pdfium could not open the document.
    #[error("PDF could not be parsed: {0}")]
    Unreadable(String),

    /// The pdfium library could not be bound.
    #[error("PDF engine unavailable: {0}")]
    BackendUnavailable(String),
}

/// Page rasterisation fault.
#[derive(Debug, Clone, Error)]
pub enum RenderFault {
    #[error("PDF could not be opened for rendering: {0}")]
    Load(String),

    #[error("Rasterisation failed for page {page}: {detail}")]
    Page { page: usize, detail: String },

    #[error("PDF engine unavailable: {0}")]
    BackendUnavailable(String),
}

/// OCR engine fault.
#[derive(Debug, Clone, Error)]
pub enum OcrFault {
    #[error("OCR engine '{cmd}' could not be started: {detail}")]
    Spawn { cmd: String, detail: String },

    #[error("OCR engine exited with status {status:?}: {stderr}")]
    Failed { status: Option<i32>, stderr: String },

    #[error("Image encoding failed: {0}")]
    Encode(String),

    #[error("OCR I/O error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_display() {
        let e = ExtractionFailure::EmptyContent { chars: 5, min: 10 };
        let msg = e.to_string();
        assert!(msg.contains("5 characters"), "got: {msg}");
        assert!(msg.contains("at least 10"), "got: {msg}");
    }

    #[test]
    fn unsupported_format_names_file() {
        let e = ExtractionFailure::UnsupportedFormat {
            filename: "report.txt".into(),
        };
        assert!(e.to_string().contains("report.txt"));
    }

    #[test]
    fn extraction_failure_is_transparent() {
        let e: DocSumError = ExtractionFailure::DownloadError {
            url: "https://example.org/a.pdf".into(),
            detail: "HTTP 404 Not Found".into(),
        }
        .into();
        assert!(e.to_string().starts_with("Failed to download"));
        assert!(e.is_client_error());
    }

    #[test]
    fn payload_too_large_display() {
        let e = DocSumError::PayloadTooLarge {
            size: 2_000_000,
            limit: 1_048_576,
        };
        assert!(e.to_string().contains("1048576"));
        assert!(e.is_client_error());
    }

    #[test]
    fn summarization_failure_is_not_client_error() {
        assert!(!DocSumError::SummarizationFailure.is_client_error());
        assert!(DocSumError::SummarizationFailure
            .to_string()
            .contains("Failed to produce summary"));
    }
}
