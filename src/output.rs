//! Result types produced by resolution and summarisation.

use crate::error::DocSumError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which extraction strategy produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Pasted text, no extraction.
    DirectText,
    /// Structural text layer of a PDF.
    PdfFile,
    /// OCR of a rasterised, image-only PDF.
    PdfScan,
    /// Visible text of an HTML page.
    Html,
    /// A remote document decoded directly as UTF-8 text.
    PlainRemote,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SourceType::DirectText => "Direct text",
            SourceType::PdfFile => "PDF file",
            SourceType::PdfScan => "Scanned PDF (OCR)",
            SourceType::Html => "HTML page",
            SourceType::PlainRemote => "Plain text URL",
        };
        f.write_str(label)
    }
}

/// Clean, length-bounded text ready for the summariser.
///
/// `text` is never empty and carries no leading or trailing whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub text: String,
    pub source_type: SourceType,
    pub page_count: Option<usize>,
    /// Character count of the resolved text before truncation. For a scan
    /// whose OCR stopped early, only the pages read are counted.
    pub original_chars: usize,
    /// True when `text` was cut to the configured maximum.
    pub truncated: bool,
}

/// Payload handed to the summarisation collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub text: String,
    pub max_output_tokens: usize,
}

impl SummaryRequest {
    /// Build the request from a successful resolution.
    pub fn from_extraction(extraction: &ExtractionResult, max_output_tokens: usize) -> Self {
        Self {
            text: extraction.text.clone(),
            max_output_tokens,
        }
    }
}

/// A completed summary with its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryOutput {
    pub summary: String,
    pub source_type: SourceType,
    /// Characters of the resolved document before truncation.
    pub original_length: usize,
    pub page_count: Option<usize>,
    pub truncated: bool,
}

/// Boundary response: `{summary, source_type, original_length}` or `{error}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SummaryResponse {
    Success {
        summary: String,
        source_type: SourceType,
        original_length: usize,
    },
    Failure {
        error: String,
    },
}

impl From<Result<SummaryOutput, DocSumError>> for SummaryResponse {
    fn from(result: Result<SummaryOutput, DocSumError>) -> Self {
        match result {
            Ok(out) => SummaryResponse::Success {
                summary: out.summary,
                source_type: out.source_type,
                original_length: out.original_length,
            },
            Err(e) => SummaryResponse::Failure {
                error: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionFailure;

    #[test]
    fn source_type_serialises_snake_case() {
        let json = serde_json::to_string(&SourceType::PlainRemote).unwrap();
        assert_eq!(json, "\"plain_remote\"");
        assert_eq!(SourceType::PdfScan.to_string(), "Scanned PDF (OCR)");
    }

    #[test]
    fn success_response_shape() {
        let out = SummaryOutput {
            summary: "Ringkasan singkat.".into(),
            source_type: SourceType::PdfFile,
            original_length: 1234,
            page_count: Some(3),
            truncated: false,
        };
        let resp = SummaryResponse::from(Ok(out));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["summary"], "Ringkasan singkat.");
        assert_eq!(value["source_type"], "pdf_file");
        assert_eq!(value["original_length"], 1234);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn failure_response_shape() {
        let resp = SummaryResponse::from(Err(DocSumError::from(
            ExtractionFailure::UnsupportedFormat {
                filename: "report.txt".into(),
            },
        )));
        let value = serde_json::to_value(&resp).unwrap();
        assert!(value["error"].as_str().unwrap().contains("report.txt"));
        assert!(value.get("summary").is_none());
    }

    #[test]
    fn summary_request_copies_text() {
        let ex = ExtractionResult {
            text: "Isi dokumen yang cukup panjang.".into(),
            source_type: SourceType::DirectText,
            page_count: None,
            original_chars: 31,
            truncated: false,
        };
        let req = SummaryRequest::from_extraction(&ex, 256);
        assert_eq!(req.text, ex.text);
        assert_eq!(req.max_output_tokens, 256);
    }
}
