//! Request inputs: the three ways a document reaches the Resolver.
//!
//! A request carries exactly one of pasted text, an uploaded file, or a URL.
//! [`InputSource::from_fields`] applies the boundary's priority order when a
//! form supplies several (file, then URL, then text) and treats blank fields
//! as absent. Upload size is checked here, before any extraction work starts.

use crate::error::{DocSumError, ExtractionFailure};
use std::path::Path;

/// A single document to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Text pasted by the user.
    RawText(String),
    /// A file uploaded by the user; only `.pdf` files are accepted.
    UploadedFile { bytes: Vec<u8>, filename: String },
    /// A remote document to fetch.
    RemoteUrl(String),
}

impl InputSource {
    /// Build the input from form-style optional fields.
    ///
    /// Priority: uploaded file, then URL, then raw text. Empty or
    /// whitespace-only fields are ignored. Nothing usable → `NotFound`.
    pub fn from_fields(
        text: Option<String>,
        file: Option<(Vec<u8>, String)>,
        url: Option<String>,
    ) -> Result<Self, ExtractionFailure> {
        if let Some((bytes, filename)) = file {
            if !filename.trim().is_empty() {
                return Ok(InputSource::UploadedFile { bytes, filename });
            }
        }
        if let Some(url) = url {
            let url = url.trim();
            if !url.is_empty() {
                return Ok(InputSource::RemoteUrl(url.to_string()));
            }
        }
        if let Some(text) = text {
            if !text.trim().is_empty() {
                return Ok(InputSource::RawText(text));
            }
        }
        Err(ExtractionFailure::NotFound)
    }

    /// Short label for logs; never includes document content.
    pub fn kind(&self) -> &'static str {
        match self {
            InputSource::RawText(_) => "text",
            InputSource::UploadedFile { .. } => "file",
            InputSource::RemoteUrl(_) => "url",
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// True when `filename` carries a `.pdf` extension, in any case.
pub fn has_pdf_extension(filename: &str) -> bool {
    Path::new(filename.trim())
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Reject an upload larger than `limit` bytes.
///
/// Callers that can see the size before reading the body (file metadata,
/// `Content-Length`) should call this first so oversized payloads are never
/// buffered.
pub fn check_upload_size(size: u64, limit: u64) -> Result<(), DocSumError> {
    if size > limit {
        return Err(DocSumError::PayloadTooLarge { size, limit });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("ftp://example.com/doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn pdf_extension_is_case_insensitive() {
        assert!(has_pdf_extension("report.pdf"));
        assert!(has_pdf_extension("REPORT.PDF"));
        assert!(has_pdf_extension("scan.Pdf"));
        assert!(!has_pdf_extension("report.txt"));
        assert!(!has_pdf_extension("pdf"));
        assert!(!has_pdf_extension("report.pdf.txt"));
    }

    #[test]
    fn file_wins_over_url_and_text() {
        let src = InputSource::from_fields(
            Some("some text".into()),
            Some((b"%PDF-1.4".to_vec(), "a.pdf".into())),
            Some("https://example.com".into()),
        )
        .unwrap();
        assert_eq!(src.kind(), "file");
    }

    #[test]
    fn url_wins_over_text_and_is_trimmed() {
        let src = InputSource::from_fields(
            Some("some text".into()),
            None,
            Some("  https://example.com/x  ".into()),
        )
        .unwrap();
        assert_eq!(src, InputSource::RemoteUrl("https://example.com/x".into()));
    }

    #[test]
    fn blank_fields_are_absent() {
        let src = InputSource::from_fields(
            Some("hello world text".into()),
            Some((Vec::new(), "   ".into())),
            Some("   ".into()),
        )
        .unwrap();
        assert_eq!(src.kind(), "text");

        let err = InputSource::from_fields(Some("  \n ".into()), None, None).unwrap_err();
        assert_eq!(err, ExtractionFailure::NotFound);
    }

    #[test]
    fn upload_size_ceiling() {
        assert!(check_upload_size(1_048_576, 1_048_576).is_ok());
        let err = check_upload_size(1_048_577, 1_048_576).unwrap_err();
        assert!(matches!(
            err,
            DocSumError::PayloadTooLarge {
                size: 1_048_577,
                limit: 1_048_576
            }
        ));
    }
}
