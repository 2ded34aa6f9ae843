//! Extraction stages for turning raw bytes into summarisable text.
//!
//! Each submodule implements exactly one strategy or one collaborator, so
//! every stage can be tested in isolation and swapped (e.g. a different OCR
//! engine) without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ fetch ──▶ pdf_text ──▶ scan ──▶ plain ──▶ markup
//! (text/file/URL)     (pdfium)   (render+ocr) (utf-8)  (scraper)
//! ```
//!
//! 1. [`input`]: the three request shapes and the upload ceiling
//! 2. [`fetch`]: download a URL; the only stage with network I/O
//! 3. [`pdf_text`]: structural text layer via pdfium
//! 4. [`scan`]: rasterise ([`render`]) and OCR ([`ocr`]) image-only PDFs
//! 5. [`plain`]: strict UTF-8 decode
//! 6. [`markup`]: visible text of an HTML page
//! 7. [`postprocess`]: deterministic whitespace/Unicode cleanup
//!
//! The strategies share one capability, [`ExtractionStrategy::attempt`], and
//! the Resolver walks an ordered slice of them until one yields text.

use crate::output::SourceType;
use crate::pipeline::postprocess::truncate_chars;
use async_trait::async_trait;

pub mod fetch;
pub mod input;
pub mod markup;
pub mod ocr;
pub mod pdf_text;
pub mod pdfium;
pub mod plain;
pub mod postprocess;
pub mod render;
pub mod scan;

/// Leading bytes of every PDF file.
pub const PDF_MAGIC: &[u8] = b"%PDF-";

/// Magic-number check: does `bytes` start with `%PDF-`?
pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}

/// Text recovered by one strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub text: String,
    /// Page count when the source is paginated.
    pub page_count: Option<usize>,
    /// Character count before the strategy cut `text` short, if it did.
    pub full_chars: Option<usize>,
}

impl Extracted {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            page_count: None,
            full_chars: None,
        }
    }

    pub fn with_pages(text: impl Into<String>, pages: usize) -> Self {
        Self {
            text: text.into(),
            page_count: Some(pages),
            full_chars: None,
        }
    }

    /// The first `max_chars` characters of `text`, remembering its full length.
    pub fn truncated_from(text: &str, max_chars: usize) -> Self {
        let full = text.chars().count();
        if full <= max_chars {
            return Self::new(text);
        }
        Self {
            text: truncate_chars(text, max_chars).trim_end().to_string(),
            page_count: None,
            full_chars: Some(full),
        }
    }
}

/// One step of the fallback chain.
///
/// `attempt` never fails: every internal fault (parser error, decode error,
/// missing OCR binary) is logged and reported as `None`, which tells the
/// Resolver to move on to the next strategy.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Classification reported when this strategy wins.
    fn source_type(&self) -> SourceType;

    /// Try to recover text from `bytes`.
    async fn attempt(&self, bytes: &[u8]) -> Option<Extracted>;
}
