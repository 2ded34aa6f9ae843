//! Structural PDF text: the glyph runs embedded in each page's content stream.
//!
//! This is the cheapest and most accurate strategy when a text layer exists,
//! so it always runs before OCR. An empty result is not an error; it is the
//! signal that the PDF is image-only and [`crate::pipeline::scan`] should try.

use crate::error::PdfFault;
use crate::output::SourceType;
use crate::pipeline::pdfium::bind_pdfium;
use crate::pipeline::postprocess::normalise_text;
use crate::pipeline::{is_pdf, Extracted, ExtractionStrategy};
use async_trait::async_trait;
use pdfium_render::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reads the text layer of a PDF, one entry per page in document order.
///
/// Pages without a text layer yield an empty string rather than an error.
#[async_trait]
pub trait PdfTextBackend: Send + Sync {
    async fn page_texts(&self, pdf: &[u8]) -> Result<Vec<String>, PdfFault>;
}

/// [`PdfTextBackend`] backed by pdfium.
///
/// Runs inside `spawn_blocking`: pdfium is CPU-bound and not async-safe.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfiumTextBackend;

#[async_trait]
impl PdfTextBackend for PdfiumTextBackend {
    async fn page_texts(&self, pdf: &[u8]) -> Result<Vec<String>, PdfFault> {
        let owned = pdf.to_vec();
        tokio::task::spawn_blocking(move || page_texts_blocking(&owned))
            .await
            .map_err(|e| PdfFault::Unreadable(format!("text task panicked: {e}")))?
    }
}

fn page_texts_blocking(pdf: &[u8]) -> Result<Vec<String>, PdfFault> {
    let pdfium = bind_pdfium().map_err(PdfFault::BackendUnavailable)?;
    let document = pdfium
        .load_pdf_from_byte_slice(pdf, None)
        .map_err(|e| PdfFault::Unreadable(format!("{:?}", e)))?;

    let pages = document.pages();
    let mut texts = Vec::with_capacity(pages.len() as usize);
    for (idx, page) in pages.iter().enumerate() {
        match page.text() {
            Ok(text) => texts.push(text.all()),
            Err(e) => {
                debug!("Page {}: no text layer ({:?})", idx + 1, e);
                texts.push(String::new());
            }
        }
    }
    Ok(texts)
}

/// Structural text extraction strategy.
#[derive(Clone)]
pub struct PdfTextExtractor {
    backend: Arc<dyn PdfTextBackend>,
}

impl PdfTextExtractor {
    pub fn new(backend: Arc<dyn PdfTextBackend>) -> Self {
        Self { backend }
    }

    /// Extract the text layer, keeping faults visible.
    ///
    /// - `Err(PdfFault::NotAPdf)`: the buffer lacks the `%PDF-` signature
    /// - `Err(..)`: the PDF could not be parsed or pdfium is unavailable
    /// - `Ok(None)`: a valid PDF with no extractable text
    ///
    /// Direct uploads use this form so "not actually a PDF" and "PDF with no
    /// text" stay distinguishable.
    pub async fn extract_strict(&self, bytes: &[u8]) -> Result<Option<Extracted>, PdfFault> {
        if !is_pdf(bytes) {
            return Err(PdfFault::NotAPdf {
                magic: bytes.iter().take(5).copied().collect(),
            });
        }

        let pages = self.backend.page_texts(bytes).await?;
        let page_count = pages.len();

        let mut text = String::new();
        let mut pages_with_text = 0usize;
        for page in &pages {
            if page.trim().is_empty() {
                continue;
            }
            text.push_str(page);
            text.push('\n');
            pages_with_text += 1;
        }

        let text = normalise_text(&text);
        if text.is_empty() {
            debug!("No structural text in {} pages", page_count);
            return Ok(None);
        }

        info!(
            "Extracted structural text from {}/{} pages, {} chars",
            pages_with_text,
            page_count,
            text.chars().count()
        );
        Ok(Some(Extracted::with_pages(text, page_count)))
    }
}

#[async_trait]
impl ExtractionStrategy for PdfTextExtractor {
    fn name(&self) -> &'static str {
        "pdf-text"
    }

    fn source_type(&self) -> SourceType {
        SourceType::PdfFile
    }

    async fn attempt(&self, bytes: &[u8]) -> Option<Extracted> {
        match self.extract_strict(bytes).await {
            Ok(found) => found,
            Err(PdfFault::NotAPdf { .. }) => {
                debug!("No PDF signature, skipping structural extraction");
                None
            }
            Err(e) => {
                warn!("Structural extraction failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPages(Vec<&'static str>);

    #[async_trait]
    impl PdfTextBackend for FixedPages {
        async fn page_texts(&self, _pdf: &[u8]) -> Result<Vec<String>, PdfFault> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct Corrupt;

    #[async_trait]
    impl PdfTextBackend for Corrupt {
        async fn page_texts(&self, _pdf: &[u8]) -> Result<Vec<String>, PdfFault> {
            Err(PdfFault::Unreadable("xref table missing".into()))
        }
    }

    fn extractor(backend: impl PdfTextBackend + 'static) -> PdfTextExtractor {
        PdfTextExtractor::new(Arc::new(backend))
    }

    #[tokio::test]
    async fn concatenates_pages_and_skips_empty_ones() {
        let ex = extractor(FixedPages(vec!["First page", "   ", "Third page"]));
        let out = ex.attempt(b"%PDF-1.4 body").await.unwrap();
        assert_eq!(out.text, "First page\nThird page");
        assert_eq!(out.page_count, Some(3));
    }

    #[tokio::test]
    async fn empty_text_layer_is_none_not_error() {
        let ex = extractor(FixedPages(vec!["", " \n "]));
        assert_eq!(ex.extract_strict(b"%PDF-1.7").await.unwrap(), None);
        assert_eq!(ex.attempt(b"%PDF-1.7").await, None);
    }

    #[tokio::test]
    async fn missing_signature_is_distinguished() {
        let ex = extractor(FixedPages(vec!["never read"]));
        let err = ex.extract_strict(b"not a pdf").await.unwrap_err();
        assert!(matches!(err, PdfFault::NotAPdf { .. }));
        assert_eq!(ex.attempt(b"not a pdf").await, None);
    }

    #[tokio::test]
    async fn parser_fault_is_swallowed_by_attempt() {
        let ex = extractor(Corrupt);
        assert!(matches!(
            ex.extract_strict(b"%PDF-1.4").await,
            Err(PdfFault::Unreadable(_))
        ));
        assert_eq!(ex.attempt(b"%PDF-1.4").await, None);
    }
}
