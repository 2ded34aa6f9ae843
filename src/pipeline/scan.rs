//! Scan fallback: rasterise an image-only PDF and OCR its pages.
//!
//! Only reached when the structural text layer came back empty. Pages are
//! rendered and recognised one at a time in page order; OCR is the slow step
//! and running several tesseract processes at once buys little on a single
//! document.
//!
//! Work stops as soon as more text than the Resolver will keep has been
//! recovered, and never goes past `max_pages` pages.

use crate::output::SourceType;
use crate::pipeline::ocr::OcrEngine;
use crate::pipeline::postprocess::normalise_text;
use crate::pipeline::render::PageRasterizer;
use crate::pipeline::{is_pdf, Extracted, ExtractionStrategy};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// OCR extraction strategy for scanned PDFs.
#[derive(Clone)]
pub struct ScanFallbackExtractor {
    rasterizer: Arc<dyn PageRasterizer>,
    ocr: Arc<dyn OcrEngine>,
    languages: Vec<String>,
    max_chars: usize,
    max_pages: usize,
}

impl ScanFallbackExtractor {
    pub fn new(
        rasterizer: Arc<dyn PageRasterizer>,
        ocr: Arc<dyn OcrEngine>,
        languages: Vec<String>,
    ) -> Self {
        Self {
            rasterizer,
            ocr,
            languages,
            max_chars: usize::MAX,
            max_pages: usize::MAX,
        }
    }

    /// Stop OCR once the recovered text exceeds `max_chars`.
    pub fn with_char_limit(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Render and OCR at most `max_pages` pages.
    pub fn with_page_limit(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }
}

#[async_trait]
impl ExtractionStrategy for ScanFallbackExtractor {
    fn name(&self) -> &'static str {
        "pdf-scan"
    }

    fn source_type(&self) -> SourceType {
        SourceType::PdfScan
    }

    async fn attempt(&self, bytes: &[u8]) -> Option<Extracted> {
        if !is_pdf(bytes) {
            return None;
        }

        let page_count = match self.rasterizer.page_count(bytes).await {
            Ok(n) => n,
            Err(e) => {
                warn!("Rasterisation failed: {}", e);
                return None;
            }
        };

        let mut pages: Vec<String> = Vec::new();
        let mut kept = 0usize;
        let mut scanned = 0usize;

        for idx in 0..page_count.min(self.max_pages) {
            if kept > self.max_chars {
                debug!(
                    "OCR stopped after {} of {} pages ({} chars)",
                    idx, page_count, kept
                );
                break;
            }

            let image = match self.rasterizer.render_page(bytes, idx).await {
                Ok(image) => image,
                Err(e) => {
                    warn!("Rasterisation failed: {}", e);
                    return None;
                }
            };

            let page_text = match self.ocr.recognize(&image, &self.languages).await {
                Ok(page_text) => normalise_text(&page_text),
                Err(e) => {
                    warn!("OCR failed on page {}: {}", idx + 1, e);
                    return None;
                }
            };
            scanned += 1;

            debug!("OCR page {}: {} chars", idx + 1, page_text.len());
            if !page_text.is_empty() {
                kept += page_text.chars().count() + usize::from(!pages.is_empty());
                pages.push(page_text);
            }
        }

        if pages.is_empty() {
            debug!("OCR found no text in {} pages", scanned);
            return None;
        }

        let text = pages.join("\n");
        info!(
            "OCR recovered {} chars from {} of {} pages",
            kept, scanned, page_count
        );
        Some(Extracted::with_pages(text, page_count))
    }
}
