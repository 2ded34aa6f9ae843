//! The Resolver: turn any [`InputSource`] into clean, length-bounded text.
//!
//! ## Strategy order
//!
//! ```text
//! RawText      ──▶ trim ───────────────────────────────────────┐
//! UploadedFile ──▶ .pdf? ──▶ pdf_text ──▶ scan ────────────────┤
//! RemoteUrl    ──▶ fetch ──▶ pdf_text ──▶ scan ──▶ plain ──▶ markup
//!                                                              │
//!                                        finalize (min / max) ◀┘
//! ```
//!
//! The chain is strictly sequential and stops at the first strategy that
//! returns text. OCR only ever runs after the structural pass has been
//! observed to come back empty for the same bytes.

use crate::config::SummaryConfig;
use crate::error::{DocSumError, ExtractionFailure, PdfFault};
use crate::output::{ExtractionResult, SourceType};
use crate::pipeline::fetch::Fetcher;
use crate::pipeline::input::{has_pdf_extension, InputSource};
use crate::pipeline::markup::MarkupExtractor;
use crate::pipeline::ocr::{OcrEngine, TesseractCli};
use crate::pipeline::pdf_text::{PdfTextBackend, PdfTextExtractor, PdfiumTextBackend};
use crate::pipeline::plain::PlainTextExtractor;
use crate::pipeline::postprocess::truncate_chars;
use crate::pipeline::render::{PageRasterizer, PdfiumRasterizer};
use crate::pipeline::scan::ScanFallbackExtractor;
use crate::pipeline::{is_pdf, Extracted, ExtractionStrategy};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The external capabilities the PDF strategies depend on.
///
/// Production code uses pdfium and the tesseract CLI; tests swap in fakes.
#[derive(Clone)]
pub struct Collaborators {
    pub pdf_text: Arc<dyn PdfTextBackend>,
    pub rasterizer: Arc<dyn PageRasterizer>,
    pub ocr: Arc<dyn OcrEngine>,
}

impl Collaborators {
    /// pdfium for text and rendering, tesseract for OCR.
    pub fn from_config(config: &SummaryConfig) -> Self {
        Self {
            pdf_text: Arc::new(PdfiumTextBackend),
            rasterizer: Arc::new(PdfiumRasterizer::new(config.max_rendered_pixels)),
            ocr: Arc::new(TesseractCli::new(config.tesseract_cmd.clone())),
        }
    }
}

/// Resolves inputs to [`ExtractionResult`]s. Holds no per-request state.
#[derive(Clone)]
pub struct Resolver {
    fetcher: Fetcher,
    pdf_text: PdfTextExtractor,
    scan: ScanFallbackExtractor,
    plain: PlainTextExtractor,
    markup: MarkupExtractor,
    min_chars: usize,
    max_chars: usize,
}

impl Resolver {
    /// Build a resolver with the production collaborators.
    pub fn new(config: &SummaryConfig) -> Result<Self, DocSumError> {
        Self::with_collaborators(config, Collaborators::from_config(config))
    }

    /// Build a resolver around caller-supplied collaborators.
    pub fn with_collaborators(
        config: &SummaryConfig,
        collab: Collaborators,
    ) -> Result<Self, DocSumError> {
        let fetcher = Fetcher::new(config).map_err(|e| DocSumError::Internal(e.to_string()))?;
        Ok(Self {
            fetcher,
            pdf_text: PdfTextExtractor::new(collab.pdf_text),
            scan: ScanFallbackExtractor::new(
                collab.rasterizer,
                collab.ocr,
                config.ocr_languages.clone(),
            )
            .with_char_limit(config.max_input_chars)
            .with_page_limit(config.max_ocr_pages),
            plain: PlainTextExtractor::new(config.max_input_chars),
            markup: MarkupExtractor::new(config.max_input_chars),
            min_chars: config.min_text_chars,
            max_chars: config.max_input_chars,
        })
    }

    /// Resolve one input to text.
    pub async fn resolve(&self, source: InputSource) -> Result<ExtractionResult, ExtractionFailure> {
        info!("Resolving {} input", source.kind());
        let result = match source {
            InputSource::RawText(text) => {
                self.finalize(Extracted::new(text.trim()), SourceType::DirectText)
            }
            InputSource::UploadedFile { bytes, filename } => {
                self.resolve_upload(&bytes, &filename).await
            }
            InputSource::RemoteUrl(url) => {
                let bytes = self.fetcher.fetch(&url).await?;
                self.resolve_bytes(&bytes).await
            }
        };

        match &result {
            Ok(r) => info!(
                "Resolved as {} ({} chars{})",
                r.source_type,
                r.text.chars().count(),
                if r.truncated { ", truncated" } else { "" }
            ),
            Err(e) => warn!("Resolution failed: {}", e),
        }
        result
    }

    /// [`Self::resolve`] under a deadline of `secs` seconds.
    ///
    /// Dropping the resolution on timeout also kills a running tesseract
    /// child.
    pub async fn resolve_within(
        &self,
        source: InputSource,
        secs: u64,
    ) -> Result<ExtractionResult, DocSumError> {
        let resolved = tokio::time::timeout(Duration::from_secs(secs), self.resolve(source))
            .await
            .map_err(|_| DocSumError::Timeout { secs })??;
        Ok(resolved)
    }

    /// Run the full URL strategy chain over an already-fetched buffer.
    pub async fn resolve_bytes(&self, bytes: &[u8]) -> Result<ExtractionResult, ExtractionFailure> {
        let chain: [&dyn ExtractionStrategy; 4] =
            [&self.pdf_text, &self.scan, &self.plain, &self.markup];

        if let Some((extracted, source_type)) = run_chain(&chain, bytes).await {
            return self.finalize(extracted, source_type);
        }

        if is_pdf(bytes) {
            Err(ExtractionFailure::EmptyContent {
                chars: 0,
                min: self.min_chars,
            })
        } else {
            Err(ExtractionFailure::DecodeError {
                detail: "content is not a PDF, readable text or an HTML page".to_string(),
            })
        }
    }

    async fn resolve_upload(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<ExtractionResult, ExtractionFailure> {
        if !has_pdf_extension(filename) {
            return Err(ExtractionFailure::UnsupportedFormat {
                filename: filename.to_string(),
            });
        }

        let structural = self.pdf_text.extract_strict(bytes).await.map_err(|e| match e {
            PdfFault::NotAPdf { .. } => ExtractionFailure::DecodeError {
                detail: "file is not a valid PDF (missing %PDF- signature)".to_string(),
            },
            other => ExtractionFailure::DecodeError {
                detail: other.to_string(),
            },
        })?;

        if let Some(extracted) = structural {
            return self.finalize(extracted, SourceType::PdfFile);
        }

        debug!("'{}' has no text layer, trying OCR", filename);
        match self.scan.attempt(bytes).await {
            Some(extracted) => self.finalize(extracted, SourceType::PdfScan),
            None => Err(ExtractionFailure::EmptyContent {
                chars: 0,
                min: self.min_chars,
            }),
        }
    }

    /// Uniform post-validation: minimum length, then silent truncation.
    ///
    /// `original_chars` is the length before any cut, including one a
    /// strategy already made.
    fn finalize(
        &self,
        extracted: Extracted,
        source_type: SourceType,
    ) -> Result<ExtractionResult, ExtractionFailure> {
        let trimmed = extracted.text.trim();
        let chars = trimmed.chars().count();
        if chars < self.min_chars {
            return Err(ExtractionFailure::EmptyContent {
                chars,
                min: self.min_chars,
            });
        }

        let original_chars = extracted.full_chars.map_or(chars, |full| full.max(chars));
        let text = if chars > self.max_chars {
            truncate_chars(trimmed, self.max_chars).trim_end()
        } else {
            trimmed
        };

        Ok(ExtractionResult {
            text: text.to_string(),
            source_type,
            page_count: extracted.page_count,
            original_chars,
            truncated: original_chars > self.max_chars,
        })
    }
}

/// Try each strategy in order; the first non-blank result wins.
async fn run_chain(
    chain: &[&dyn ExtractionStrategy],
    bytes: &[u8],
) -> Option<(Extracted, SourceType)> {
    for strategy in chain {
        match strategy.attempt(bytes).await {
            Some(found) if !found.text.trim().is_empty() => {
                debug!("Strategy '{}' produced text", strategy.name());
                return Some((found, strategy.source_type()));
            }
            _ => debug!("Strategy '{}' found nothing", strategy.name()),
        }
    }
    None
}
