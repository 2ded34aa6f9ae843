//! PDF rasterisation: render PDF pages to `DynamicImage`s via pdfium.
//!
//! Only used by the scan fallback, after the text layer came back empty.
//!
//! ## Why spawn_blocking?
//!
//! pdfium uses thread-local state internally and is not safe to call from
//! async contexts. `tokio::task::spawn_blocking` moves the work onto the
//! blocking pool so Tokio worker threads never stall on CPU-heavy rendering.
//!
//! ## Why cap pixels?
//!
//! Page sizes vary wildly: an A0 poster would produce a gigantic bitmap.
//! `max_rendered_pixels` caps the longest edge regardless of physical size,
//! keeping memory bounded while staying well above what tesseract needs.

use crate::error::RenderFault;
use crate::pipeline::pdfium::bind_pdfium;
use async_trait::async_trait;
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// Renders the pages of a PDF to images, one page per call.
///
/// Callers walk `0..page_count` and drop each image before asking for the
/// next, so only one bitmap is alive at a time.
#[async_trait]
pub trait PageRasterizer: Send + Sync {
    async fn page_count(&self, pdf: &[u8]) -> Result<usize, RenderFault>;

    /// Render page `index` (zero-based).
    async fn render_page(&self, pdf: &[u8], index: usize) -> Result<DynamicImage, RenderFault>;
}

/// [`PageRasterizer`] backed by pdfium.
#[derive(Debug, Clone, Copy)]
pub struct PdfiumRasterizer {
    max_pixels: u32,
}

impl PdfiumRasterizer {
    pub fn new(max_pixels: u32) -> Self {
        Self { max_pixels }
    }
}

#[async_trait]
impl PageRasterizer for PdfiumRasterizer {
    async fn page_count(&self, pdf: &[u8]) -> Result<usize, RenderFault> {
        let owned = pdf.to_vec();

        tokio::task::spawn_blocking(move || page_count_blocking(&owned))
            .await
            .map_err(|e| RenderFault::Load(format!("render task panicked: {}", e)))?
    }

    async fn render_page(&self, pdf: &[u8], index: usize) -> Result<DynamicImage, RenderFault> {
        let owned = pdf.to_vec();
        let max_pixels = self.max_pixels;

        tokio::task::spawn_blocking(move || render_page_blocking(&owned, index, max_pixels))
            .await
            .map_err(|e| RenderFault::Load(format!("render task panicked: {}", e)))?
    }
}

fn page_count_blocking(pdf: &[u8]) -> Result<usize, RenderFault> {
    let pdfium = bind_pdfium().map_err(RenderFault::BackendUnavailable)?;
    let document = pdfium
        .load_pdf_from_byte_slice(pdf, None)
        .map_err(|e| RenderFault::Load(format!("{:?}", e)))?;

    let total_pages = document.pages().len() as usize;
    info!("Rasterising up to {} pages", total_pages);
    Ok(total_pages)
}

/// Blocking implementation of single-page rendering.
fn render_page_blocking(pdf: &[u8], index: usize, max_pixels: u32) -> Result<DynamicImage, RenderFault> {
    let pdfium = bind_pdfium().map_err(RenderFault::BackendUnavailable)?;

    let document = pdfium
        .load_pdf_from_byte_slice(pdf, None)
        .map_err(|e| RenderFault::Load(format!("{:?}", e)))?;

    let page_fault = |detail: String| RenderFault::Page {
        page: index + 1,
        detail,
    };
    let page_index = u16::try_from(index).map_err(|_| page_fault("page index out of range".into()))?;
    let page = document
        .pages()
        .get(page_index)
        .map_err(|e| page_fault(format!("{:?}", e)))?;

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| page_fault(format!("{:?}", e)))?;

    let image = bitmap.as_image();
    debug!(
        "Rendered page {} → {}x{} px",
        index + 1,
        image.width(),
        image.height()
    );
    Ok(image)
}
