//! Plain-text strategy: the fetched bytes are already readable UTF-8.

use crate::output::SourceType;
use crate::pipeline::{is_pdf, Extracted, ExtractionStrategy};
use async_trait::async_trait;
use tracing::debug;

/// Strict UTF-8 decode of a remote document.
///
/// Runs before the HTML strategy, so a well-formed UTF-8 HTML page is
/// classified here with its markup intact. Invalid UTF-8 declines and leaves
/// the bytes to [`crate::pipeline::markup`].
#[derive(Debug, Clone, Copy)]
pub struct PlainTextExtractor {
    max_chars: usize,
}

impl PlainTextExtractor {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

#[async_trait]
impl ExtractionStrategy for PlainTextExtractor {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn source_type(&self) -> SourceType {
        SourceType::PlainRemote
    }

    async fn attempt(&self, bytes: &[u8]) -> Option<Extracted> {
        if is_pdf(bytes) {
            return None;
        }
        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text.trim(),
            Err(e) => {
                debug!("Not UTF-8 at byte {}", e.valid_up_to());
                return None;
            }
        };
        if text.is_empty() {
            return None;
        }
        Some(Extracted::truncated_from(text, self.max_chars))
    }
}
