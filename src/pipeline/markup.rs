//! HTML strategy: the visible text of a web page.
//!
//! Reached only when the plain-text strategy declined, i.e. the body is not
//! valid UTF-8. The bytes are decoded lossily and parsed with `scraper`;
//! text under non-rendered elements is skipped and every remaining text node
//! becomes one whitespace-collapsed line.

use crate::output::SourceType;
use crate::pipeline::postprocess::collapse_whitespace;
use crate::pipeline::{is_pdf, Extracted, ExtractionStrategy};
use async_trait::async_trait;
use scraper::{Html, Node};
use tracing::debug;

/// Elements whose text content is never shown to a reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements the HTML parser synthesises around any input, markup or not.
const IMPLIED_ELEMENTS: &[&str] = &["html", "head", "body"];

/// Above this share of U+FFFD the lossy decode is treated as binary junk.
const MAX_REPLACEMENT_RATIO: f64 = 0.10;

/// HTML text extraction strategy.
#[derive(Debug, Clone, Copy)]
pub struct MarkupExtractor {
    max_chars: usize,
}

impl MarkupExtractor {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

#[async_trait]
impl ExtractionStrategy for MarkupExtractor {
    fn name(&self) -> &'static str {
        "markup"
    }

    fn source_type(&self) -> SourceType {
        SourceType::Html
    }

    async fn attempt(&self, bytes: &[u8]) -> Option<Extracted> {
        if is_pdf(bytes) {
            return None;
        }
        let decoded = String::from_utf8_lossy(bytes);
        if replacement_ratio(&decoded) > MAX_REPLACEMENT_RATIO {
            debug!("Body looks binary, not parsing as HTML");
            return None;
        }

        let text = visible_text(&decoded)?;
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Extracted::truncated_from(text, self.max_chars))
    }
}

fn replacement_ratio(s: &str) -> f64 {
    let total = s.chars().count();
    if total == 0 {
        return 0.0;
    }
    let bad = s.chars().filter(|&c| c == char::REPLACEMENT_CHARACTER).count();
    bad as f64 / total as f64
}

/// Visible text of an HTML document, one line per text node.
///
/// Returns `None` when the parse produced no real markup, only the elements
/// the parser adds around bare text.
pub fn visible_text(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let has_markup = root.descendants().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|el| !IMPLIED_ELEMENTS.contains(&el.name()))
    });
    if !has_markup {
        return None;
    }

    let mut lines = Vec::new();
    for node in root.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }
        let line = collapse_whitespace(text);
        if !line.is_empty() {
            lines.push(line);
        }
    }

    Some(lines.join("\n"))
}
