//! Post-processing: deterministic cleanup of extracted text and summaries.
//!
//! pdfium and tesseract both emit layout noise: CRLF or form-feed line breaks,
//! zero-width characters, trailing spaces on every line, and long runs of
//! blank lines where a page had whitespace. None of it carries meaning and all
//! of it eats into the summariser's character budget, so PDF and OCR output is
//! normalised before the Resolver measures it.
//!
//! Summaries get a lighter pass: models sometimes wrap the whole answer in a
//! code fence even when told not to.
//!
//! Rules are applied in a fixed order: line endings first so every later rule
//! only has to deal with `\n`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Normalise text recovered from a PDF text layer or OCR.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF, CR and form feed → LF)
/// 2. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 3. Trim trailing whitespace per line
/// 4. Collapse 3+ consecutive newlines down to one blank line
/// 5. Trim the whole text
pub fn normalise_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    s.trim().to_string()
}

/// Clean a model-generated summary.
///
/// Strips an outer markdown fence, normalises line endings and whitespace,
/// and trims. A blank result means the model produced nothing usable.
pub fn clean_summary(input: &str) -> String {
    let s = strip_markdown_fences(input);
    let s = normalise_line_endings(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    s.trim().to_string()
}

/// The first `max_chars` characters of `s` (not bytes).
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

/// Collapse every whitespace run to a single space.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Rule: Strip outer markdown fences ────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z]*\r?\n(.*)\n```\s*$").unwrap());

fn strip_markdown_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule: Normalise line endings ─────────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input
        .replace("\r\n", "\n")
        .replace(['\r', '\u{000C}'], "\n")
}

// ── Rule: Remove invisible Unicode characters ────────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule: Trim trailing whitespace per line ──────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule: Collapse excessive blank lines ─────────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences() {
        let input = "```markdown\nRingkasan\nPoin utama\n```";
        assert_eq!(strip_markdown_fences(input), "Ringkasan\nPoin utama");
    }

    #[test]
    fn test_no_fences_passthrough() {
        let input = "Ringkasan\nPoin utama";
        assert_eq!(strip_markdown_fences(input), input);
    }

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc\u{000C}d"), "a\nb\nc\nd");
    }

    #[test]
    fn test_trim_trailing_whitespace() {
        assert_eq!(
            trim_trailing_whitespace("  hello   \nworld  "),
            "  hello\nworld"
        );
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_remove_invisible() {
        let input = "hello\u{200B}world\u{FEFF}foo\u{00AD}bar";
        assert_eq!(remove_invisible_chars(input), "helloworldfoobar");
    }

    #[test]
    fn normalise_text_full_pipeline() {
        let input = "\u{FEFF}  Page one   \r\n\r\n\r\n\r\nPage\u{200B} two\u{000C}\n\n\n";
        assert_eq!(normalise_text(input), "Page one\n\nPage two");
    }

    #[test]
    fn clean_summary_blank_stays_blank() {
        assert_eq!(clean_summary("   \n\n  "), "");
        assert_eq!(clean_summary("```\n\n```"), "");
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        let s = "héllo wörld";
        assert_eq!(truncate_chars(s, 4), "héll");
        assert_eq!(truncate_chars(s, 100), s);
        assert_eq!(truncate_chars(s, 0), "");
    }

    #[test]
    fn collapse_whitespace_joins_runs() {
        assert_eq!(collapse_whitespace("  a \n\t b  c "), "a b c");
    }
}
