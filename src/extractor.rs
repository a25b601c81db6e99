//! Plain-text extraction from rendered article HTML.
//!
//! Strips markup so that only analyzable prose reaches the tokenizer.
//! Preformatted blocks are dropped together with their contents because
//! source code would otherwise dominate the word counts.

use regex::Regex;

/// Removes markup and code blocks from rendered article bodies.
///
/// Never fails: input that does not look like well-formed HTML is
/// stripped on a best-effort basis.
pub struct TextExtractor {
    comment: Regex,
    preformatted: Regex,
    block_tag: Regex,
    any_tag: Regex,
}

impl TextExtractor {
    pub fn new() -> Self {
        Self {
            comment: Regex::new(r"(?s)<!--.*?-->").unwrap(),
            preformatted: Regex::new(r"(?is)<pre\b[^>]*>.*?</pre\s*>").unwrap(),
            block_tag: Regex::new(
                r"(?i)</?(?:p|div|li|ul|ol|br|h[1-6]|blockquote|tr|td|th|table)\b[^>]*>",
            )
            .unwrap(),
            // A '<' only opens a tag when a name, '/' or '!' follows it
            any_tag: Regex::new(r"</?[A-Za-z!][^>]*>").unwrap(),
        }
    }

    /// Extract prose from an HTML string
    pub fn extract(&self, html: &str) -> String {
        let text = self.comment.replace_all(html, "");
        let text = self.preformatted.replace_all(&text, "");
        let text = self.block_tag.replace_all(&text, "\n");

        // Removing one tag can splice the halves of another together
        let mut text = text.into_owned();
        loop {
            let stripped = self.any_tag.replace_all(&text, "");
            if stripped == text {
                break;
            }
            text = stripped.into_owned();
        }

        text.trim().to_string()
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}
