//! Renderer trait abstraction.
//!
//! Turns accumulated assistant text into sanitized display markup.

use pulldown_cmark_escape::escape_html;

/// Trait for rendering assistant markdown into display markup.
///
/// Implementations must return output that is safe to embed: raw markup in
/// the input must not survive as markup.
pub trait Renderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}

/// Renderer that escapes text and keeps it verbatim. Used where no
/// markdown processing is wanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

impl Renderer for PlainTextRenderer {
    fn render(&self, markdown: &str) -> String {
        let mut out = String::with_capacity(markdown.len());
        // Writing into a String cannot fail.
        let _ = escape_html(&mut out, markdown);
        out
    }
}
