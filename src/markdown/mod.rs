//! Markdown renderer for assistant replies
//!
//! Converts markdown text to HTML that is safe to embed:
//! - Raw HTML in the input is escaped and shown as text
//! - Links and images with an unsafe scheme are reduced to their text
//!
//! Includes a memoization layer (`RenderCache`) keyed by content hash so
//! unchanged messages are not re-parsed.
//!
//! Incomplete markdown, as seen mid-stream, renders without error.

mod cache;
mod links;

pub use cache::{CachedRenderer, RenderCache};
pub use links::{is_safe_url, url_scheme, SAFE_SCHEMES};

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};
use tracing::debug;

use crate::traits::Renderer;

/// Maximum number of entries in the render cache before eviction
pub const RENDER_CACHE_MAX_ENTRIES: usize = 500;

/// Markdown extensions enabled on top of CommonMark.
fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Destination of a link or image start tag.
fn link_destination<'a>(event: &'a Event<'_>) -> Option<&'a str> {
    match event {
        Event::Start(Tag::Link { dest_url, .. }) | Event::Start(Tag::Image { dest_url, .. }) => {
            Some(&**dest_url)
        }
        _ => None,
    }
}

/// Render markdown text to sanitized HTML.
///
/// Supports:
/// - CommonMark blocks and inlines
/// - Tables, strikethrough (`~~text~~`) and task lists (`- [x] done`)
pub fn render_markdown(text: &str) -> String {
    // One entry per open link/image: true when its tags are being dropped
    let mut dropped: Vec<bool> = Vec::new();

    let events = Parser::new_ext(text, markdown_options()).filter_map(move |event| {
        if let Some(dest) = link_destination(&event) {
            let keep = is_safe_url(dest);
            if !keep {
                debug!(url = %dest, "Dropping link with unsafe scheme");
            }
            dropped.push(!keep);
            return keep.then_some(event);
        }

        match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Some(Event::Text(raw)),
            Event::End(TagEnd::Link) | Event::End(TagEnd::Image) => {
                if dropped.pop().unwrap_or(false) {
                    None
                } else {
                    Some(event)
                }
            }
            other => Some(other),
        }
    });

    let mut out = String::with_capacity(text.len() + text.len() / 2);
    html::push_html(&mut out, events);
    out
}

/// [`Renderer`] backed by [`render_markdown`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, markdown: &str) -> String {
        render_markdown(markdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_inline() {
        let html = render_markdown("Hello **world** and *you*");
        assert_eq!(
            html,
            "<p>Hello <strong>world</strong> and <em>you</em></p>\n"
        );
    }

    #[test]
    fn test_render_code_block_escapes_content() {
        let html = render_markdown("```\nlet x = a < b;\n```");
        assert!(html.contains("<pre><code>"));
        assert!(html.contains("a &lt; b"));
    }

    #[test]
    fn test_raw_html_block_is_escaped() {
        let html = render_markdown("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_inline_html_is_escaped() {
        let html = render_markdown("click <img src=x onerror=alert(1)> here");
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;img"));
    }

    #[test]
    fn test_safe_link_kept() {
        let html = render_markdown("[docs](https://example.com/docs)");
        assert_eq!(
            html,
            "<p><a href=\"https://example.com/docs\">docs</a></p>\n"
        );
    }

    #[test]
    fn test_javascript_link_reduced_to_text() {
        let html = render_markdown("[click](javascript:alert(1)) after");
        assert_eq!(html, "<p>click after</p>\n");
    }

    #[test]
    fn test_unsafe_image_reduced_to_alt_text() {
        let html = render_markdown("![chart](data:image/svg+xml;base64,AAAA)");
        assert!(!html.contains("<img"));
        assert!(html.contains("chart"));
    }

    #[test]
    fn test_mixed_safe_and_unsafe_links() {
        let html = render_markdown("[a](javascript:x) [b](/attachments/1/raw)");
        assert_eq!(
            html,
            "<p>a <a href=\"/attachments/1/raw\">b</a></p>\n"
        );
    }

    #[test]
    fn test_table_rendered() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_strikethrough_and_tasklist() {
        let html = render_markdown("~~old~~\n\n- [x] done");
        assert!(html.contains("<del>old</del>"));
        assert!(html.contains("checkbox"));
    }

    #[test]
    fn test_incomplete_markdown_does_not_panic() {
        for partial in ["**bold", "```rust\nfn main(", "[link](http", "| a |"] {
            let _ = render_markdown(partial);
        }
    }

    #[test]
    fn test_markdown_renderer_trait() {
        let renderer: Box<dyn Renderer> = Box::new(MarkdownRenderer::new());
        assert_eq!(renderer.render("# Title"), "<h1>Title</h1>\n");
    }
}
