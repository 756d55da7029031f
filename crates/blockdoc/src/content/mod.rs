//! Block document pipeline.
//!
//! This module provides:
//! - BlockDocument: canonical block model and its wire shape
//! - normalize: total coercion of untrusted input into a BlockDocument
//! - render: HTML rendering of a BlockDocument
//! - HtmlSanitizer: allow-list sanitization of rendered HTML
//! - safe_html: the full display path, normalize → render → sanitize

pub mod block_render;
pub mod document;
mod normalize;
mod sanitize;

use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;
use tracing::error;

pub use block_render::{render, render_block, render_blocks};
pub use document::{
    Alignment, Block, BlockDocument, BlockKind, DEFAULT_FORMAT_VERSION, ListStyle,
};
pub use normalize::{normalize, normalize_str};
pub use sanitize::{HtmlSanitizer, sanitize_html};

/// Normalize, render, and sanitize untrusted document input.
///
/// Never fails: a document that cannot be rendered displays as an empty string.
pub fn safe_html(input: &Value) -> String {
    render_guarded(|| render(&normalize(input)))
}

/// [`safe_html`] for serialized document text.
pub fn safe_html_from_str(input: &str) -> String {
    render_guarded(|| render(&normalize_str(input)))
}

/// Render and sanitize an already normalized document.
pub fn safe_html_for(doc: &BlockDocument) -> String {
    render_guarded(|| render(doc))
}

fn render_guarded<F>(render_fn: F) -> String
where
    F: FnOnce() -> String,
{
    // A panic anywhere in the render path degrades to showing nothing rather
    // than unwinding into the display surface.
    match panic::catch_unwind(AssertUnwindSafe(render_fn)) {
        Ok(html) => sanitize_html(&html),
        Err(_) => {
            error!("document render panicked, displaying empty content");
            String::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paragraph_round_trip() {
        let html = safe_html(&json!({
            "blocks": [{ "type": "paragraph", "data": { "text": "Hello" } }]
        }));
        assert_eq!(html, "<p>Hello</p>");
    }

    #[test]
    fn empty_object_renders_empty_paragraph() {
        assert_eq!(safe_html(&json!({})), "<p></p>");
    }

    #[test]
    fn text_input_is_accepted() {
        let html = safe_html_from_str(
            r#"{"blocks":[{"type":"header","data":{"text":"Title","level":9}}]}"#,
        );
        assert_eq!(html, "<h6>Title</h6>");
        assert_eq!(safe_html_from_str("<<not json>>"), "<p></p>");
    }

    #[test]
    fn script_in_text_is_removed() {
        let html = safe_html(&json!({
            "blocks": [{
                "type": "paragraph",
                "data": { "text": "Hi<script>alert('xss')</script>" }
            }]
        }));
        assert_eq!(html, "<p>Hi</p>");
    }

    #[test]
    fn panicking_renderer_degrades_to_empty_string() {
        assert_eq!(render_guarded(|| panic!("boom")), "");
    }
}
