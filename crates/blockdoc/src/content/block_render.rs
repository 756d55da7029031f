//! Block rendering.
//!
//! Converts a [`BlockDocument`] into HTML, one fragment per block in
//! document order:
//! - paragraph, heading, list, quote, image
//! - unknown kinds contribute nothing
//!
//! Block text is Editor.js inline HTML and is emitted as markup; attribute
//! values are escaped. The output is not safe for display until it has been
//! through [`sanitize_html`](super::sanitize_html).

use std::fmt::Write;

use tracing::{debug, warn};

use super::document::{Block, BlockDocument, BlockKind, ListStyle};
use super::normalize;
use crate::error::RenderError;

/// Alt text used when an image has no caption.
const DEFAULT_IMAGE_ALT: &str = "image";

/// Schemes an image url may name explicitly. Urls without a scheme are kept.
const IMAGE_URL_SCHEMES: &[&str] = &["http", "https"];

/// Render a document into a single HTML string.
///
/// Documents that are not in normalized form are normalized first.
/// A block that fails to render is skipped; the rest of the document
/// still renders.
pub fn render(doc: &BlockDocument) -> String {
    if doc.is_canonical() {
        return render_blocks(&doc.blocks);
    }
    debug!("rendering non-canonical document, normalizing first");
    render_blocks(&normalize(&doc.to_wire()).blocks)
}

/// Render blocks in order, skipping any block that fails.
pub fn render_blocks(blocks: &[Block]) -> String {
    let mut html = String::new();
    for (index, block) in blocks.iter().enumerate() {
        match render_block(block) {
            Ok(fragment) => html.push_str(&fragment),
            Err(e) => {
                warn!(error = %e, index, kind = block.kind.name(), "skipping block that failed to render");
            }
        }
    }
    html
}

/// Render a single block.
pub fn render_block(block: &Block) -> Result<String, RenderError> {
    match &block.kind {
        BlockKind::Paragraph { text } => render_paragraph(text),
        BlockKind::Heading { text, level } => render_heading(text, *level),
        BlockKind::List { style, items } => render_list(*style, items),
        BlockKind::Quote { text, caption, .. } => render_quote(text, caption),
        BlockKind::Image { url, caption, .. } => render_image(url.as_deref(), caption),
        BlockKind::Other { .. } => Ok(String::new()),
    }
}

// ---------------------------------------------------------------------------
// Individual block renderers
// ---------------------------------------------------------------------------

/// `<p>{text}</p>`
fn render_paragraph(text: &str) -> Result<String, RenderError> {
    let mut html = String::new();
    write!(html, "<p>{text}</p>")?;
    Ok(html)
}

/// `<h{level}>{text}</h{level}>`
fn render_heading(text: &str, level: u8) -> Result<String, RenderError> {
    if !(1..=6).contains(&level) {
        return Err(RenderError::HeadingLevel(level));
    }
    let mut html = String::new();
    write!(html, "<h{level}>{text}</h{level}>")?;
    Ok(html)
}

/// `<ol>`/`<ul>` with one `<li>` per item.
fn render_list(style: ListStyle, items: &[String]) -> Result<String, RenderError> {
    let tag = match style {
        ListStyle::Ordered => "ol",
        ListStyle::Unordered => "ul",
    };
    let mut html = String::new();
    write!(html, "<{tag}>")?;
    for item in items {
        write!(html, "<li>{item}</li>")?;
    }
    write!(html, "</{tag}>")?;
    Ok(html)
}

/// `<blockquote><p>{text}</p><cite>{caption}</cite></blockquote>`, cite only
/// when there is a caption.
fn render_quote(text: &str, caption: &str) -> Result<String, RenderError> {
    let mut html = String::new();
    write!(html, "<blockquote><p>{text}</p>")?;
    if !caption.is_empty() {
        write!(html, "<cite>{caption}</cite>")?;
    }
    html.push_str("</blockquote>");
    Ok(html)
}

/// `<figure><img src alt><figcaption>{caption}</figcaption></figure>`.
///
/// Images without a resolvable url render nothing.
fn render_image(url: Option<&str>, caption: &str) -> Result<String, RenderError> {
    let Some(src) = url.and_then(resolve_image_url) else {
        debug!("image block has no usable url, skipping");
        return Ok(String::new());
    };

    let alt = match plain_text(caption) {
        alt if alt.trim().is_empty() => DEFAULT_IMAGE_ALT.to_string(),
        alt => alt,
    };

    let mut html = String::new();
    write!(
        html,
        "<figure><img src=\"{}\" alt=\"{}\">",
        html_escape(&src),
        alt.replace('"', "&quot;")
    )?;
    if !caption.is_empty() {
        write!(html, "<figcaption>{caption}</figcaption>")?;
    }
    html.push_str("</figure>");
    Ok(html)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve an image url for the `src` attribute.
///
/// Relative and protocol-relative urls are kept as-is. An explicit scheme
/// must be one of [`IMAGE_URL_SCHEMES`]. Quotes, angle brackets and
/// backticks reject the url; whitespace inside it is percent-encoded.
fn resolve_image_url(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if trimmed.is_empty()
        || trimmed
            .chars()
            .any(|c| matches!(c, '"' | '\'' | '<' | '>' | '`'))
    {
        return None;
    }
    let scheme_allowed = url_scheme(trimmed).is_none_or(|scheme| {
        IMAGE_URL_SCHEMES
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(scheme))
    });
    if !scheme_allowed {
        debug!("image url scheme not allowed");
        return None;
    }
    Some(encode_whitespace(trimmed))
}

/// Scheme of an absolute url: the text before a `:` that precedes any
/// `/`, `?` or `#`, when it is a valid scheme name.
fn url_scheme(url: &str) -> Option<&str> {
    let end = url.find([':', '/', '?', '#'])?;
    if !url[end..].starts_with(':') {
        return None;
    }
    let scheme = &url[..end];
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

/// Percent-encode whitespace, leaving everything else untouched.
fn encode_whitespace(url: &str) -> String {
    let mut encoded = String::with_capacity(url.len());
    for c in url.chars() {
        if c.is_whitespace() {
            let mut buf = [0; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                encoded.push_str(&format!("%{byte:02X}"));
            }
        } else {
            encoded.push(c);
        }
    }
    encoded
}

/// Strip all markup from inline HTML, leaving escaped text.
fn plain_text(inline_html: &str) -> String {
    ammonia::Builder::empty().clean(inline_html).to_string()
}

/// HTML-escape a string for safe output.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
