//! HTML sanitization of rendered documents.
//!
//! Uses ammonia with an explicit allow-list covering the markup the renderer
//! emits plus Editor.js inline formatting. Anything else is stripped: script
//! and style elements with their content, event handler attributes, and URLs
//! outside the configured schemes. Script schemes and event handler
//! assignments that survive as text are entity-encoded.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::Config;

/// Tags that survive sanitization.
const ALLOWED_TAGS: &[&str] = &[
    // Block structure produced by the renderer.
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "ul",
    "ol",
    "li",
    "blockquote",
    "cite",
    "figure",
    "figcaption",
    "img",
    // Inline formatting from the editor's inline toolbar.
    "a",
    "b",
    "strong",
    "i",
    "em",
    "u",
    "s",
    "mark",
    "code",
    "br",
];

/// Allowed attributes per tag.
fn allowed_attributes(tag: &str) -> &'static [&'static str] {
    match tag {
        "a" => &["href", "title", "target"],
        "img" => &["src", "alt", "title", "width", "height"],
        _ => &[],
    }
}

/// Script URL schemes, wherever they appear.
///
/// # Panics
///
/// Panics if the hard-coded regex literal is invalid (impossible in practice).
#[allow(clippy::expect_used)]
static SCRIPT_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(javascript|vbscript):").expect("valid regex literal"));

/// Event handler assignments, wherever they appear. `on` must not be
/// preceded by a letter, so words like `conversion =` are left alone.
///
/// # Panics
///
/// Panics if the hard-coded regex literal is invalid (impossible in practice).
#[allow(clippy::expect_used)]
static EVENT_HANDLER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(^|[^a-z])(on[a-z]+\s*)=").expect("valid regex literal"));

static DEFAULT_CONFIG: LazyLock<Config> = LazyLock::new(Config::default);

static DEFAULT_SANITIZER: LazyLock<HtmlSanitizer<'static>> = LazyLock::new(HtmlSanitizer::new);

/// Sanitize HTML with the default policy.
pub fn sanitize_html(html: &str) -> String {
    DEFAULT_SANITIZER.clean(html)
}

/// Allow-list HTML sanitizer.
///
/// The ammonia policy is built once per sanitizer; URL schemes and the link
/// rel are borrowed from the [`Config`] it was built from.
pub struct HtmlSanitizer<'a> {
    builder: ammonia::Builder<'a>,
}

impl Default for HtmlSanitizer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlSanitizer<'static> {
    /// Sanitizer with the default policy.
    pub fn new() -> Self {
        Self::from_config(&DEFAULT_CONFIG)
    }
}

impl<'a> HtmlSanitizer<'a> {
    /// Sanitizer using the configured URL schemes and link rel.
    pub fn from_config(config: &'a Config) -> Self {
        let tags: HashSet<&str> = ALLOWED_TAGS.iter().copied().collect();
        let tag_attributes: HashMap<&str, HashSet<&str>> = ALLOWED_TAGS
            .iter()
            .filter(|tag| !allowed_attributes(tag).is_empty())
            .map(|tag| (*tag, allowed_attributes(tag).iter().copied().collect()))
            .collect();
        let url_schemes: HashSet<&str> = config.url_schemes.iter().map(String::as_str).collect();

        let mut builder = ammonia::Builder::default();
        builder
            .tags(tags)
            .tag_attributes(tag_attributes)
            .generic_attributes(HashSet::new())
            .url_schemes(url_schemes)
            .link_rel(config.link_rel.as_deref());
        Self { builder }
    }

    /// Strip everything outside the allow-list, then defuse script markers
    /// left in text.
    pub fn clean(&self, html: &str) -> String {
        let cleaned = self.builder.clean(html).to_string();
        defuse_script_markers(&cleaned)
    }
}

/// Entity-encode the `:` of script schemes and the `=` of event handler
/// assignments.
///
/// After the ammonia pass these can only sit in text or attribute values,
/// where the browser decodes the entity back to the same character.
fn defuse_script_markers(html: &str) -> String {
    let html = SCRIPT_SCHEME.replace_all(html, "${1}&#58;");
    EVENT_HANDLER
        .replace_all(&html, "${1}${2}&#61;")
        .into_owned()
}
