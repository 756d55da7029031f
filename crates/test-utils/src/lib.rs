//! Block document test utilities.
//!
//! Helpers for integration testing: a scripted editing surface, document
//! builders, hostile payloads, and assertion utilities.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use blockdoc::{BlockDocument, EditingSurface, SurfaceError};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

/// Install a test-friendly tracing subscriber. Safe to call repeatedly.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Create a test document with no blocks.
pub fn test_document() -> TestDocument {
    TestDocument {
        time: None,
        version: None,
        blocks: Vec::new(),
    }
}

/// A wire-shape document builder.
#[derive(Debug, Clone)]
pub struct TestDocument {
    pub time: Option<i64>,
    pub version: Option<String>,
    pub blocks: Vec<Value>,
}

impl TestDocument {
    /// Set the timestamp.
    pub fn with_time(mut self, time: i64) -> Self {
        self.time = Some(time);
        self
    }

    /// Set the format version.
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// Add a raw block value.
    pub fn with_block(mut self, block: Value) -> Self {
        self.blocks.push(block);
        self
    }

    /// Add a paragraph.
    pub fn paragraph(self, text: &str) -> Self {
        self.with_block(json!({ "type": "paragraph", "data": { "text": text } }))
    }

    /// Add a heading.
    pub fn header(self, text: &str, level: i64) -> Self {
        self.with_block(json!({ "type": "header", "data": { "text": text, "level": level } }))
    }

    /// Add a list.
    pub fn list(self, style: &str, items: &[&str]) -> Self {
        self.with_block(json!({ "type": "list", "data": { "style": style, "items": items } }))
    }

    /// Add a quote.
    pub fn quote(self, text: &str, caption: &str) -> Self {
        self.with_block(json!({ "type": "quote", "data": { "text": text, "caption": caption } }))
    }

    /// Add an image using the nested `file.url` shape.
    pub fn image(self, url: &str, caption: &str) -> Self {
        self.with_block(json!({
            "type": "image",
            "data": { "file": { "url": url }, "caption": caption }
        }))
    }

    /// Build the wire JSON.
    pub fn build(&self) -> Value {
        let mut doc = json!({ "blocks": self.blocks });
        if let Some(obj) = doc.as_object_mut() {
            if let Some(time) = self.time {
                obj.insert("time".to_string(), json!(time));
            }
            if let Some(version) = &self.version {
                obj.insert("version".to_string(), json!(version));
            }
        }
        doc
    }
}

/// Script-bearing payloads that must never survive sanitization.
pub const XSS_PAYLOADS: &[&str] = &[
    "<script>alert('xss')</script>",
    "<img src=x onerror=alert(1)>",
    "<a href=\"javascript:alert(1)\">click</a>",
    "<svg onload=alert(1)></svg>",
    "<iframe src=\"javascript:alert(1)\"></iframe>",
    "<p onclick=\"alert(1)\">hi</p>",
    "<scr<script>ipt>alert(1)</script>",
    // Typed as text rather than markup.
    "click javascript:alert(1)",
    "onerror=alert(1) and ONLOAD = alert(2)",
];

/// Markers whose presence in sanitized output means a payload survived.
pub const XSS_MARKERS: &[&str] = &["<script", "onerror=", "onload=", "onclick=", "javascript:"];

#[derive(Default)]
struct SurfaceState {
    content: Mutex<Value>,
    initialized_with: Mutex<Option<Value>>,
    rendered: Mutex<Vec<Value>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
    destroyed: AtomicBool,
    save_delay: Mutex<Option<Duration>>,
}

/// An in-memory editing surface.
///
/// Clones share state, so a test keeps one handle while the adapter owns
/// another. Tests mutate the content with [`FakeSurface::set_content`] to
/// simulate typing.
#[derive(Clone, Default)]
pub struct FakeSurface {
    state: Arc<SurfaceState>,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace what the next save returns.
    pub fn set_content(&self, content: Value) {
        *self.state.content.lock() = content;
    }

    /// What the editor currently holds.
    pub fn content(&self) -> Value {
        self.state.content.lock().clone()
    }

    /// Wire document the editor was initialized with.
    pub fn initialized_with(&self) -> Option<Value> {
        self.state.initialized_with.lock().clone()
    }

    /// Wire documents passed to `render`, in order.
    pub fn rendered(&self) -> Vec<Value> {
        self.state.rendered.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        self.state.saves.load(Ordering::SeqCst)
    }

    /// Make subsequent saves fail.
    pub fn fail_saves(&self, fail: bool) {
        self.state.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Make each save take `delay` before returning.
    pub fn delay_saves(&self, delay: Duration) {
        *self.state.save_delay.lock() = Some(delay);
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.destroyed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EditingSurface for FakeSurface {
    async fn initialize(&mut self, doc: &BlockDocument) -> Result<(), SurfaceError> {
        let wire = doc.to_wire();
        *self.state.initialized_with.lock() = Some(wire.clone());
        *self.state.content.lock() = wire;
        Ok(())
    }

    async fn save(&self) -> Result<Value, SurfaceError> {
        let delay = *self.state.save_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.is_destroyed() {
            return Err(SurfaceError::Unavailable);
        }
        if self.state.fail_saves.load(Ordering::SeqCst) {
            return Err(SurfaceError::Save("scripted failure".to_string()));
        }
        self.state.saves.fetch_add(1, Ordering::SeqCst);
        Ok(self.content())
    }

    async fn render(&self, doc: &BlockDocument) -> Result<(), SurfaceError> {
        let wire = doc.to_wire();
        self.state.rendered.lock().push(wire.clone());
        *self.state.content.lock() = wire;
        Ok(())
    }

    async fn destroy(&mut self) {
        self.state.destroyed.store(true, Ordering::SeqCst);
    }
}

/// Assertion helpers for rendered output.
pub mod assert {
    use serde_json::Value;

    use super::XSS_MARKERS;

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that sanitized HTML carries no script vector.
    pub fn no_script_vectors(html: &str) {
        let lower = html.to_lowercase();
        for marker in XSS_MARKERS {
            assert!(
                !lower.contains(marker),
                "Sanitized output still contains '{marker}'\nActual: {html}"
            );
        }
    }

    /// Assert that a JSON value equals expected.
    pub fn json_eq(actual: &Value, expected: &Value) {
        assert_eq!(
            actual,
            expected,
            "JSON mismatch:\nactual: {}\nexpected: {}",
            serde_json::to_string_pretty(actual).unwrap_or_default(),
            serde_json::to_string_pretty(expected).unwrap_or_default()
        );
    }
}
