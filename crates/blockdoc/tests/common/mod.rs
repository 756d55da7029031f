#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)]
//! Common helpers for integration tests.

use std::sync::Arc;

use blockdoc::{AdapterOptions, BlockDocument, EditorAdapter};
use blockdoc_test_utils::FakeSurface;
use parking_lot::Mutex;
use serde_json::Value;

/// Documents delivered to `on_change`, in order.
pub type Received = Arc<Mutex<Vec<BlockDocument>>>;

/// Initialize tracing for a test.
pub fn setup() {
    blockdoc_test_utils::init_tracing();
}

/// Adapter with a recording callback and a mounted fake surface.
pub async fn mounted_adapter(
    initial: &Value,
    options: AdapterOptions,
) -> (EditorAdapter<FakeSurface>, FakeSurface, Received) {
    let (adapter, received) = recording_adapter(initial, options);
    let surface = FakeSurface::new();
    adapter.mount(surface.clone()).await.unwrap();
    (adapter, surface, received)
}

/// Adapter with a recording callback and no editor mounted.
pub fn recording_adapter(
    initial: &Value,
    options: AdapterOptions,
) -> (EditorAdapter<FakeSurface>, Received) {
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let adapter = EditorAdapter::with_on_change(initial, options, move |doc| {
        sink.lock().push(doc);
    });
    (adapter, received)
}
