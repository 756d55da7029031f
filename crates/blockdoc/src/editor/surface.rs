//! Editing surface capability.
//!
//! The interactive block editor is an external component. The adapter only
//! relies on this trait; concrete editors implement it over whatever host
//! bridge they use.

use async_trait::async_trait;
use serde_json::Value;

use crate::content::BlockDocument;
use crate::error::SurfaceError;

/// Interactive block editor.
#[async_trait]
pub trait EditingSurface: Send + Sync {
    /// Mount the editor with its first document.
    async fn initialize(&mut self, doc: &BlockDocument) -> Result<(), SurfaceError>;

    /// Serialize the live editor state.
    ///
    /// The result is in the editor's own shape and is untrusted; the adapter
    /// normalizes it.
    async fn save(&self) -> Result<Value, SurfaceError>;

    /// Replace the editor content.
    async fn render(&self, doc: &BlockDocument) -> Result<(), SurfaceError>;

    /// Release the editor. It must not emit changes afterwards.
    async fn destroy(&mut self);
}
