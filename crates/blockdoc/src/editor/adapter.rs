//! Lifecycle wrapper around an [`EditingSurface`].
//!
//! The adapter owns one editor instance and one pending-notification slot.
//! Every document that crosses the boundary, in either direction, goes
//! through the normalizer.
//!
//! Change notifications are debounced: each edit cancels the pending timer
//! and starts a new one, so a burst of edits produces a single `on_change`
//! carrying the state after the last edit. [`EditorAdapter::save_now`]
//! bypasses the timer. [`EditorAdapter::teardown`] cancels the timer and
//! destroys the editor; no callback fires once it has returned.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::surface::EditingSurface;
use crate::config::{Config, DEFAULT_DEBOUNCE_MS};
use crate::content::{BlockDocument, normalize, safe_html_for};
use crate::error::{AdapterError, AdapterResult};

/// Receives the normalized document after a burst of edits settles.
pub type ChangeCallback = Arc<dyn Fn(BlockDocument) + Send + Sync>;

/// Adapter options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterOptions {
    /// Quiet interval after the last edit before `on_change` fires.
    pub debounce: Duration,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

impl AdapterOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            debounce: config.debounce,
        }
    }
}

/// Debounced, normalizing wrapper around one editor instance.
///
/// Only [`EditorAdapter::teardown`] calls [`EditingSurface::destroy`].
/// Dropping the adapter cancels any pending notification and drops the
/// editor without destroying it, since `destroy` is async.
pub struct EditorAdapter<E: EditingSurface + 'static> {
    inner: Arc<Inner<E>>,
}

struct Inner<E> {
    /// `None` until mounted and again after teardown.
    editor: tokio::sync::Mutex<Option<E>>,
    /// Last canonical document seen in either direction.
    last_known: Mutex<BlockDocument>,
    /// Pending debounce timer, at most one.
    pending: Mutex<Option<JoinHandle<()>>>,
    /// False once torn down. Held for reading while `on_change` runs.
    live: RwLock<bool>,
    on_change: Option<ChangeCallback>,
    debounce: Duration,
}

impl<E: EditingSurface + 'static> EditorAdapter<E> {
    /// Adapter without a change callback.
    pub fn new(initial: &Value, options: AdapterOptions) -> Self {
        Self::build(initial, options, None)
    }

    /// Adapter that reports settled edits to `on_change`.
    ///
    /// `on_change` must not call [`EditorAdapter::teardown`].
    pub fn with_on_change<F>(initial: &Value, options: AdapterOptions, on_change: F) -> Self
    where
        F: Fn(BlockDocument) + Send + Sync + 'static,
    {
        Self::build(initial, options, Some(Arc::new(on_change)))
    }

    fn build(initial: &Value, options: AdapterOptions, on_change: Option<ChangeCallback>) -> Self {
        Self {
            inner: Arc::new(Inner {
                editor: tokio::sync::Mutex::new(None),
                last_known: Mutex::new(normalize(initial)),
                pending: Mutex::new(None),
                live: RwLock::new(true),
                on_change,
                debounce: options.debounce,
            }),
        }
    }

    /// Initialize `editor` with the current document and take ownership of it.
    pub async fn mount(&self, mut editor: E) -> AdapterResult<()> {
        if self.is_torn_down() {
            return Err(AdapterError::TornDown);
        }

        let mut slot = self.inner.editor.lock().await;
        if slot.is_some() {
            return Err(AdapterError::AlreadyMounted);
        }

        let doc = self.current();
        editor.initialize(&doc).await?;

        if self.is_torn_down() {
            editor.destroy().await;
            return Err(AdapterError::TornDown);
        }

        *slot = Some(editor);
        debug!(blocks = doc.blocks.len(), "editor mounted");
        Ok(())
    }

    /// Record an edit. Restarts the quiet interval; the latest pending
    /// notification replaces any earlier one.
    ///
    /// Must be called from within a tokio runtime; outside one the edit is
    /// only picked up by the next [`EditorAdapter::save_now`].
    pub fn notify_change(&self) {
        if self.inner.on_change.is_none() {
            return;
        }

        let Ok(runtime) = Handle::try_current() else {
            warn!("change notification outside a tokio runtime ignored");
            return;
        };

        let mut pending = self.inner.pending.lock();
        if !*self.inner.live.read_recursive() {
            trace!("change after teardown ignored");
            return;
        }
        if let Some(previous) = pending.take() {
            previous.abort();
            trace!("replaced pending change notification");
        }

        let inner = Arc::clone(&self.inner);
        *pending = Some(runtime.spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            inner.deliver_change().await;
        }));
    }

    /// Save the live editor state immediately, bypassing the debounce.
    ///
    /// Without a mounted editor this returns the last known document.
    pub async fn save_now(&self) -> AdapterResult<BlockDocument> {
        let saved = {
            let slot = self.inner.editor.lock().await;
            match slot.as_ref() {
                Some(editor) => editor.save().await?,
                None => {
                    debug!("no editor mounted, returning last known document");
                    return Ok(self.current());
                }
            }
        };

        let doc = normalize(&saved);
        *self.inner.last_known.lock() = doc.clone();
        Ok(doc)
    }

    /// Normalize `input` and load it into the editor.
    ///
    /// Without a mounted editor only the last known document is replaced;
    /// it is what the editor receives when it mounts.
    pub async fn replace_state(&self, input: &Value) -> AdapterResult<()> {
        if self.is_torn_down() {
            return Err(AdapterError::TornDown);
        }

        let doc = normalize(input);
        *self.inner.last_known.lock() = doc.clone();

        let slot = self.inner.editor.lock().await;
        if let Some(editor) = slot.as_ref() {
            editor.render(&doc).await?;
        }
        Ok(())
    }

    /// Save immediately and return the sanitized HTML for preview.
    pub async fn preview_html(&self) -> AdapterResult<String> {
        let doc = self.save_now().await?;
        Ok(safe_html_for(&doc))
    }

    /// Last canonical document seen by the adapter.
    pub fn current(&self) -> BlockDocument {
        self.inner.last_known.lock().clone()
    }

    pub fn is_torn_down(&self) -> bool {
        !*self.inner.live.read_recursive()
    }

    /// Cancel any pending notification and destroy the editor.
    ///
    /// Waits for an `on_change` already in progress to return. Calling this
    /// more than once is a no-op.
    pub async fn teardown(&self) {
        {
            let mut live = self.inner.live.write();
            if !*live {
                return;
            }
            *live = false;
        }

        self.inner.cancel_pending();

        let editor = self.inner.editor.lock().await.take();
        if let Some(mut editor) = editor {
            editor.destroy().await;
            debug!("editor destroyed");
        }
    }
}

impl<E: EditingSurface + 'static> Drop for EditorAdapter<E> {
    fn drop(&mut self) {
        *self.inner.live.write() = false;
        self.inner.cancel_pending();
    }
}

impl<E: EditingSurface> Inner<E> {
    fn cancel_pending(&self) {
        if let Some(pending) = self.pending.lock().take() {
            pending.abort();
            debug!("cancelled pending change notification");
        }
    }

    async fn deliver_change(&self) {
        let saved = {
            let slot = self.editor.lock().await;
            let Some(editor) = slot.as_ref() else {
                debug!("no editor mounted, dropping change notification");
                return;
            };
            editor.save().await
        };

        let doc = match saved {
            Ok(raw) => normalize(&raw),
            Err(e) => {
                warn!(error = %e, "debounced save failed, change not delivered");
                return;
            }
        };

        let live = self.live.read_recursive();
        if !*live {
            return;
        }
        *self.last_known.lock() = doc.clone();
        if let Some(on_change) = &self.on_change {
            on_change(doc);
        }
    }
}
