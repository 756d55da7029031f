//! Block document pipeline.
//!
//! Normalizes untrusted Editor.js-style documents into a canonical block
//! model, renders them to HTML, sanitizes the result for display, and wraps
//! an interactive block editor behind a debounced adapter.

pub mod config;
pub mod content;
pub mod editor;
pub mod error;

pub use config::Config;
pub use content::{
    Block, BlockDocument, BlockKind, HtmlSanitizer, normalize, normalize_str, render,
    safe_html, safe_html_for, safe_html_from_str, sanitize_html,
};
pub use editor::{AdapterOptions, ChangeCallback, EditingSurface, EditorAdapter};
pub use error::{AdapterError, AdapterResult, RenderError, SurfaceError};
