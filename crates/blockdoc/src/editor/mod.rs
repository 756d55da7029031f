//! Editing surface integration.
//!
//! - EditingSurface: capability trait implemented over a concrete block editor
//! - EditorAdapter: mount/save/replace/teardown lifecycle with debounced change notifications

mod adapter;
mod surface;

pub use adapter::{AdapterOptions, ChangeCallback, EditorAdapter};
pub use surface::EditingSurface;
