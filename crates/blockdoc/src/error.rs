//! Error types.
//!
//! Malformed documents and unknown block kinds are not errors: the
//! normalizer absorbs the former and the renderer skips the latter.

use thiserror::Error;

/// Failure rendering a single block.
///
/// Never escapes [`crate::render`]; the offending block contributes no
/// markup and rendering continues with the next one.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("formatting failed")]
    Format(#[from] std::fmt::Error),

    #[error("heading level {0} outside 1..=6")]
    HeadingLevel(u8),
}

/// Failure reported by the opaque editing surface.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("editor is not available")]
    Unavailable,

    #[error("editor failed to initialize: {0}")]
    Init(String),

    #[error("editor failed to save: {0}")]
    Save(String),

    #[error("editor failed to render: {0}")]
    Render(String),
}

/// Adapter errors.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("adapter has been torn down")]
    TornDown,

    #[error("an editor is already mounted")]
    AlreadyMounted,

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Result type alias using AdapterError.
pub type AdapterResult<T> = Result<T, AdapterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_error_is_transparent_through_adapter_error() {
        let err: AdapterError = SurfaceError::Save("disk full".to_string()).into();
        assert_eq!(err.to_string(), "editor failed to save: disk full");
    }

    #[test]
    fn heading_level_message() {
        assert_eq!(
            RenderError::HeadingLevel(9).to_string(),
            "heading level 9 outside 1..=6"
        );
    }
}
