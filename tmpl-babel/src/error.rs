//! Error types for rendering and export operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or preparing the data context.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Failed to read context '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON context: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Context root must be a JSON object, found {0}")]
    NotAnObject(&'static str),
    #[error("Invalid date format '{0}'")]
    InvalidDateFormat(String),
}

/// Errors raised by the template engine.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template error: {0}")]
    Template(String),
}

impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        RenderError::Template(err.to_string())
    }
}

/// Errors that can occur during format operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    /// Error during serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Option or operation the format cannot honor
    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

/// Top-level error for the publishing pipeline.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
