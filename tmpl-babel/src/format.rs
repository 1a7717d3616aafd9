//! Format trait definition
//!
//! This module defines the Format trait that all output formats implement. A format
//! receives the rendered HTML of a template and turns it into the bytes that end up on
//! disk (or on stdout for text formats).

use crate::error::FormatError;
use std::collections::HashMap;

/// Serialized output produced by a [`Format`] implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializedDocument {
    /// UTF-8 text output (e.g., HTML)
    Text(String),
    /// Binary output (e.g., PDF)
    Binary(Vec<u8>),
}

impl SerializedDocument {
    /// Consume the serialized output and return the underlying bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            SerializedDocument::Text(text) => text.into_bytes(),
            SerializedDocument::Binary(bytes) => bytes,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, SerializedDocument::Binary(_))
    }
}

/// Trait for output formats
///
/// # Examples
///
/// ```ignore
/// struct Plain;
///
/// impl Format for Plain {
///     fn name(&self) -> &str {
///         "plain"
///     }
///
///     fn serialize_with_options(
///         &self,
///         html: &str,
///         _options: &HashMap<String, String>,
///     ) -> Result<SerializedDocument, FormatError> {
///         Ok(SerializedDocument::Text(strip_tags(html)))
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// The name of this format (e.g., "html", "pdf")
    fn name(&self) -> &str;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }

    /// File extensions associated with this format, without the leading dot.
    ///
    /// Used to pick a format from the output filename.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// Whether this format produces [`SerializedDocument::Binary`] output, which needs a
    /// file to land in.
    fn is_binary(&self) -> bool {
        false
    }

    /// Serialize rendered HTML, honoring format-specific options.
    ///
    /// Unknown option keys are ignored; malformed values for known keys are errors.
    fn serialize_with_options(
        &self,
        html: &str,
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError>;

    /// Serialize with no extra options.
    fn serialize(&self, html: &str) -> Result<SerializedDocument, FormatError> {
        self.serialize_with_options(html, &HashMap::new())
    }
}
