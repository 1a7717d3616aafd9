//! Format registry for format discovery and selection
//!
//! Formats are registered by name and can be looked up either directly or from the
//! extension of an output filename.

use crate::error::FormatError;
use crate::format::{Format, SerializedDocument};
use std::collections::HashMap;
use std::path::Path;

/// Registry of output formats
///
/// # Examples
///
/// ```ignore
/// let registry = FormatRegistry::default();
/// let name = registry.detect_format_from_filename("report.pdf").unwrap();
/// let doc = registry.serialize_with_options(&html, &name, &options)?;
/// ```
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Register a format, replacing any existing format with the same name.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    /// Get a format by name
    pub fn get(&self, name: &str) -> Result<&dyn Format, FormatError> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| FormatError::FormatNotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// List all available format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    /// Detect format from filename based on file extension (case-insensitive).
    pub fn detect_format_from_filename(&self, filename: impl AsRef<Path>) -> Option<String> {
        let extension = filename
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase();

        self.formats
            .values()
            .find(|format| format.file_extensions().contains(&extension.as_str()))
            .map(|format| format.name().to_string())
    }

    /// Serialize rendered HTML using the named format and options
    pub fn serialize_with_options(
        &self,
        html: &str,
        format: &str,
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        self.get(format)?.serialize_with_options(html, options)
    }

    /// Create a registry with default formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(crate::formats::HtmlFormat::new());
        #[cfg(feature = "native-export")]
        registry.register(crate::formats::PdfFormat::new());

        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
