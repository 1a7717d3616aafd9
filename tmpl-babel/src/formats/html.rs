//! HTML output
//!
//! The rendered template already is the HTML document, so this format mostly passes it
//! through. The `css-path` option appends a user stylesheet at the end of `<head>`,
//! letting a deployment restyle a template without editing it.

use super::{inject_into_head, style_tag, Placement};
use crate::error::FormatError;
use crate::format::{Format, SerializedDocument};
use std::collections::HashMap;
use std::fs;
use tracing::debug;

/// Format implementation for HTML
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlFormat;

impl HtmlFormat {
    pub fn new() -> Self {
        Self
    }

    /// Apply the HTML-level options shared with formats built on top of HTML.
    pub(crate) fn finalize(
        &self,
        html: &str,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        match options.get("css-path").filter(|path| !path.is_empty()) {
            Some(path) => {
                let css = fs::read_to_string(path).map_err(|e| {
                    FormatError::SerializationError(format!(
                        "Failed to read stylesheet '{path}': {e}"
                    ))
                })?;
                debug!(path = %path, "injecting custom stylesheet");
                Ok(inject_into_head(
                    html,
                    &style_tag(&css, "custom"),
                    Placement::HeadEnd,
                ))
            }
            None => Ok(html.to_string()),
        }
    }
}

impl Format for HtmlFormat {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "Rendered HTML document"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn serialize_with_options(
        &self,
        html: &str,
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        self.finalize(html, options).map(SerializedDocument::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DOC: &str = "<html><head><title>Report</title></head><body>Hi</body></html>";

    #[test]
    fn passes_html_through_without_options() {
        let out = HtmlFormat.serialize(DOC).unwrap();
        assert_eq!(out, SerializedDocument::Text(DOC.to_string()));
    }

    #[test]
    fn injects_custom_stylesheet() {
        let dir = tempdir().unwrap();
        let css_path = dir.path().join("brand.css");
        fs::write(&css_path, "body { color: teal; }").unwrap();

        let mut options = HashMap::new();
        options.insert("css-path".to_string(), css_path.display().to_string());

        let SerializedDocument::Text(out) = HtmlFormat.serialize_with_options(DOC, &options).unwrap() else {
            panic!("expected text output");
        };
        assert!(out.contains("<style data-tmpl-custom>\nbody { color: teal; }\n</style></head>"));
    }

    #[test]
    fn missing_stylesheet_is_an_error() {
        let mut options = HashMap::new();
        options.insert("css-path".to_string(), "/definitely/not/here.css".to_string());
        let err = HtmlFormat.serialize_with_options(DOC, &options).unwrap_err();
        assert!(matches!(err, FormatError::SerializationError(_)));
    }
}
