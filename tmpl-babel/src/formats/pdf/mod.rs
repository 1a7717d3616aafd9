//! PDF export built on top of the HTML format + headless Chrome.
//!
//! The rendered template is finalized by [`HtmlFormat`], page-size CSS is injected at
//! the top of `<head>` (so a template's own `@page` rules still win), and a
//! Chrome/Chromium binary running in headless mode prints the page to PDF.
//!
//! Options:
//! - `size`: `a4` (default) or `letter`
//! - `base-dir`: directory relative asset URLs resolve against; the HTML is printed
//!   from a temporary file, so without it relative `<img>`/`<link>` paths break
//! - `css-path`: see [`HtmlFormat`]

use super::{inject_into_head, style_tag, HtmlFormat, Placement};
use crate::error::FormatError;
use crate::format::{Format, SerializedDocument};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;
use tracing::{debug, info};
use url::Url;
use which::which;

/// Format implementation that shells out to Chrome/Chromium to generate PDFs.
#[derive(Default)]
pub struct PdfFormat {
    html: HtmlFormat,
}

impl PdfFormat {
    pub fn new() -> Self {
        Self {
            html: HtmlFormat::new(),
        }
    }
}

impl Format for PdfFormat {
    fn name(&self) -> &str {
        "pdf"
    }

    fn description(&self) -> &str {
        "PDF export via headless Chrome"
    }

    fn file_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn is_binary(&self) -> bool {
        true
    }

    fn serialize_with_options(
        &self,
        html: &str,
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        let size = PageSize::from_options(options)?;
        let mut final_html = self.html.finalize(html, options)?;
        final_html = inject_into_head(
            &final_html,
            &style_tag(size.print_css(), "pdf"),
            Placement::HeadStart,
        );
        if let Some(dir) = options.get("base-dir").filter(|dir| !dir.is_empty()) {
            final_html = inject_into_head(&final_html, &base_tag(Path::new(dir))?, Placement::HeadStart);
        }
        let pdf_bytes = render_html_to_pdf(&final_html, size)?;
        Ok(SerializedDocument::Binary(pdf_bytes))
    }
}

/// Paper sizes understood by the `size` option.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "a4" => Some(PageSize::A4),
            "letter" => Some(PageSize::Letter),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PageSize::A4 => "a4",
            PageSize::Letter => "letter",
        }
    }

    fn from_options(options: &HashMap<String, String>) -> Result<Self, FormatError> {
        match options.get("size") {
            None => Ok(PageSize::default()),
            Some(value) => Self::parse(value).ok_or_else(|| {
                FormatError::SerializationError(format!(
                    "Invalid page size '{value}' (expected 'a4' or 'letter')"
                ))
            }),
        }
    }

    fn print_css(&self) -> &'static str {
        match self {
            PageSize::A4 => "@page { size: A4; margin: 15mm; }\nbody { margin: 0; }",
            PageSize::Letter => "@page { size: letter; margin: 0.6in; }\nbody { margin: 0; }",
        }
    }

    fn viewport(&self) -> (u32, u32) {
        match self {
            PageSize::A4 => (1240, 1754),
            PageSize::Letter => (1275, 1650),
        }
    }
}

fn base_tag(dir: &Path) -> Result<String, FormatError> {
    let absolute = dir.canonicalize().map_err(|e| {
        FormatError::SerializationError(format!(
            "Invalid base directory '{}': {e}",
            dir.display()
        ))
    })?;
    let url = Url::from_directory_path(&absolute).map_err(|_| {
        FormatError::SerializationError(format!(
            "Failed to construct file:// URL for '{}'",
            absolute.display()
        ))
    })?;
    Ok(format!("<base href=\"{url}\">"))
}

fn render_html_to_pdf(html: &str, size: PageSize) -> Result<Vec<u8>, FormatError> {
    let chrome = resolve_chrome_binary()?;
    let temp_dir =
        tempdir().map_err(|e| FormatError::SerializationError(format!("Temp dir error: {e}")))?;
    let html_path = temp_dir.path().join("tmpl-export.html");
    let mut html_file =
        fs::File::create(&html_path).map_err(|e| FormatError::SerializationError(e.to_string()))?;
    html_file
        .write_all(html.as_bytes())
        .map_err(|e| FormatError::SerializationError(e.to_string()))?;

    let pdf_path = temp_dir.path().join("tmpl-export.pdf");
    let file_url = Url::from_file_path(&html_path).map_err(|_| {
        FormatError::SerializationError(
            "Failed to construct file:// URL for HTML input".to_string(),
        )
    })?;

    let pdf_arg = format!("--print-to-pdf={}", pdf_path.display());
    let window_arg = {
        let (w, h) = size.viewport();
        format!("--window-size={w},{h}")
    };

    info!(chrome = %chrome.display(), size = size.as_str(), "printing PDF");
    let output = Command::new(&chrome)
        .arg("--headless")
        .arg("--disable-gpu")
        .arg("--no-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--no-pdf-header-footer")
        .arg("--print-to-pdf-no-header")
        .arg(pdf_arg)
        .arg(window_arg)
        .arg(file_url.as_str())
        .output()
        .map_err(|e| {
            FormatError::SerializationError(format!(
                "Failed to launch Chrome ({}): {}",
                chrome.display(),
                e
            ))
        })?;

    if !output.status.success() {
        debug!(stderr = %String::from_utf8_lossy(&output.stderr), "chrome failed");
        return Err(FormatError::SerializationError(format!(
            "Chrome exited with status {}",
            output.status
        )));
    }

    fs::read(&pdf_path).map_err(|e| {
        FormatError::SerializationError(format!("Chrome produced no PDF: {e}"))
    })
}

fn resolve_chrome_binary() -> Result<PathBuf, FormatError> {
    for var in ["TMPL_CHROME_BIN", "GOOGLE_CHROME_BIN", "CHROME_BIN"] {
        if let Some(path) = env::var_os(var) {
            if !path.is_empty() {
                debug!(var, "using browser from environment");
                return Ok(PathBuf::from(path));
            }
        }
    }

    for candidate in [
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
        "chrome",
        "msedge",
    ] {
        if let Ok(path) = which(candidate) {
            return Ok(path);
        }
    }

    let known: &[&str] = if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ]
    } else if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium-browser",
            "/usr/bin/chromium",
        ]
    };
    if let Some(path) = known.iter().map(PathBuf::from).find(|path| path.exists()) {
        return Ok(path);
    }

    Err(FormatError::SerializationError(
        "Unable to locate a Chrome/Chromium binary. Set TMPL_CHROME_BIN to override the detection."
            .to_string(),
    ))
}
