//! Document publishing pipeline.
//!
//! Ties the pieces together: render a template with a context, hand the HTML to an
//! output format, and write the result. Use this for one-call exports ("render this
//! report to PDF"); use [`TemplateRenderer`] and [`FormatRegistry`] directly for more
//! control.

use crate::context::RenderContext;
use crate::error::{FormatError, PublishError};
use crate::format::SerializedDocument;
use crate::registry::FormatRegistry;
use crate::render::{RenderOptions, TemplateRenderer};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Specifies how to publish a template.
///
/// ```ignore
/// let spec = PublishSpec::new(&template, &context, "pdf")
///     .with_output_path("output/report.pdf")
///     .with_option("size", "letter")
///     .keep_html(true);
/// ```
///
/// If no output path is provided, text formats return in-memory content.
/// Binary formats (like PDF) require an explicit output path.
#[derive(Debug)]
pub struct PublishSpec<'a> {
    /// Jinja template source.
    pub template: &'a str,
    /// Name used in template error messages.
    pub template_name: &'a str,
    pub context: &'a RenderContext,
    /// Target format name (e.g., "html", "pdf").
    pub format: &'a str,
    /// Optional file path for writing output. Required for binary formats.
    pub output: Option<PathBuf>,
    /// Format-specific options (e.g., page size, stylesheet).
    pub options: HashMap<String, String>,
    pub render: RenderOptions,
    /// Also write the intermediate HTML next to a non-HTML output.
    pub keep_html: bool,
}

impl<'a> PublishSpec<'a> {
    pub fn new(template: &'a str, context: &'a RenderContext, format: &'a str) -> Self {
        Self {
            template,
            template_name: "<template>",
            context,
            format,
            output: None,
            options: HashMap::new(),
            render: RenderOptions::default(),
            keep_html: false,
        }
    }

    pub fn with_template_name(mut self, name: &'a str) -> Self {
        self.template_name = name;
        self
    }

    /// Sets the output file path. If provided, content is written to disk.
    pub fn with_output_path(mut self, path: impl AsRef<Path>) -> Self {
        self.output = Some(path.as_ref().to_path_buf());
        self
    }

    /// Adds a format-specific option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_options(mut self, options: HashMap<String, String>) -> Self {
        self.options.extend(options);
        self
    }

    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    pub fn keep_html(mut self, keep: bool) -> Self {
        self.keep_html = keep;
        self
    }
}

/// The output from a successful publish operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishArtifact {
    /// Content held in memory (for text formats without an output path).
    InMemory(String),
    /// Path to the written file (when output path was specified).
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishResult {
    pub artifact: PublishArtifact,
    /// Where the intermediate HTML was written, when requested.
    pub html_copy: Option<PathBuf>,
}

/// Renders and publishes a template as described by `spec`.
///
/// # Errors
///
/// Returns [`PublishError`] if rendering fails, the format is unknown or fails,
/// a binary format is requested without an output path, or file I/O fails.
pub fn publish(spec: PublishSpec<'_>) -> Result<PublishResult, PublishError> {
    let registry = FormatRegistry::with_defaults();
    let format = registry.get(spec.format)?;
    if format.is_binary() && spec.output.is_none() {
        return Err(binary_needs_path(spec.format).into());
    }

    let renderer = TemplateRenderer::new(spec.render);
    let html = renderer.render_named(spec.template_name, spec.template, spec.context.as_map())?;

    // Written before serializing so it is available when the export itself fails.
    let html_copy = match (&spec.output, spec.keep_html && format.name() != "html") {
        (Some(output), true) if output.with_extension("html") == *output => {
            warn!(path = %output.display(), "output path doubles as the HTML copy; skipping copy");
            None
        }
        (Some(output), true) => {
            let path = output.with_extension("html");
            write_to_path(&path, html.as_bytes())?;
            info!(path = %path.display(), "saved rendered HTML");
            Some(path)
        }
        _ => None,
    };

    let serialized = format.serialize_with_options(&html, &spec.options)?;
    let artifact = match serialized {
        SerializedDocument::Text(text) => match spec.output {
            Some(path) => {
                write_to_path(&path, text.as_bytes())?;
                PublishArtifact::File(path)
            }
            None => PublishArtifact::InMemory(text),
        },
        SerializedDocument::Binary(bytes) => {
            let path = spec.output.ok_or_else(|| binary_needs_path(spec.format))?;
            write_to_path(&path, &bytes)?;
            PublishArtifact::File(path)
        }
    };

    if let PublishArtifact::File(path) = &artifact {
        info!(path = %path.display(), format = spec.format, "published document");
    }
    Ok(PublishResult {
        artifact,
        html_copy,
    })
}

fn binary_needs_path(format: &str) -> FormatError {
    FormatError::NotSupported(format!(
        "format '{format}' produces binary output and requires an explicit output path"
    ))
}

fn write_to_path(path: &Path, bytes: &[u8]) -> Result<(), PublishError> {
    fs::write(path, bytes).map_err(|source| PublishError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Outcome of [`prepare_output_dir`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CleanReport {
    pub removed: Vec<PathBuf>,
    /// Entries that could not be removed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

/// Make sure `dir` exists. With `clean`, also delete the files already in it.
///
/// Cleaning is best effort: a file that cannot be removed is reported and the rest are
/// still processed. Subdirectories are left alone.
pub fn prepare_output_dir(dir: impl AsRef<Path>, clean: bool) -> Result<CleanReport, PublishError> {
    let dir = dir.as_ref();
    let io_err = |source: std::io::Error| PublishError::Write {
        path: dir.to_path_buf(),
        source,
    };
    fs::create_dir_all(dir).map_err(io_err)?;

    let mut report = CleanReport::default();
    if !clean {
        return Ok(report);
    }

    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
            debug!(path = %path.display(), "skipping directory");
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => report.removed.push(path),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to remove output file");
                report.failed.push((path, err.to_string()));
            }
        }
    }
    report.removed.sort();
    Ok(report)
}
