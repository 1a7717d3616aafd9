//! Shared configuration loader for the tmpl toolchain.
//!
//! `defaults/tmpl.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`TmplConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use tmpl_babel::formats::PageSize;
use tmpl_babel::RenderOptions;

const DEFAULT_TOML: &str = include_str!("../defaults/tmpl.default.toml");

/// Top-level configuration consumed by tmpl applications.
#[derive(Debug, Clone, Deserialize)]
pub struct TmplConfig {
    pub render: RenderConfig,
    pub context: ContextConfig,
    pub convert: ConvertConfig,
    pub output: OutputConfig,
}

/// Mirrors the knobs exposed by the template engine.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    pub strict_undefined: bool,
    pub auto_escape: bool,
}

impl From<&RenderConfig> for RenderOptions {
    fn from(config: &RenderConfig) -> Self {
        RenderOptions {
            strict_undefined: config.strict_undefined,
            auto_escape: config.auto_escape,
        }
    }
}

/// How the JSON context is prepared before rendering.
#[derive(Debug, Clone, Deserialize)]
pub struct ContextConfig {
    pub date_format: String,
    pub date_fields: Vec<String>,
    pub generated_key: String,
}

/// Format-specific conversion knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertConfig {
    pub pdf: PdfConfig,
    #[serde(default)]
    pub html: HtmlConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PdfConfig {
    pub size: PdfPageSize,
    pub keep_html: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PdfPageSize {
    #[serde(rename = "a4")]
    A4,
    #[serde(rename = "letter")]
    Letter,
}

impl From<PdfPageSize> for PageSize {
    fn from(size: PdfPageSize) -> Self {
        match size {
            PdfPageSize::A4 => PageSize::A4,
            PdfPageSize::Letter => PageSize::Letter,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HtmlConfig {
    #[serde(default)]
    pub custom_css: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub clean: bool,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<TmplConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The embedded defaults, verbatim (comments included).
pub fn default_toml() -> &'static str {
    DEFAULT_TOML
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<TmplConfig, ConfigError> {
    Loader::new().build()
}
