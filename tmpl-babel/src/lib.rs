//! Template rendering and export for HTML report templates
//!
//!     This crate turns a Jinja HTML template plus a JSON data context into a finished
//!     document (HTML or PDF), and converts templates to the Django dialect so a template
//!     previewed standalone can be dropped back into a Django project.
//!
//!     This is a pure lib: it powers tmpl-cli but makes no assumptions about a shell, so
//!     nothing here prints, exits or reads environment configuration beyond locating a
//!     browser for PDF export.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── dialect.rs              # Jinja → Django rewrite rules
//!     ├── context.rs              # JSON context loading and date preparation
//!     ├── render.rs               # Jinja rendering (minijinja)
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── formats
//!     │   ├── html.rs
//!     │   └── pdf                 # headless Chrome export
//!     ├── publish.rs              # render → serialize → write
//!     └── lib.rs
//!
//! Pipeline
//!
//!     RenderContext ──┐
//!                     ├─ TemplateRenderer ── HTML ── Format ── SerializedDocument
//!     template text ──┘
//!
//!     The dialect converter sits outside this pipeline: it is a text-to-text utility run
//!     on template sources, never on rendered output.
//!
//! Library Choices
//!
//!     Rendering uses minijinja since it tracks Jinja2 semantics (loop variables, filter
//!     call syntax, lenient undefined values). PDF export shells out to Chrome rather than
//!     laying out pages itself; browsers are the only engines that handle the CSS report
//!     templates are written with.

pub mod context;
pub mod dialect;
pub mod error;
pub mod format;
pub mod formats;
pub mod publish;
pub mod registry;
pub mod render;

pub use context::RenderContext;
pub use dialect::{convert, convert_with_report, ConversionReport, Rule};
pub use error::{ContextError, FormatError, PublishError, RenderError};
pub use format::{Format, SerializedDocument};
pub use publish::{prepare_output_dir, publish, PublishArtifact, PublishResult, PublishSpec};
pub use registry::FormatRegistry;
pub use render::{RenderOptions, TemplateRenderer};
