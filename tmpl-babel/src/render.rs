//! Jinja template rendering.
//!
//! Templates are rendered with `minijinja`, which follows Jinja2 semantics closely
//! enough that a template previewed here behaves the same once converted to the Django
//! dialect (see [`crate::dialect`]). Defaults mirror a plain Jinja2 `Template(...)`:
//! undefined variables render as empty and output is not auto-escaped.

use crate::error::RenderError;
use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde::Serialize;
use tracing::debug;

/// Engine knobs exposed through configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Fail on undefined variables instead of rendering them as empty.
    pub strict_undefined: bool,
    /// HTML-escape every interpolated value.
    pub auto_escape: bool,
}

pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl TemplateRenderer {
    pub fn new(options: RenderOptions) -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(if options.strict_undefined {
            UndefinedBehavior::Strict
        } else {
            UndefinedBehavior::Lenient
        });
        let auto_escape = options.auto_escape;
        env.set_auto_escape_callback(move |_name| {
            if auto_escape {
                AutoEscape::Html
            } else {
                AutoEscape::None
            }
        });
        Self { env }
    }

    /// Render template source with the given context.
    pub fn render<C: Serialize>(&self, source: &str, context: C) -> Result<String, RenderError> {
        self.render_named("<template>", source, context)
    }

    /// Like [`TemplateRenderer::render`], with `name` used in error messages.
    pub fn render_named<C: Serialize>(
        &self,
        name: &str,
        source: &str,
        context: C,
    ) -> Result<String, RenderError> {
        let html = self.env.render_named_str(name, source, context)?;
        debug!(template = name, bytes = html.len(), "rendered template");
        Ok(html)
    }
}
