//! Output formats
//!
//! Each format takes the rendered HTML of a template and produces the final document.

pub mod html;
#[cfg(feature = "native-export")]
pub mod pdf;

pub use html::HtmlFormat;
#[cfg(feature = "native-export")]
pub use pdf::{PageSize, PdfFormat};

/// Where an injected `<style>` block goes inside `<head>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// Right after the opening tag, so the template's own rules win.
    HeadStart,
    /// Right before `</head>`, so the injected rules win.
    HeadEnd,
}

/// Insert `markup` into the document head. Documents without a head get it prepended.
pub(crate) fn inject_into_head(html: &str, markup: &str, placement: Placement) -> String {
    // ASCII lowercasing keeps byte offsets aligned with the input.
    let lowered = html.to_ascii_lowercase();
    let idx = match placement {
        Placement::HeadStart => find_head_open(&lowered),
        Placement::HeadEnd => lowered.find("</head>"),
    };

    match idx {
        Some(idx) => {
            let mut output = String::with_capacity(html.len() + markup.len());
            output.push_str(&html[..idx]);
            output.push_str(markup);
            output.push_str(&html[idx..]);
            output
        }
        None => format!("{markup}{html}"),
    }
}

pub(crate) fn style_tag(css: &str, marker: &str) -> String {
    format!("<style data-tmpl-{marker}>\n{css}\n</style>")
}

/// Byte offset just past the `<head ...>` opening tag.
fn find_head_open(lowered: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(pos) = lowered[from..].find("<head") {
        let start = from + pos;
        let after = start + "<head".len();
        // Skip <header> and friends.
        match lowered.as_bytes().get(after) {
            Some(b'>') => return Some(after + 1),
            Some(c) if c.is_ascii_whitespace() => {
                return lowered[after..].find('>').map(|end| after + end + 1);
            }
            _ => from = after,
        }
    }
    None
}
