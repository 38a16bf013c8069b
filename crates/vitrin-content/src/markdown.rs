//! Section body rendering.
//!
//! Bodies go through two steps: the `{{ whatsapp_link }}` token is replaced
//! with the render context's link, then the text is converted to HTML with
//! `pulldown-cmark`. The output is inserted into the page as trusted markup;
//! the document source is assumed to be trusted.

use std::sync::LazyLock;

use pulldown_cmark::{Options, Parser, html};
use regex::{NoExpand, Regex};
use vitrin_core::RenderContext;

static WHATSAPP_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\{\{\s*whatsapp_link\s*\}\}").expect("whatsapp token pattern is valid")
});

/// Markdown-to-HTML renderer with token expansion.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    convert: bool,
    options: Options,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Create a renderer with GFM-style tables, strikethrough, and task lists.
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        Self {
            convert: true,
            options,
        }
    }

    /// Create a renderer that only expands tokens and passes text through.
    pub fn passthrough() -> Self {
        Self {
            convert: false,
            ..Self::new()
        }
    }

    /// Whether markdown conversion is enabled.
    pub fn converts(&self) -> bool {
        self.convert
    }

    /// Render a section body to an HTML fragment.
    pub fn render(&self, source: &str, context: &RenderContext) -> String {
        if source.is_empty() {
            return String::new();
        }
        let expanded = expand_tokens(source, context);
        if !self.convert {
            return expanded;
        }
        let mut out = String::with_capacity(expanded.len() * 3 / 2);
        html::push_html(&mut out, Parser::new_ext(&expanded, self.options));
        out
    }
}

/// Replace every `{{ whatsapp_link }}` token (case-insensitive, any inner
/// whitespace) with the context's link.
///
/// With an empty link the text is returned unchanged.
pub fn expand_tokens(source: &str, context: &RenderContext) -> String {
    if context.whatsapp_link.is_empty() {
        return source.to_string();
    }
    WHATSAPP_TOKEN
        .replace_all(source, NoExpand(&context.whatsapp_link))
        .into_owned()
}
