//! Section building.
//!
//! Each metadata section becomes:
//!
//! ```html
//! <section class="view" id="...">
//!   <figure>
//!     <picture [data-progressive data-large-light=".." data-large-dark=".."]>
//!       <source media="(prefers-color-scheme: dark)" srcset="..">
//!       <img src=".." alt="..">
//!     </picture>
//!   </figure>
//!   <div class="section-body">...rendered markdown...</div>
//! </section>
//! ```
//!
//! The content root is rebuilt wholesale on every render.

use vitrin_content::MarkdownRenderer;
use vitrin_core::traits::DEFAULT_EMPTY_MESSAGE;
use vitrin_core::{Figure, RenderContext, Result, Section};

use crate::context::PageContext;
use crate::dom::{Document, NodeId};

/// Marks a `<picture>` eligible for progressive upgrade.
pub const PROGRESSIVE_ATTR: &str = "data-progressive";
/// High-resolution light-scheme URL, not loaded until upgrade.
pub const LARGE_LIGHT_ATTR: &str = "data-large-light";
/// High-resolution dark-scheme URL, not loaded until upgrade.
pub const LARGE_DARK_ATTR: &str = "data-large-dark";
/// Media query on the dark-scheme `<source>`.
pub const DARK_MEDIA: &str = "(prefers-color-scheme: dark)";

/// Builds section subtrees into the content root.
#[derive(Debug, Clone)]
pub struct SectionBuilder {
    renderer: MarkdownRenderer,
    empty_message: String,
}

impl Default for SectionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionBuilder {
    /// Create a builder with the default renderer and "no content" message.
    pub fn new() -> Self {
        Self {
            renderer: MarkdownRenderer::new(),
            empty_message: DEFAULT_EMPTY_MESSAGE.to_string(),
        }
    }

    /// Use a different markdown renderer.
    pub fn with_renderer(mut self, renderer: MarkdownRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Set the message shown when there are no sections.
    pub fn with_empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    /// Replace the content root with the given sections.
    ///
    /// With no sections a single fallback section carrying the "no content"
    /// message is rendered instead. Returns the inserted section elements;
    /// empty when the page has no content root.
    pub fn render(
        &self,
        page: &PageContext,
        sections: &[Section],
        context: &RenderContext,
    ) -> Vec<NodeId> {
        let inserted = page.replace_sections(|doc| {
            if sections.is_empty() {
                return message_section(doc, &self.empty_message)
                    .map(|el| vec![el])
                    .unwrap_or_default();
            }
            sections
                .iter()
                .enumerate()
                .filter_map(|(index, section)| {
                    self.build_section(doc, section, index, context)
                        .map_err(|e| log::error!("failed to build section {}: {e}", index + 1))
                        .ok()
                })
                .collect()
        });
        let inserted = inserted.unwrap_or_default();
        log::debug!("rendered {} section(s)", inserted.len());
        inserted
    }

    /// Build one detached `<section>` element.
    ///
    /// `index` is zero-based; the generated id is `section_<index + 1>`.
    pub fn build_section(
        &self,
        doc: &mut Document,
        section: &Section,
        index: usize,
        context: &RenderContext,
    ) -> Result<NodeId> {
        let el = doc.create_element("section");
        doc.set_attr(el, "class", "view");
        let id = section
            .id
            .clone()
            .unwrap_or_else(|| format!("section_{}", index + 1));
        doc.set_attr(el, "id", &id);

        if let Some(figure) = &section.figure {
            let figure_el = build_figure(doc, figure)?;
            doc.append_child(el, figure_el)?;
        }

        if let Some(body) = &section.body {
            let body_el = doc.append_element(el, "div")?;
            doc.set_attr(body_el, "class", "section-body");
            doc.set_inner_html(body_el, &self.renderer.render(body, context));
        }

        Ok(el)
    }
}

/// Build a detached `<figure>` with a responsive `<picture>`.
///
/// When a low-resolution variant exists the picture shows it and carries
/// the final URL in an inert `data-large-*` attribute for the upgrader.
pub fn build_figure(doc: &mut Document, figure: &Figure) -> Result<NodeId> {
    let figure_el = doc.create_element("figure");
    let picture = doc.append_element(figure_el, "picture")?;
    let progressive = figure.is_progressive();
    if progressive {
        doc.set_attr(picture, PROGRESSIVE_ATTR, "");
    }

    let dark = figure.dark.as_deref();
    let initial_dark = match (progressive, figure.small_dark.as_deref()) {
        (true, Some(small)) => Some(small),
        _ => dark,
    };
    if let Some(srcset) = initial_dark {
        let source = doc.append_element(picture, "source")?;
        doc.set_attr(source, "media", DARK_MEDIA);
        doc.set_attr(source, "srcset", srcset);
    }

    let base = figure.base_url();
    let initial_light = match (progressive, figure.small_light.as_deref()) {
        (true, Some(small)) => small,
        _ => base,
    };
    let img = doc.append_element(picture, "img")?;
    doc.set_attr(img, "src", initial_light);
    doc.set_attr(img, "alt", figure.alt.as_deref().unwrap_or_default());

    if progressive {
        if figure.small_light.is_some() && !base.is_empty() {
            doc.set_attr(picture, LARGE_LIGHT_ATTR, base);
        }
        if let (Some(_), Some(dark)) = (figure.small_dark.as_deref(), dark) {
            doc.set_attr(picture, LARGE_DARK_ATTR, dark);
        }
    }

    Ok(figure_el)
}

/// Build a detached section holding a single plain-text message.
pub fn message_section(doc: &mut Document, message: &str) -> Result<NodeId> {
    let el = doc.create_element("section");
    doc.set_attr(el, "class", "view");
    let body = doc.append_element(el, "div")?;
    doc.set_attr(body, "class", "section-body");
    doc.set_text_content(body, message);
    Ok(el)
}

/// Replace the content root with a single message section.
pub fn show_message(page: &PageContext, message: &str) -> bool {
    page.replace_sections(|doc| {
        message_section(doc, message)
            .map(|el| vec![el])
            .unwrap_or_default()
    })
    .is_some()
}

// ============================================================================
// Tests
// ============================================================================
