//! Contact and link binding.
//!
//! A pure projection of contact metadata onto host page elements:
//!
//! - `data-contact-link` anchors get their `href` set, or removed when the
//!   value is empty, so nothing stale survives a re-render
//! - `data-contact-text` slots are only overwritten with non-empty values,
//!   keeping the placeholder markup otherwise
//! - `data-contact-copy` buttons get `data-copy` for the phone or email,
//!   removed when that value is absent
//! - `data-contact-links` containers are cleared and rebuilt from
//!   `contact_links`

use vitrin_core::{ContactLink, Metadata, RenderContext, Result};

use crate::context::{LinkChannel, PageContext, TextSlot};
use crate::dom::{Document, NodeId};
use crate::shell::{CONTACT_COPY_ATTR, COPY_VALUE_ATTR};

/// Project contact metadata onto the page.
pub fn bind_contact(page: &PageContext, meta: &Metadata, context: &RenderContext) {
    let contact = &meta.contact;

    assign_href(page, LinkChannel::Whatsapp, &context.whatsapp_link);
    assign_href(page, LinkChannel::Tel, &contact.tel_href());
    assign_href(page, LinkChannel::Email, &contact.mailto_href());
    assign_href(
        page,
        LinkChannel::Instagram,
        contact.instagram.as_deref().unwrap_or_default(),
    );

    set_text(page, TextSlot::PhoneDisplay, contact.display_phone());
    set_text(page, TextSlot::Email, contact.email.as_deref());
    set_text(page, TextSlot::InstagramHandle, contact.display_instagram());

    let copy_targets = page.copy_targets();
    {
        let mut doc = page.document_mut();
        for el in copy_targets {
            let value = match doc.attr(el, CONTACT_COPY_ATTR) {
                Some("phone") => contact.phone.as_deref(),
                Some("email") => contact.email.as_deref(),
                _ => None,
            };
            match value.filter(|v| !v.is_empty()) {
                Some(value) => doc.set_attr(el, COPY_VALUE_ATTR, value),
                None => doc.remove_attr(el, COPY_VALUE_ATTR),
            }
        }
    }

    render_link_lists(page, &meta.contact_links);
}

fn assign_href(page: &PageContext, channel: LinkChannel, value: &str) {
    let targets = page.link_targets(channel);
    let mut doc = page.document_mut();
    for el in targets {
        if value.is_empty() {
            doc.remove_attr(el, "href");
        } else {
            doc.set_attr(el, "href", value);
        }
    }
}

fn set_text(page: &PageContext, slot: TextSlot, value: Option<&str>) {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return;
    };
    let targets = page.text_targets(slot);
    let mut doc = page.document_mut();
    for el in targets {
        doc.set_text_content(el, value);
    }
}

/// Rebuild every link container from scratch.
fn render_link_lists(page: &PageContext, links: &[ContactLink]) {
    let containers = page.link_containers();
    let mut doc = page.document_mut();
    for container in containers {
        doc.clear_children(container);
        for entry in links {
            if let Err(e) = append_link_row(&mut doc, container, entry) {
                log::error!("failed to render contact link row: {e}");
            }
        }
    }
}

fn append_link_row(doc: &mut Document, container: NodeId, entry: &ContactLink) -> Result<()> {
    let row = doc.append_element(container, "div")?;
    doc.set_attr(row, "class", "sub_links_row");

    let tag = doc.append_element(row, "span")?;
    doc.set_attr(tag, "class", "tag");
    doc.set_text_content(tag, entry.tag.as_deref().unwrap_or_default());

    if let Some(url) = entry.url.as_deref() {
        let link = doc.append_element(row, "a")?;
        doc.set_attr(link, "href", url);
        doc.set_attr(link, "target", "_blank");
        doc.set_attr(link, "rel", "noopener");
        doc.set_text_content(link, entry.label.as_deref().unwrap_or(url));
    } else if let Some(label) = entry.label.as_deref() {
        let span = doc.append_element(row, "span")?;
        doc.set_text_content(span, label);
    }
    Ok(())
}
