//! Default host page.
//!
//! The landing renderer never creates the page chrome itself; it binds into
//! elements the host page already carries. [`landing_shell`] builds that
//! host page with the full attribute contract so the renderer can run
//! outside a browser.

use vitrin_core::Result;

use crate::dom::{Document, NodeId};

/// Marks the element whose children are replaced by rendered sections.
pub const SECTIONS_ROOT_ATTR: &str = "data-sections-root";
/// Marks anchors that receive a contact `href`.
pub const CONTACT_LINK_ATTR: &str = "data-contact-link";
/// Marks elements whose text shows a contact value.
pub const CONTACT_TEXT_ATTR: &str = "data-contact-text";
/// Marks copy buttons; the value names the copied field.
pub const CONTACT_COPY_ATTR: &str = "data-contact-copy";
/// Attribute that receives the value a copy button copies.
pub const COPY_VALUE_ATTR: &str = "data-copy";
/// Marks containers that hold the auxiliary link list.
pub const CONTACT_LINKS_ATTR: &str = "data-contact-links";

/// Build the default landing host page.
pub fn landing_shell(title: &str) -> Result<Document> {
    let mut doc = Document::new();
    let root = doc.root();

    let html = doc.append_element(root, "html")?;
    doc.set_attr(html, "lang", "tr");

    let head = doc.append_element(html, "head")?;
    let charset = doc.append_element(head, "meta")?;
    doc.set_attr(charset, "charset", "utf-8");
    let viewport = doc.append_element(head, "meta")?;
    doc.set_attr(viewport, "name", "viewport");
    doc.set_attr(viewport, "content", "width=device-width, initial-scale=1");
    let title_el = doc.append_element(head, "title")?;
    doc.set_text_content(title_el, title);

    let body = doc.append_element(html, "body")?;

    let header = doc.append_element(body, "header")?;
    doc.set_attr(header, "class", "topbar");
    contact_anchor(&mut doc, header, "whatsapp", None, "WhatsApp")?;
    contact_anchor(&mut doc, header, "tel", Some("phone-display"), "+90 --- --- -- --")?;
    contact_anchor(&mut doc, header, "email", Some("email"), "e-posta")?;
    contact_anchor(
        &mut doc,
        header,
        "instagram",
        Some("instagram-handle"),
        "@instagram",
    )?;
    copy_button(&mut doc, header, "phone")?;
    copy_button(&mut doc, header, "email")?;

    let main = doc.append_element(body, "main")?;
    doc.set_attr(main, SECTIONS_ROOT_ATTR, "");

    let footer = doc.append_element(body, "footer")?;
    let links = doc.append_element(footer, "div")?;
    doc.set_attr(links, "class", "sub_links");
    doc.set_attr(links, CONTACT_LINKS_ATTR, "");

    Ok(doc)
}

fn contact_anchor(
    doc: &mut Document,
    parent: NodeId,
    channel: &str,
    text_slot: Option<&str>,
    placeholder: &str,
) -> Result<()> {
    let anchor = doc.append_element(parent, "a")?;
    doc.set_attr(anchor, CONTACT_LINK_ATTR, channel);
    match text_slot {
        Some(slot) => {
            let span = doc.append_element(anchor, "span")?;
            doc.set_attr(span, CONTACT_TEXT_ATTR, slot);
            doc.set_text_content(span, placeholder);
        }
        None => doc.set_text_content(anchor, placeholder),
    }
    Ok(())
}

fn copy_button(doc: &mut Document, parent: NodeId, field: &str) -> Result<()> {
    let button = doc.append_element(parent, "button")?;
    doc.set_attr(button, "type", "button");
    doc.set_attr(button, CONTACT_COPY_ATTR, field);
    doc.set_text_content(button, "Kopyala");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_carries_attribute_contract() {
        let doc = landing_shell("Vitrin").unwrap();
        assert_eq!(doc.select_by_attr(SECTIONS_ROOT_ATTR, None).len(), 1);
        assert_eq!(doc.select_by_attr(CONTACT_LINKS_ATTR, None).len(), 1);
        for channel in ["whatsapp", "tel", "email", "instagram"] {
            assert_eq!(
                doc.select_by_attr(CONTACT_LINK_ATTR, Some(channel)).len(),
                1,
                "missing {channel} anchor"
            );
        }
        for slot in ["phone-display", "email", "instagram-handle"] {
            assert_eq!(doc.select_by_attr(CONTACT_TEXT_ATTR, Some(slot)).len(), 1);
        }
        assert_eq!(doc.select_by_attr(CONTACT_COPY_ATTR, None).len(), 2);
    }

    #[test]
    fn test_shell_serializes() {
        let html = landing_shell("Vitrin").unwrap().to_html();
        assert!(html.contains("<title>Vitrin</title>"));
        assert!(html.contains("<main data-sections-root></main>"));
        assert!(html.contains("<meta charset=\"utf-8\">"));
    }
}
