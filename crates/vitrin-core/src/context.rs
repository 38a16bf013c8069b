//! Per-render context.
//!
//! A [`RenderContext`] is derived once per render pass from the document
//! metadata and borrowed by every body-rendering call. It is discarded when
//! the pass ends.

use crate::model::Contact;

/// Values resolved once per render and shared by all section bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    /// Resolved WhatsApp deep link; empty when no phone is configured.
    pub whatsapp_link: String,
}

impl RenderContext {
    /// Derive the context from contact metadata.
    pub fn from_contact(contact: &Contact) -> Self {
        Self {
            whatsapp_link: contact.whatsapp_link(),
        }
    }

    /// Create a context with an explicit WhatsApp link.
    pub fn with_whatsapp_link(link: impl Into<String>) -> Self {
        Self {
            whatsapp_link: link.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_contact_resolves_whatsapp_link() {
        let contact = Contact {
            phone: Some("+90 532 000 00 00".into()),
            whatsapp_message: Some("Merhaba".into()),
            ..Default::default()
        };
        let ctx = RenderContext::from_contact(&contact);
        assert_eq!(ctx.whatsapp_link, "https://wa.me/905320000000?text=Merhaba");
    }

    #[test]
    fn test_from_empty_contact() {
        let ctx = RenderContext::from_contact(&Contact::default());
        assert!(ctx.whatsapp_link.is_empty());
    }
}
