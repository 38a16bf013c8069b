//! Rendering context over the host page.
//!
//! [`PageContext`] owns the shared document handle and the content root,
//! resolved once. Components get narrow capabilities from it (replace the
//! sections, look up contact targets) instead of querying the document ad
//! hoc.

use std::cell::{Ref, RefMut};
use std::fmt;

use crate::dom::{Document, NodeId, SharedDocument};
use crate::shell::{
    CONTACT_COPY_ATTR, CONTACT_LINK_ATTR, CONTACT_LINKS_ATTR, CONTACT_TEXT_ATTR,
    SECTIONS_ROOT_ATTR,
};

/// Contact channels bound to `data-contact-link` anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkChannel {
    Whatsapp,
    Tel,
    Email,
    Instagram,
}

impl LinkChannel {
    /// Attribute value used by the host page.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Whatsapp => "whatsapp",
            Self::Tel => "tel",
            Self::Email => "email",
            Self::Instagram => "instagram",
        }
    }
}

/// Display slots bound to `data-contact-text` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextSlot {
    PhoneDisplay,
    Email,
    InstagramHandle,
}

impl TextSlot {
    /// Attribute value used by the host page.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PhoneDisplay => "phone-display",
            Self::Email => "email",
            Self::InstagramHandle => "instagram-handle",
        }
    }
}

/// Owner of the page document and its content root.
#[derive(Clone)]
pub struct PageContext {
    doc: SharedDocument,
    sections_root: Option<NodeId>,
}

impl fmt::Debug for PageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageContext")
            .field("sections_root", &self.sections_root)
            .finish_non_exhaustive()
    }
}

impl PageContext {
    /// Wrap a host page, resolving the first `data-sections-root` element.
    pub fn new(doc: SharedDocument) -> Self {
        let sections_root = doc
            .borrow()
            .select_by_attr(SECTIONS_ROOT_ATTR, None)
            .first()
            .copied();
        if sections_root.is_none() {
            log::warn!("host page has no {SECTIONS_ROOT_ATTR} element; sections will not render");
        }
        Self { doc, sections_root }
    }

    /// Shared handle to the document, for subsystems that run later.
    pub fn shared(&self) -> SharedDocument {
        SharedDocument::clone(&self.doc)
    }

    /// Borrow the document.
    pub fn document(&self) -> Ref<'_, Document> {
        self.doc.borrow()
    }

    /// Mutably borrow the document.
    pub fn document_mut(&self) -> RefMut<'_, Document> {
        self.doc.borrow_mut()
    }

    /// The content root, if the host page has one.
    pub fn sections_root(&self) -> Option<NodeId> {
        self.sections_root
    }

    /// Rebuild the content root from scratch.
    ///
    /// `build` creates detached nodes; they are appended in order after the
    /// root is cleared. Returns the appended nodes, or `None` when the page
    /// has no content root.
    pub fn replace_sections<F>(&self, build: F) -> Option<Vec<NodeId>>
    where
        F: FnOnce(&mut Document) -> Vec<NodeId>,
    {
        let root = self.sections_root?;
        let mut doc = self.doc.borrow_mut();
        doc.clear_children(root);
        let nodes = build(&mut doc);
        for &node in &nodes {
            if let Err(e) = doc.append_child(root, node) {
                log::error!("failed to insert section: {e}");
            }
        }
        Some(nodes)
    }

    /// Anchors tagged for a contact channel.
    pub fn link_targets(&self, channel: LinkChannel) -> Vec<NodeId> {
        self.document()
            .select_by_attr(CONTACT_LINK_ATTR, Some(channel.as_str()))
    }

    /// Elements displaying a contact value.
    pub fn text_targets(&self, slot: TextSlot) -> Vec<NodeId> {
        self.document()
            .select_by_attr(CONTACT_TEXT_ATTR, Some(slot.as_str()))
    }

    /// Copy buttons, any field.
    pub fn copy_targets(&self) -> Vec<NodeId> {
        self.document().select_by_attr(CONTACT_COPY_ATTR, None)
    }

    /// Containers for the auxiliary link list.
    pub fn link_containers(&self) -> Vec<NodeId> {
        self.document().select_by_attr(CONTACT_LINKS_ATTR, None)
    }
}
