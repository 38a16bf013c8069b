//! Arena document model.
//!
//! [`Document`] is a minimal stand-in for the browser DOM: elements, text
//! nodes, and trusted HTML fragments stored in an append-only arena and
//! addressed by [`NodeId`]. Removed nodes stay in the arena, detached, so a
//! stale id never aliases a different node.
//!
//! Ids are only meaningful for the document that created them.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use vitrin_core::{Error, Result};

/// A document shared between the page controller and async image upgrades.
///
/// The page model is single-threaded; every mutation happens synchronously
/// on the thread driving the event loop.
pub type SharedDocument = Rc<RefCell<Document>>;

/// Handle to a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta", "source"];

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(Element),
    Text(String),
    /// Trusted markup inserted verbatim.
    Html(String),
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    style: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An in-memory HTML document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    events: Vec<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            events: Vec::new(),
        }
    }

    /// Wrap this document for shared single-threaded access.
    pub fn into_shared(self) -> SharedDocument {
        Rc::new(RefCell::new(self))
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            style: Vec::new(),
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    ///
    /// # Errors
    ///
    /// Fails if `parent` cannot hold children or if the append would make a
    /// node its own ancestor.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if !matches!(
            self.nodes[parent.0].kind,
            NodeKind::Document | NodeKind::Element(_)
        ) {
            return Err(Error::dom("only elements and the document can have children"));
        }
        if child == self.root() || self.ancestors(parent).any(|a| a == child) || parent == child {
            return Err(Error::dom("append would create a cycle"));
        }
        self.remove(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Create an element and append it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId> {
        let el = self.create_element(tag);
        self.append_child(parent, el)?;
        Ok(el)
    }

    /// Detach a node from its parent. Detached nodes are left untouched.
    pub fn remove(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    /// Detach every child of `node`.
    pub fn clear_children(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    /// Replace the children of `node` with a single text node.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) {
        self.clear_children(node);
        if !text.is_empty() {
            let text = self.create_text(text);
            self.attach(node, text);
        }
    }

    /// Replace the children of `node` with trusted markup.
    pub fn set_inner_html(&mut self, node: NodeId, html: &str) {
        self.clear_children(node);
        if !html.is_empty() {
            let fragment = self.push(NodeKind::Html(html.to_string()));
            self.attach(node, fragment);
        }
    }

    /// Attach a freshly created node; no cycle check needed.
    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Parent of `node`, if attached.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// Children of `node`, in order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), |&n| self.parent(n))
    }

    /// Whether `node` is reachable from the document root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        node == self.root() || self.ancestors(node).any(|a| a == self.root())
    }

    /// Tag name of an element, lowercase.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|el| el.tag.as_str())
    }

    /// All element descendants of `scope` in document order.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if self.element(node).is_some() {
                out.push(node);
            }
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Connected elements carrying attribute `name`, optionally with an
    /// exact `value`, in document order.
    pub fn select_by_attr(&self, name: &str, value: Option<&str>) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|&n| match (self.attr(n, name), value) {
                (Some(actual), Some(expected)) => actual == expected,
                (Some(_), None) => true,
                (None, _) => false,
            })
            .collect()
    }

    /// First direct child element of `node` with the given tag.
    pub fn child_by_tag(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .find(|&c| self.tag(c) == Some(tag))
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        if let NodeKind::Text(text) = &self.nodes[node.0].kind {
            out.push_str(text);
        }
        for &child in self.children(node) {
            self.collect_text(child, out);
        }
    }

    // ------------------------------------------------------------------------
    // Attributes and style
    // ------------------------------------------------------------------------

    fn element(&self, node: NodeId) -> Option<&Element> {
        match &self.nodes[node.0].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Attribute value, if present.
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the attribute is present.
    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    /// Set an attribute, keeping its original position when it exists.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(el) = self.element_mut(node) else {
            return;
        };
        match el.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => el.attrs.push((name.to_string(), value.to_string())),
        }
    }

    /// Remove an attribute if present.
    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(el) = self.element_mut(node) {
            el.attrs.retain(|(k, _)| k != name);
        }
    }

    /// Inline style property, if set.
    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.element(node)?
            .style
            .iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v.as_str())
    }

    /// Set an inline style property.
    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        let Some(el) = self.element_mut(node) else {
            return;
        };
        match el.style.iter_mut().find(|(k, _)| k == property) {
            Some((_, v)) => *v = value.to_string(),
            None => el.style.push((property.to_string(), value.to_string())),
        }
    }

    /// Remove an inline style property.
    pub fn remove_style(&mut self, node: NodeId, property: &str) {
        if let Some(el) = self.element_mut(node) {
            el.style.retain(|(k, _)| k != property);
        }
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    /// Record a custom event dispatched on the document.
    pub fn dispatch_event(&mut self, name: &str) {
        log::debug!("dispatching document event {name}");
        self.events.push(name.to_string());
    }

    /// Events dispatched so far, oldest first.
    pub fn events(&self) -> &[String] {
        &self.events
    }

    // ------------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------------

    /// Serialize the whole document, with a doctype.
    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>\n");
        for &child in self.children(self.root()) {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Serialize a node and its subtree.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    /// Serialize the children of a node.
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(node) {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Document => {
                for &child in self.children(node) {
                    self.write_node(child, out);
                }
            }
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Html(html) => out.push_str(html),
            NodeKind::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attrs {
                    if value.is_empty() {
                        let _ = write!(out, " {name}");
                    } else {
                        let _ = write!(out, " {name}=\"{}\"", escape_attr(value));
                    }
                }
                if !el.style.is_empty() {
                    let style = el
                        .style
                        .iter()
                        .map(|(k, v)| format!("{k}: {v}"))
                        .collect::<Vec<_>>()
                        .join("; ");
                    let _ = write!(out, " style=\"{}\"", escape_attr(&style));
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                    return;
                }
                for &child in self.children(node) {
                    self.write_node(child, out);
                }
                let _ = write!(out, "</{}>", el.tag);
            }
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

// ============================================================================
// Tests
// ============================================================================
