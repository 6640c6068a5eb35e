// src/dom.rs
//
// Arena-backed document tree.
//
// - Nodes live in one `Vec`, addressed by `NodeId`. Node 0 is always the
//   document root.
// - Children are ordered id lists; `parent` is a back-index only used for
//   upward queries, so there are no ownership cycles.
// - `parse` runs html5ever into an `RcDom` and flattens it into the arena.

use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::io::Cursor;
use tracing::debug;

use crate::error::{Error, Result};

/// Index of a node inside a [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Doctype { name: String },
    Element { name: String, attrs: Vec<Attribute> },
    Text(String),
    Comment(String),
    /// Never rendered.
    ProcessingInstruction,
}

#[derive(Clone, Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document holding only the root node.
    pub fn new() -> Self {
        Document {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of arena slots, detached nodes included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Tag name if `id` is an element.
    pub fn element_name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Mutable text content if `id` is a text node.
    pub fn text_mut(&mut self, id: NodeId) -> Option<&mut String> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Append a new node as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn append_element(&mut self, parent: NodeId, name: &str, attrs: Vec<Attribute>) -> NodeId {
        self.append(
            parent,
            NodeKind::Element {
                name: name.to_string(),
                attrs,
            },
        )
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.append(parent, NodeKind::Text(text.to_string()))
    }

    /// Unlink `id` from its parent. The node stays in the arena but is no
    /// longer reachable from the root.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    /// Pre-order walk over `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![id],
        }
    }
}

pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}

/* =============================== Parsing ================================= */

/// Parse raw HTML bytes into an arena [`Document`].
pub fn parse(raw: &[u8]) -> Result<Document> {
    let dom = parse_document(RcDom::default(), ParseOpts::default())
        .from_utf8()
        .read_from(&mut Cursor::new(raw))
        .map_err(Error::Parse)?;

    let mut doc = Document::new();
    let root = doc.root();
    let mut stack: Vec<(Handle, NodeId)> = Vec::new();
    push_children(&dom.document, root, &mut stack);

    while let Some((handle, parent)) = stack.pop() {
        let Some(kind) = convert(&handle) else {
            continue;
        };
        let id = doc.append(parent, kind);
        push_children(&handle, id, &mut stack);
    }

    debug!(nodes = doc.node_count(), "parsed html document");
    Ok(doc)
}

/// Queue the children of `handle` (and `<template>` contents) under `parent`,
/// reversed so they pop off the stack in document order.
fn push_children(handle: &Handle, parent: NodeId, stack: &mut Vec<(Handle, NodeId)>) {
    let mut kids: Vec<Handle> = handle.children.borrow().iter().cloned().collect();
    if let NodeData::Element {
        template_contents, ..
    } = &handle.data
    {
        if let Some(contents) = template_contents.borrow().as_ref() {
            kids.extend(contents.children.borrow().iter().cloned());
        }
    }
    stack.extend(kids.into_iter().rev().map(|h| (h, parent)));
}

fn convert(handle: &Handle) -> Option<NodeKind> {
    let kind = match &handle.data {
        NodeData::Document => return None,
        NodeData::Doctype { name, .. } => NodeKind::Doctype {
            name: name.to_string(),
        },
        NodeData::Text { contents } => NodeKind::Text(contents.borrow().to_string()),
        NodeData::Comment { contents } => NodeKind::Comment(contents.to_string()),
        NodeData::Element { name, attrs, .. } => NodeKind::Element {
            name: name.local.to_string(),
            attrs: attrs
                .borrow()
                .iter()
                .map(|a| {
                    let name = match &a.name.prefix {
                        Some(prefix) => format!("{}:{}", prefix, a.name.local),
                        None => a.name.local.to_string(),
                    };
                    Attribute::new(name, a.value.to_string())
                })
                .collect(),
        },
        NodeData::ProcessingInstruction { .. } => NodeKind::ProcessingInstruction,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_element(doc: &Document, name: &str) -> Option<NodeId> {
        doc.descendants(doc.root())
            .find(|&id| doc.element_name(id) == Some(name))
    }

    #[test]
    fn parse_builds_html_head_body_skeleton() {
        let doc = parse(b"<p>Hi</p>").expect("parse");
        let html = doc.children(doc.root())[0];
        assert_eq!(doc.element_name(html), Some("html"));
        let names: Vec<_> = doc
            .children(html)
            .iter()
            .filter_map(|&c| doc.element_name(c))
            .collect();
        assert_eq!(names, ["head", "body"]);
    }

    #[test]
    fn parse_keeps_attribute_order_and_values() {
        let doc = parse(br#"<div z="1" a="2" m="3&amp;4"></div>"#).expect("parse");
        let div = find_element(&doc, "div").expect("div");
        let NodeKind::Element { attrs, .. } = doc.kind(div) else {
            panic!("div is not an element");
        };
        assert_eq!(
            attrs,
            &vec![
                Attribute::new("z", "1"),
                Attribute::new("a", "2"),
                Attribute::new("m", "3&4"),
            ]
        );
    }

    #[test]
    fn parent_links_point_back_up() {
        let doc = parse(b"<ul><li>one</li></ul>").expect("parse");
        let li = find_element(&doc, "li").expect("li");
        let ul = doc.parent(li).expect("li parent");
        assert_eq!(doc.element_name(ul), Some("ul"));
        assert_eq!(doc.parent(doc.root()), None);
    }

    #[test]
    fn template_contents_become_children() {
        let doc = parse(b"<template><b>x</b></template>").expect("parse");
        let template = find_element(&doc, "template").expect("template");
        let b = doc.children(template)[0];
        assert_eq!(doc.element_name(b), Some("b"));
    }

    #[test]
    fn comments_and_doctype_are_kept_in_tree() {
        let doc = parse(b"<!DOCTYPE html><!-- note --><p>x</p>").expect("parse");
        let kinds: Vec<_> = doc
            .children(doc.root())
            .iter()
            .map(|&c| doc.kind(c).clone())
            .collect();
        assert!(matches!(kinds[0], NodeKind::Doctype { ref name } if name == "html"));
        assert!(matches!(kinds[1], NodeKind::Comment(ref c) if c == " note "));
    }

    #[test]
    fn detach_unlinks_from_parent_only() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append_element(root, "a", Vec::new());
        let b = doc.append_element(root, "b", Vec::new());
        doc.detach(a);
        assert_eq!(doc.children(root), &[b]);
        assert_eq!(doc.parent(a), None);
        assert_eq!(doc.node_count(), 3);
    }

    #[test]
    fn descendants_walk_in_document_order() {
        let mut doc = Document::new();
        let root = doc.root();
        let div = doc.append_element(root, "div", Vec::new());
        let p = doc.append_element(div, "p", Vec::new());
        let t = doc.append_text(p, "x");
        let span = doc.append_element(div, "span", Vec::new());
        let order: Vec<_> = doc.descendants(root).collect();
        assert_eq!(order, vec![root, div, p, t, span]);
    }
}
