// src/minify.rs
//
// Tree-level minification, run between parsing and rendering.
//
// - Comments are dropped.
// - RAW-TEXT elements (pre, textarea, script, style, xmp, plaintext) are left
//   verbatim, including everything below them.
// - In text: whitespace runs collapse to a single space.
// - Whitespace touching a block boundary (start/end of a block element, or a
//   neighbouring block sibling) is trimmed away.
// - Text nodes left empty are removed.

use crate::dom::{Document, NodeId, NodeKind};

/* =============================== Core sets =============================== */

fn is_raw_text(name: &str) -> bool {
    matches!(
        name,
        "pre" | "textarea" | "script" | "style" | "xmp" | "plaintext"
    )
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "html" | "head" | "body" | "title" | "meta" | "link" | "base" | "script" | "style"
            | "address" | "article" | "aside" | "blockquote" | "details" | "dialog" | "div"
            | "dl" | "dt" | "dd" | "fieldset" | "figcaption" | "figure" | "footer" | "form"
            | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "header" | "hgroup" | "hr" | "main"
            | "menu" | "nav" | "ol" | "p" | "pre" | "search" | "section" | "table" | "thead"
            | "tbody" | "tfoot" | "tr" | "td" | "th" | "caption" | "colgroup" | "ul" | "li"
            | "optgroup" | "option" | "select" | "summary"
    )
}

#[inline]
fn is_ws(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c')
}

/// Collapse every whitespace run in `text` to one space.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_ws = false;
    for c in text.chars() {
        if is_ws(c) {
            if !in_ws {
                out.push(' ');
            }
            in_ws = true;
        } else {
            out.push(c);
            in_ws = false;
        }
    }
    out
}

/* ================================ Minify ================================= */

/// Minify `doc` in place.
pub fn minify(doc: &mut Document) {
    let mut pending = vec![doc.root()];
    while let Some(parent) = pending.pop() {
        minify_children(doc, parent, &mut pending);
    }
}

fn is_block_node(doc: &Document, id: NodeId) -> bool {
    match doc.kind(id) {
        NodeKind::Document => true,
        NodeKind::Element { name, .. } => is_block(name),
        _ => false,
    }
}

/// Minify the direct children of `parent`, queueing child elements that
/// still need a pass.
fn minify_children(doc: &mut Document, parent: NodeId, pending: &mut Vec<NodeId>) {
    // Comments go first so they don't separate text from its real neighbours.
    let comments: Vec<NodeId> = doc
        .children(parent)
        .iter()
        .copied()
        .filter(|&c| matches!(doc.kind(c), NodeKind::Comment(_)))
        .collect();
    for id in comments {
        doc.detach(id);
    }
    merge_adjacent_text(doc, parent);

    let parent_is_block = is_block_node(doc, parent);
    let children: Vec<NodeId> = doc.children(parent).to_vec();
    let last = children.len().saturating_sub(1);
    let mut empty = Vec::new();

    for (i, &id) in children.iter().enumerate() {
        if let Some(name) = doc.element_name(id) {
            if !is_raw_text(name) {
                pending.push(id);
            }
            continue;
        }

        let trim_start = if i == 0 {
            parent_is_block
        } else {
            is_block_node(doc, children[i - 1])
        };
        let trim_end = if i == last {
            parent_is_block
        } else {
            is_block_node(doc, children[i + 1])
        };

        let Some(text) = doc.text_mut(id) else {
            continue;
        };
        let mut collapsed = collapse_whitespace(text);
        if trim_end {
            collapsed.truncate(collapsed.trim_end_matches(' ').len());
        }
        if trim_start {
            collapsed = collapsed.trim_start_matches(' ').to_string();
        }
        if collapsed.is_empty() {
            empty.push(id);
        } else {
            *text = collapsed;
        }
    }

    for id in empty {
        doc.detach(id);
    }
}

/// Fold runs of sibling text nodes into the first node of each run.
fn merge_adjacent_text(doc: &mut Document, parent: NodeId) {
    let children: Vec<NodeId> = doc.children(parent).to_vec();
    let mut run_head: Option<NodeId> = None;
    for id in children {
        let NodeKind::Text(text) = doc.kind(id) else {
            run_head = None;
            continue;
        };
        let Some(head) = run_head else {
            run_head = Some(id);
            continue;
        };
        let text = text.clone();
        if let Some(head_text) = doc.text_mut(head) {
            head_text.push_str(&text);
        }
        doc.detach(id);
    }
}
