// src/xhtml.rs
//
// XHTML renderer.
//
// - Elements: `<name attr="value">` ... `</name>`; void elements from the fixed
//   table below are written once as `<name ... />`.
// - Text and attribute values share one escaping rule set: & < > " ' and CR.
// - Document, doctype, comment and processing-instruction nodes write nothing
//   themselves; their children are still rendered.
// - The walk uses an explicit stack, so nesting depth is bounded by memory
//   only. Output is identical to a recursive pre-order walk.

use memchr::memchr3;

use crate::dom::{Document, NodeId, NodeKind};

/* =============================== Core sets =============================== */

/// Elements that are always written as a single self-closed tag.
pub const SELF_CLOSING_TAGS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Exact, case-sensitive membership in [`SELF_CLOSING_TAGS`].
pub fn is_self_closing(name: &str) -> bool {
    SELF_CLOSING_TAGS.contains(&name)
}

/* ================================ Escaping =============================== */

#[inline]
fn needs_escape(s: &[u8]) -> Option<usize> {
    match (memchr3(b'&', b'<', b'>', s), memchr3(b'"', b'\'', b'\r', s)) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Append `s` to `out` with the XML special characters replaced by entities.
pub fn escape_into(s: &str, out: &mut String) {
    let Some(first) = needs_escape(s.as_bytes()) else {
        out.push_str(s);
        return;
    };
    // No special characters before `first`.
    out.push_str(&s[..first]);
    for c in s[first..].chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            // A raw CR would come back as LF after reparsing.
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(s, &mut out);
    out
}

/* =============================== Rendering =============================== */

enum Step {
    Enter(NodeId),
    Leave(NodeId),
}

/// Render the whole document as XHTML bytes.
pub fn render(doc: &Document) -> Vec<u8> {
    render_string(doc).into_bytes()
}

pub fn render_string(doc: &Document) -> String {
    let mut out = String::with_capacity(doc.node_count() * 16);
    render_node_into(doc, doc.root(), &mut out);
    out
}

/// Render `id` and its subtree onto the end of `out`.
pub fn render_node_into(doc: &Document, id: NodeId, out: &mut String) {
    let mut stack = vec![Step::Enter(id)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(id) => {
                match doc.kind(id) {
                    NodeKind::Element { name, attrs } => {
                        out.push('<');
                        out.push_str(name);
                        for attr in attrs {
                            out.push(' ');
                            out.push_str(&attr.name);
                            out.push_str("=\"");
                            escape_into(&attr.value, out);
                            out.push('"');
                        }
                        if is_self_closing(name) {
                            out.push_str(" /");
                        }
                        out.push('>');
                        stack.push(Step::Leave(id));
                    }
                    NodeKind::Text(text) => escape_into(text, out),
                    _ => {}
                }
                stack.extend(doc.children(id).iter().rev().map(|&c| Step::Enter(c)));
            }
            Step::Leave(id) => {
                if let Some(name) = doc.element_name(id) {
                    if !is_self_closing(name) {
                        out.push_str("</");
                        out.push_str(name);
                        out.push('>');
                    }
                }
            }
        }
    }
}
