// src/lib.rs
//
// html-to-xhtml — HTML to well-formed XHTML, with optional minification,
// JSON escaping, a Jira-backed release-notes table, and Confluence publishing.

#![forbid(unsafe_code)]

pub mod app;
pub mod config;
pub mod confluence;
pub mod dom;
pub mod error;
pub mod http;
pub mod jira;
pub mod minify;
pub mod output;
pub mod versions;
pub mod xhtml;

pub use config::Config;
pub use dom::{parse, Document, NodeId, NodeKind};
pub use error::{Error, Result};
pub use xhtml::render;

/// Parse `html`, optionally minify the tree, and render it as XHTML.
pub fn convert(html: &[u8], minify: bool) -> Result<String> {
    let mut doc = dom::parse(html)?;
    if minify {
        minify::minify(&mut doc);
    }
    Ok(xhtml::render_string(&doc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_with_and_without_minify() {
        let html = b"<div>\n  <p>one   two</p>\n</div>";
        let plain = convert(html, false).expect("convert");
        assert!(plain.contains("<div>\n  <p>one   two</p>\n</div>"), "{plain}");
        let small = convert(html, true).expect("convert");
        assert!(small.contains("<div><p>one two</p></div>"), "{small}");
    }
}
