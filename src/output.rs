// src/output.rs
//
// Where the converted document goes, and the JSON escaping applied on the way.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::error::{Error, Result};

const FILE_SCHEME: &str = "file://";
const CONFLUENCE_SCHEME: &str = "confluence://";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
    /// Base URL of a Confluence server.
    Confluence(String),
}

impl Destination {
    /// `""` → stdout, `file://PATH`, `confluence://BASE`, or a bare path.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(Destination::Stdout);
        }
        if let Some(path) = s.strip_prefix(FILE_SCHEME) {
            if path.is_empty() {
                return Err(Error::InvalidDestination(s.to_string()));
            }
            return Ok(Destination::File(PathBuf::from(path)));
        }
        if let Some(base) = s.strip_prefix(CONFLUENCE_SCHEME) {
            let base = base.trim_end_matches('/');
            if base.is_empty() {
                return Err(Error::InvalidDestination(s.to_string()));
            }
            let base = if base.contains("://") {
                base.to_string()
            } else {
                format!("https://{base}")
            };
            return Ok(Destination::Confluence(base));
        }
        if s.contains("://") {
            return Err(Error::InvalidDestination(s.to_string()));
        }
        Ok(Destination::File(PathBuf::from(s)))
    }

    pub fn is_confluence(&self) -> bool {
        matches!(self, Destination::Confluence(_))
    }
}

/// Escape `s` for embedding inside a JSON string literal (quotes not included).
pub fn escape_for_json(s: &str) -> String {
    // Serializing a `&str` never fails.
    match serde_json::to_string(s) {
        Ok(quoted) => quoted[1..quoted.len() - 1].to_string(),
        Err(_) => s.to_string(),
    }
}

/// Write `bytes` to stdout (`out`) or to the destination file.
pub fn write_document(dest: &Destination, bytes: &[u8], out: &mut dyn Write) -> Result<()> {
    match dest {
        Destination::Stdout => {
            out.write_all(bytes)?;
            out.flush()?;
        }
        Destination::File(path) => {
            fs::write(path, bytes).map_err(|source| Error::Write {
                path: path.clone(),
                source,
            })?;
        }
        Destination::Confluence(_) => {
            return Err(Error::InvalidDestination(
                "Confluence pages are published, not written".to_string(),
            ));
        }
    }
    Ok(())
}
