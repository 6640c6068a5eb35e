// src/error.rs
//
// Every failure in this tool is fatal: errors bubble up to `main`, which prints
// the diagnostic and exits non-zero.

use std::io;
use std::path::PathBuf;

/// Errors from reading, converting, or publishing a document
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Reading an input or manifest file failed.
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    /// Writing the output file failed.
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    /// Reading stdin or writing stdout failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The HTML parser could not consume the input.
    #[error("failed to parse HTML: {0}")]
    Parse(#[source] io::Error),

    /// A JSON document did not decode.
    #[error("failed to decode {what}: {source}")]
    Json {
        what: String,
        source: serde_json::Error,
    },

    /// The HTTP client failed before a response was received.
    #[error("HTTP request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    /// Jira answered a search with a non-success status.
    #[error("Jira search returned HTTP {status}: {body}")]
    JiraStatus { status: u16, body: String },

    #[error("Confluence details are required: page title, space code, and auth token")]
    MissingConfluenceDetails,

    #[error("invalid output destination: {0}")]
    InvalidDestination(String),
}

impl Error {
    pub(crate) fn json(what: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Json {
            what: what.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
