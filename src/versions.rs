// src/versions.rs
//
// Release-notes table built from the project version manifests.
//
// - project_versions.json: component name -> Component.
// - project_versions_mocks.json: {"connectors": {...}, "mocks": {...}}.
// - One row per distinct non-empty `jiraVer`, visiting components, then
//   connectors, then mocks. First occurrence wins.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::jira::TicketLookup;
use crate::xhtml::escape;

/// Description used when no release-notes ticket is found.
pub const PLACEHOLDER_DESCRIPTION: &str = "DESCRIPTION";

/// Markup placed between the table and the converted document.
pub const TABLE_SEPARATOR: &str = "<br></br><br></br>";

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Component {
    pub chart_ver: String,
    pub comment: String,
    pub jira_ver: String,
    pub jira_fix_ver: String,
    pub namespaces: BTreeMap<String, String>,
}

pub type ProjectVersions = BTreeMap<String, Component>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectVersionsMocks {
    pub connectors: BTreeMap<String, Component>,
    pub mocks: BTreeMap<String, Component>,
}

fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let data = fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&data).map_err(|e| Error::json(path.display().to_string(), e))
}

pub fn load_versions(path: &Path) -> Result<ProjectVersions> {
    let versions: ProjectVersions = load_json(path)?;
    debug!(path = %path.display(), components = versions.len(), "loaded versions");
    Ok(versions)
}

pub fn load_mocks(path: &Path) -> Result<ProjectVersionsMocks> {
    let mocks: ProjectVersionsMocks = load_json(path)?;
    debug!(
        path = %path.display(),
        connectors = mocks.connectors.len(),
        mocks = mocks.mocks.len(),
        "loaded mocks versions"
    );
    Ok(mocks)
}

/// Distinct non-empty Jira versions in table order.
pub fn distinct_jira_versions<'a>(
    versions: &'a ProjectVersions,
    mocks: &'a ProjectVersionsMocks,
) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    versions
        .values()
        .chain(mocks.connectors.values())
        .chain(mocks.mocks.values())
        .map(|c| c.jira_ver.as_str())
        .filter(|v| !v.is_empty() && seen.insert(*v))
        .collect()
}

/// Render the release-notes table for every distinct Jira version.
pub fn release_notes_table(
    versions: &ProjectVersions,
    mocks: &ProjectVersionsMocks,
    lookup: &dyn TicketLookup,
) -> Result<String> {
    let mut table = String::from("<table>\n");
    table.push_str("<tr><th>Version</th><th>Release Notes Description</th></tr>\n");

    for version in distinct_jira_versions(versions, mocks) {
        let ticket = lookup.find(version)?;
        let version_cell = match ticket.as_ref().and_then(|t| lookup.ticket_url(&t.key)) {
            Some(url) => format!(r#"<a href="{}">{}</a>"#, escape(&url), escape(version)),
            None => escape(version),
        };
        let description = match ticket {
            Some(t) => t.description,
            None => {
                warn!(version, "no release notes ticket, using placeholder");
                PLACEHOLDER_DESCRIPTION.to_string()
            }
        };
        table.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            version_cell,
            escape(&description)
        ));
    }

    table.push_str("</table>\n");
    Ok(table)
}

/// Load both manifests and prepend the release-notes table to `html`.
pub fn enrich(
    html: &str,
    versions_path: &Path,
    mocks_path: &Path,
    lookup: &dyn TicketLookup,
) -> Result<String> {
    let versions = load_versions(versions_path)?;
    let mocks = load_mocks(mocks_path)?;
    let table = release_notes_table(&versions, &mocks, lookup)?;
    Ok(format!("{table}{TABLE_SEPARATOR}{html}"))
}
