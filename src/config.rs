// src/config.rs
//
// Resolved settings for one run. The binary fills this in from flags and
// environment; the library never looks at either directly.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::output::Destination;

pub const DEFAULT_VERSIONS_FILEPATH: &str = "project_versions.json";
pub const DEFAULT_MOCKS_VERSIONS_FILEPATH: &str = "project_versions_mocks.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Input HTML file. `None` reads stdin.
    pub input: Option<PathBuf>,
    pub output: Destination,
    pub minify: bool,
    pub escape_for_json: bool,
    /// Release-notes table sources. `None` disables the table.
    pub versions: Option<VersionsConfig>,
    /// Jira connection. `None` means no lookups, placeholders only.
    pub jira: Option<JiraConfig>,
    pub confluence: ConfluenceConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionsConfig {
    pub versions_path: PathBuf,
    pub mocks_path: PathBuf,
}

impl Default for VersionsConfig {
    fn default() -> Self {
        VersionsConfig {
            versions_path: PathBuf::from(DEFAULT_VERSIONS_FILEPATH),
            mocks_path: PathBuf::from(DEFAULT_MOCKS_VERSIONS_FILEPATH),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JiraConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub jql_template: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfluenceConfig {
    pub page_title: String,
    pub space_code: String,
    pub ancestor_page_id: u64,
    pub auth_token: String,
}

impl ConfluenceConfig {
    /// Title, space and token must all be present to publish.
    pub fn validate(&self) -> Result<()> {
        if self.page_title.is_empty() || self.space_code.is_empty() || self.auth_token.is_empty() {
            return Err(Error::MissingConfluenceDetails);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input: None,
            output: Destination::Stdout,
            minify: false,
            escape_for_json: false,
            versions: Some(VersionsConfig::default()),
            jira: None,
            confluence: ConfluenceConfig::default(),
        }
    }
}

impl Config {
    /// Enrichment only applies to file input.
    pub fn enrichment(&self) -> Option<&VersionsConfig> {
        self.input.as_ref().and(self.versions.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confluence_requires_title_space_and_token() {
        let mut conf = ConfluenceConfig {
            page_title: "T".into(),
            space_code: "S".into(),
            ancestor_page_id: 0,
            auth_token: "tok".into(),
        };
        assert!(conf.validate().is_ok());
        conf.auth_token.clear();
        assert!(matches!(
            conf.validate(),
            Err(Error::MissingConfluenceDetails)
        ));
    }

    #[test]
    fn enrichment_needs_file_input() {
        let mut config = Config::default();
        assert!(config.enrichment().is_none());
        config.input = Some(PathBuf::from("in.html"));
        assert_eq!(config.enrichment(), Some(&VersionsConfig::default()));
        config.versions = None;
        assert!(config.enrichment().is_none());
    }
}
