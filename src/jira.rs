// src/jira.rs
//
// Release-notes ticket lookup through Jira's JQL search.

use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::http::Transport;

/// JQL used when none is configured. `{version}` is replaced per lookup.
pub const DEFAULT_JQL_TEMPLATE: &str = r#"fixVersion = "{version}""#;

/* ============================ Response model ============================= */

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchResponse {
    issues: Vec<Issue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Issue {
    key: String,
    fields: Fields,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Fields {
    issuetype: IssueType,
    fix_versions: Vec<FixVersion>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IssueType {
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FixVersion {
    name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    pub key: String,
    pub description: String,
}

/// Decode a search response into tickets keyed by their first fix version.
///
/// Issues without a fix version are skipped. When several issues share a fix
/// version the last one wins.
pub fn parse_tickets(json: &[u8]) -> Result<BTreeMap<String, Ticket>> {
    let response: SearchResponse =
        serde_json::from_slice(json).map_err(|e| Error::json("Jira search response", e))?;

    let mut tickets = BTreeMap::new();
    for issue in response.issues {
        let Some(version) = issue.fields.fix_versions.into_iter().next() else {
            continue;
        };
        tickets.insert(
            version.name,
            Ticket {
                key: issue.key,
                description: issue.fields.issuetype.description,
            },
        );
    }
    Ok(tickets)
}

/* ================================ Lookup ================================= */

/// Source of release-notes tickets for a version.
pub trait TicketLookup {
    fn find(&self, version: &str) -> Result<Option<Ticket>>;

    /// Browser link to a ticket, if the lookup knows where tickets live.
    fn ticket_url(&self, _key: &str) -> Option<String> {
        None
    }
}

/// Lookup used when Jira is not configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoJira;

impl TicketLookup for NoJira {
    fn find(&self, _version: &str) -> Result<Option<Ticket>> {
        Ok(None)
    }
}

pub struct JiraClient<'a> {
    base_url: String,
    token: Option<String>,
    jql_template: String,
    transport: &'a dyn Transport,
}

impl<'a> JiraClient<'a> {
    pub fn new(base_url: &str, token: Option<String>, transport: &'a dyn Transport) -> Self {
        JiraClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            jql_template: DEFAULT_JQL_TEMPLATE.to_string(),
            transport,
        }
    }

    pub fn with_jql_template(mut self, template: impl Into<String>) -> Self {
        self.jql_template = template.into();
        self
    }

    pub fn jql_for(&self, version: &str) -> String {
        self.jql_template.replace("{version}", version)
    }

    /// Run a JQL search and index the hits by fix version.
    pub fn tickets_by_jql(&self, jql: &str) -> Result<BTreeMap<String, Ticket>> {
        let url = format!("{}/rest/api/2/search", self.base_url);
        debug!(%url, jql, "jira search");
        let response = self.transport.get(
            &url,
            &[("jql", jql), ("fields", "issuetype,fixVersions")],
            self.token.as_deref(),
        )?;
        if !response.is_success() {
            return Err(Error::JiraStatus {
                status: response.status,
                body: response.body,
            });
        }
        parse_tickets(response.body.as_bytes())
    }
}

impl TicketLookup for JiraClient<'_> {
    fn find(&self, version: &str) -> Result<Option<Ticket>> {
        let mut tickets = self.tickets_by_jql(&self.jql_for(version))?;
        let ticket = tickets.remove(version);
        info!(version, found = ticket.is_some(), "release notes lookup");
        Ok(ticket)
    }

    fn ticket_url(&self, key: &str) -> Option<String> {
        Some(format!("{}/browse/{}", self.base_url, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::fake::FakeTransport;

    const SEARCH: &str = r#"{
        "issues": [
            {"key": "REL-1", "fields": {"issuetype": {"description": "First"}, "fixVersions": [{"name": "1.0.0"}, {"name": "1.0.1"}]}},
            {"key": "REL-2", "fields": {"issuetype": {"description": "No version"}, "fixVersions": []}},
            {"key": "REL-3", "fields": {"issuetype": {"description": "Second"}, "fixVersions": [{"name": "2.0.0"}]}}
        ]
    }"#;

    #[test]
    fn tickets_are_keyed_by_first_fix_version() {
        let tickets = parse_tickets(SEARCH.as_bytes()).expect("parse");
        assert_eq!(tickets.len(), 2);
        assert_eq!(
            tickets["1.0.0"],
            Ticket {
                key: "REL-1".into(),
                description: "First".into()
            }
        );
        assert_eq!(tickets["2.0.0"].key, "REL-3");
        assert!(!tickets.contains_key("1.0.1"));
    }

    #[test]
    fn later_issue_overwrites_same_version() {
        let json = r#"{"issues": [
            {"key": "A-1", "fields": {"issuetype": {"description": "a"}, "fixVersions": [{"name": "v"}]}},
            {"key": "A-2", "fields": {"issuetype": {"description": "b"}, "fixVersions": [{"name": "v"}]}}
        ]}"#;
        let tickets = parse_tickets(json.as_bytes()).expect("parse");
        assert_eq!(tickets["v"].key, "A-2");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let tickets = parse_tickets(br#"{"issues": [{"key": "X-1"}]}"#).expect("parse");
        assert!(tickets.is_empty());
        assert!(parse_tickets(b"{}").expect("empty object").is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = parse_tickets(b"<html>login</html>").expect_err("not json");
        assert!(matches!(err, Error::Json { .. }));
    }

    #[test]
    fn client_queries_search_endpoint_with_jql_and_token() {
        let fake = FakeTransport::with_responses([(200, SEARCH.to_string())]);
        let client = JiraClient::new("https://jira.example.com/", Some("secret".into()), &fake);

        let ticket = client.find("2.0.0").expect("lookup").expect("ticket");
        assert_eq!(ticket.key, "REL-3");

        let requests = fake.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].url, "https://jira.example.com/rest/api/2/search");
        assert_eq!(
            requests[0].query[0],
            ("jql".to_string(), r#"fixVersion = "2.0.0""#.to_string())
        );
        assert_eq!(requests[0].bearer.as_deref(), Some("secret"));
    }

    #[test]
    fn custom_template_and_empty_token() {
        let fake = FakeTransport::with_responses([(200, r#"{"issues": []}"#.to_string())]);
        let client = JiraClient::new("https://jira", Some(String::new()), &fake)
            .with_jql_template(r#"project = REL AND fixVersion = "{version}""#);

        assert_eq!(client.find("3.1").expect("lookup"), None);
        let requests = fake.requests.borrow();
        assert_eq!(requests[0].query[0].1, r#"project = REL AND fixVersion = "3.1""#);
        assert_eq!(requests[0].bearer, None);
    }

    #[test]
    fn non_success_status_is_fatal() {
        let fake = FakeTransport::with_responses([(401, "unauthorized".to_string())]);
        let client = JiraClient::new("https://jira", None, &fake);
        let err = client.find("1.0").expect_err("401");
        assert!(matches!(err, Error::JiraStatus { status: 401, .. }));
    }

    #[test]
    fn ticket_urls_point_at_browse_page() {
        let fake = FakeTransport::default();
        let client = JiraClient::new("https://jira.example.com/", None, &fake);
        assert_eq!(
            client.ticket_url("REL-1").as_deref(),
            Some("https://jira.example.com/browse/REL-1")
        );
        assert_eq!(NoJira.ticket_url("REL-1"), None);
    }
}
