// src/confluence.rs
//
// Page creation through the Confluence REST API.

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::http::{HttpResponse, Transport};

/// Body of `POST /rest/api/content`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ancestors: Vec<Ancestor>,
    pub space: Space,
    pub body: Body,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Ancestor {
    pub id: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Space {
    pub key: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Body {
    pub storage: Storage,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Storage {
    pub value: String,
    pub representation: &'static str,
}

impl PageRequest {
    /// A new page in `space_key`. An `ancestor_id` of 0 means "no parent".
    pub fn new(title: &str, space_key: &str, ancestor_id: u64, xhtml: String) -> Self {
        PageRequest {
            kind: "page",
            title: title.to_string(),
            ancestors: if ancestor_id == 0 {
                Vec::new()
            } else {
                vec![Ancestor { id: ancestor_id }]
            },
            space: Space {
                key: space_key.to_string(),
            },
            body: Body {
                storage: Storage {
                    value: xhtml,
                    representation: "storage",
                },
            },
        }
    }
}

pub struct ConfluenceClient<'a> {
    base_url: String,
    token: String,
    transport: &'a dyn Transport,
}

impl<'a> ConfluenceClient<'a> {
    pub fn new(base_url: &str, token: &str, transport: &'a dyn Transport) -> Self {
        ConfluenceClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            transport,
        }
    }

    pub fn content_url(&self) -> String {
        format!("{}/rest/api/content", self.base_url)
    }

    /// Create the page. The response is returned whatever its status.
    pub fn publish(&self, page: &PageRequest) -> Result<HttpResponse> {
        let url = self.content_url();
        let body = serde_json::to_string(page).map_err(|e| Error::json("Confluence page", e))?;
        info!(%url, title = %page.title, space = %page.space.key, bytes = body.len(), "publishing page");

        let response = self.transport.post_json(&url, body, Some(&self.token))?;
        if !response.is_success() {
            warn!(status = response.status, "Confluence rejected the page");
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::fake::FakeTransport;
    use serde_json::{json, Value};

    #[test]
    fn page_request_has_confluence_shape() {
        let page = PageRequest::new("Release 1.0", "ENG", 4242, r#"<p class="x">hi</p>"#.into());
        let value = serde_json::to_value(&page).expect("serialize");
        assert_eq!(
            value,
            json!({
                "type": "page",
                "title": "Release 1.0",
                "ancestors": [{"id": 4242}],
                "space": {"key": "ENG"},
                "body": {"storage": {"value": "<p class=\"x\">hi</p>", "representation": "storage"}}
            })
        );
    }

    #[test]
    fn zero_ancestor_is_omitted() {
        let page = PageRequest::new("t", "S", 0, String::new());
        let value = serde_json::to_value(&page).expect("serialize");
        assert!(value.get("ancestors").is_none());
    }

    #[test]
    fn publish_posts_to_content_endpoint_with_bearer() {
        let fake = FakeTransport::with_responses([(200, r#"{"id":"123"}"#.to_string())]);
        let client = ConfluenceClient::new("https://wiki.example.com/", "tok", &fake);
        let page = PageRequest::new("T", "SP", 7, "<br />".into());

        let response = client.publish(&page).expect("publish");
        assert_eq!(response.body, r#"{"id":"123"}"#);

        let requests = fake.requests.borrow();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].url, "https://wiki.example.com/rest/api/content");
        assert_eq!(requests[0].bearer.as_deref(), Some("tok"));
        let sent: Value =
            serde_json::from_str(requests[0].body.as_deref().expect("body")).expect("json body");
        assert_eq!(sent["body"]["storage"]["value"], "<br />");
        assert_eq!(sent["space"]["key"], "SP");
    }

    #[test]
    fn error_status_is_returned_not_raised() {
        let fake = FakeTransport::with_responses([(400, "title already exists".to_string())]);
        let client = ConfluenceClient::new("https://wiki", "tok", &fake);
        let response = client
            .publish(&PageRequest::new("T", "SP", 0, String::new()))
            .expect("publish");
        assert_eq!(response.status, 400);
        assert_eq!(response.body, "title already exists");
    }
}
