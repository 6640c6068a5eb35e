// src/http.rs
//
// Blocking HTTP seam shared by the Jira and Confluence clients. The client is
// an explicit value handed to whoever needs it; tests pass their own
// `Transport` instead.

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Status and body of a completed request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Transport {
    /// `GET url?query` with an optional bearer token.
    fn get(&self, url: &str, query: &[(&str, &str)], bearer: Option<&str>)
        -> Result<HttpResponse>;

    /// `POST url` with a JSON body and an optional bearer token.
    fn post_json(&self, url: &str, body: String, bearer: Option<&str>) -> Result<HttpResponse>;
}

/// [`Transport`] over a `reqwest` blocking client.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|source| Error::Http {
                url: String::new(),
                source,
            })?;
        Ok(ReqwestTransport { client })
    }

    fn send(&self, url: &str, request: RequestBuilder, bearer: Option<&str>) -> Result<HttpResponse> {
        let request = match bearer {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let http_err = |source| Error::Http {
            url: url.to_string(),
            source,
        };
        let response = request.send().map_err(http_err)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(http_err)?;
        debug!(url, status, bytes = body.len(), "http response");
        Ok(HttpResponse { status, body })
    }
}

impl Transport for ReqwestTransport {
    fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        bearer: Option<&str>,
    ) -> Result<HttpResponse> {
        let request = self
            .client
            .get(url)
            .query(query)
            .header(ACCEPT, "application/json");
        self.send(url, request, bearer)
    }

    fn post_json(&self, url: &str, body: String, bearer: Option<&str>) -> Result<HttpResponse> {
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body);
        self.send(url, request, bearer)
    }
}
