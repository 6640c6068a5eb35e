// src/app.rs
//
// One conversion run:
//   read input → (file input) prepend release-notes table → parse → (minify)
//   → render XHTML → publish to Confluence, or (JSON-escape and) write out.

use std::fs;
use std::io::{Read, Write};
use tracing::{debug, info};

use crate::config::Config;
use crate::confluence::{ConfluenceClient, PageRequest};
use crate::error::{Error, Result};
use crate::http::Transport;
use crate::jira::{JiraClient, NoJira, TicketLookup};
use crate::output::{escape_for_json, write_document, Destination};
use crate::{convert, versions};

/// Read the source document, adding the release-notes table for file input.
pub fn read_input(
    config: &Config,
    stdin: &mut dyn Read,
    transport: &dyn Transport,
) -> Result<String> {
    let Some(path) = &config.input else {
        let mut raw = Vec::new();
        stdin.read_to_end(&mut raw)?;
        let html = String::from_utf8_lossy(&raw).into_owned();
        debug!(bytes = raw.len(), "read stdin");
        return Ok(html);
    };

    let raw = fs::read(path).map_err(|source| Error::Read {
        path: path.clone(),
        source,
    })?;
    let html = String::from_utf8_lossy(&raw).into_owned();
    debug!(path = %path.display(), bytes = html.len(), "read input file");

    let Some(sources) = config.enrichment() else {
        return Ok(html);
    };
    let jira_client;
    let lookup: &dyn TicketLookup = match &config.jira {
        Some(jira) => {
            jira_client = JiraClient::new(&jira.base_url, jira.token.clone(), transport)
                .with_jql_template(jira.jql_template.clone());
            &jira_client
        }
        None => &NoJira,
    };
    versions::enrich(&html, &sources.versions_path, &sources.mocks_path, lookup)
}

pub fn run(
    config: &Config,
    stdin: &mut dyn Read,
    stdout: &mut dyn Write,
    transport: &dyn Transport,
) -> Result<()> {
    if config.output.is_confluence() {
        config.confluence.validate()?;
    }

    let html = read_input(config, stdin, transport)?;
    let xhtml = convert(html.as_bytes(), config.minify)?;
    info!(bytes = xhtml.len(), minify = config.minify, "converted to xhtml");

    match &config.output {
        Destination::Confluence(base_url) => {
            let conf = &config.confluence;
            let page = PageRequest::new(
                &conf.page_title,
                &conf.space_code,
                conf.ancestor_page_id,
                xhtml,
            );
            let client = ConfluenceClient::new(base_url, &conf.auth_token, transport);
            let response = client.publish(&page)?;
            writeln!(stdout, "{}", response.body)?;
        }
        dest => {
            let body = if config.escape_for_json {
                escape_for_json(&xhtml)
            } else {
                xhtml
            };
            write_document(dest, body.as_bytes(), stdout)?;
        }
    }
    Ok(())
}
