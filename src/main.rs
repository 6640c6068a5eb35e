// src/main.rs
//
// html-to-xhtml — HTML in, well-formed XHTML out
//
// - Input: `-i FILE`, or stdin. File input gets a release-notes table (built
//   from the versions manifests and, with `-jira-url`, Jira tickets) in front.
// - `-minify` collapses whitespace and drops comments before rendering.
// - `-escape-for-json` escapes file/stdout output for embedding in JSON.
// - Output: `-o` file path, `file://PATH`, `confluence://BASE_URL`, or stdout.
//
// Flags may be written Go-style with a single dash (`-minify`) or with two
// (`--minify`).
//
// Logging goes to stderr, filtered by RUST_LOG (default: warn).

use clap::{ArgAction, CommandFactory, Parser};
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use html_to_xhtml::app;
use html_to_xhtml::config::{
    Config, ConfluenceConfig, JiraConfig, VersionsConfig, DEFAULT_MOCKS_VERSIONS_FILEPATH,
    DEFAULT_VERSIONS_FILEPATH,
};
use html_to_xhtml::http::ReqwestTransport;
use html_to_xhtml::jira::DEFAULT_JQL_TEMPLATE;
use html_to_xhtml::output::Destination;

/// CLI flags
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Input HTML file (reads stdin if not provided)
    #[arg(short = 'i', value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output destination: PATH, file://PATH or confluence://BASE_URL (stdout if not provided)
    #[arg(short = 'o', value_name = "DEST")]
    output: Option<String>,

    /// Minify the XHTML output
    #[arg(long, action = ArgAction::SetTrue)]
    minify: bool,

    /// Escape XHTML for embedding into JSON
    #[arg(long = "escape-for-json", action = ArgAction::SetTrue)]
    escape_for_json: bool,

    /// Path of versions JSON file
    #[arg(long = "versions-filepath", default_value = DEFAULT_VERSIONS_FILEPATH)]
    versions_filepath: PathBuf,

    /// Path of mocks versions JSON file
    #[arg(long = "mocks-versions-filepath", default_value = DEFAULT_MOCKS_VERSIONS_FILEPATH)]
    mocks_versions_filepath: PathBuf,

    /// Do not prepend the release-notes table to file input
    #[arg(long = "skip-versions", action = ArgAction::SetTrue)]
    skip_versions: bool,

    /// Base URL of the Jira server used for release-notes lookups
    #[arg(long = "jira-url", env = "JIRA_URL")]
    jira_url: Option<String>,

    /// Personal access token for Jira API
    #[arg(long = "jira-auth-personal-token", env = "JIRA_AUTH_PERSONAL_TOKEN", hide_env_values = true)]
    jira_auth_personal_token: Option<String>,

    /// JQL template for release-notes tickets; `{version}` is replaced
    #[arg(long = "jira-jql", default_value = DEFAULT_JQL_TEMPLATE)]
    jira_jql: String,

    /// Title of the Confluence page
    #[arg(long = "confluence-page-title", default_value = "")]
    confluence_page_title: String,

    /// Space code of the Confluence space
    #[arg(long = "confluence-space-code", default_value = "")]
    confluence_space_code: String,

    /// ID of the ancestor Confluence page
    #[arg(long = "confluence-ancestor-page-id", default_value_t = 0)]
    confluence_ancestor_page_id: u64,

    /// Personal access token for Confluence API
    #[arg(
        long = "confluence-auth-personal-token",
        env = "CONFLUENCE_AUTH_PERSONAL_TOKEN",
        hide_env_values = true,
        default_value = ""
    )]
    confluence_auth_personal_token: String,
}

impl Cli {
    fn into_config(self) -> html_to_xhtml::Result<Config> {
        let output = Destination::parse(self.output.as_deref().unwrap_or(""))?;
        let versions = (!self.skip_versions).then(|| VersionsConfig {
            versions_path: self.versions_filepath,
            mocks_path: self.mocks_versions_filepath,
        });
        let jira = self
            .jira_url
            .filter(|url| !url.is_empty())
            .map(|base_url| JiraConfig {
                base_url,
                token: self.jira_auth_personal_token,
                jql_template: self.jira_jql,
            });

        Ok(Config {
            input: self.input,
            output,
            minify: self.minify,
            escape_for_json: self.escape_for_json,
            versions,
            jira,
            confluence: ConfluenceConfig {
                page_title: self.confluence_page_title,
                space_code: self.confluence_space_code,
                ancestor_page_id: self.confluence_ancestor_page_id,
                auth_token: self.confluence_auth_personal_token,
            },
        })
    }
}

/// Rewrite Go-style `-long-flag` arguments to `--long-flag`.
///
/// Only names that are real long flags are rewritten, so option values that
/// happen to start with a dash pass through. Everything after `--` is left
/// alone.
fn normalize_go_style_flags(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let command = Cli::command();
    let longs: Vec<&str> = command.get_arguments().filter_map(|a| a.get_long()).collect();

    let mut out = Vec::new();
    let mut verbatim = false;
    for arg in args {
        if !verbatim {
            if arg == "--" {
                verbatim = true;
            } else if let Some(flag) = arg
                .to_str()
                .and_then(|s| s.strip_prefix('-'))
                .filter(|f| !f.starts_with('-'))
            {
                let name = flag.split('=').next().unwrap_or(flag);
                if name.len() > 1 && longs.contains(&name) {
                    out.push(OsString::from(format!("--{flag}")));
                    continue;
                }
            }
        }
        out.push(arg);
    }
    out
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_go_style_flags(std::env::args_os()));
    init_tracing();

    let result = cli.into_config().and_then(|config| {
        let transport = ReqwestTransport::new()?;
        app::run(
            &config,
            &mut io::stdin().lock(),
            &mut io::stdout().lock(),
            &transport,
        )
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
