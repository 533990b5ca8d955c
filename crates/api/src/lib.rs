//! GitHub API client utilities.
//!
//! This crate provides a lightweight client for the GitHub REST API and the
//! adapters the engine needs from it:
//!
//! - [`GitHubClient`]: an HTTP client with default headers against a validated base URL
//! - [`RepoContents`]: the repository contents API as a [`ContentStore`](wdui_engine::ContentStore)
//! - [`RepoCatalog`]: repository list endpoints as an [`OptionsProvider`](wdui_engine::OptionsProvider)
//! - [`list_workflows`] and [`dispatch_workflow`]: the Actions endpoints
//!
//! # Example
//!
//! ```ignore
//! use wdui_api::{GitHubClient, RepoRef, list_workflows, token_from_env};
//!
//! async fn run() -> anyhow::Result<()> {
//!     let client = GitHubClient::new("https://api.github.com", token_from_env().as_deref())?;
//!     let repo: RepoRef = "octo/app".parse()?;
//!     for workflow in list_workflows(&client, &repo).await? {
//!         println!("{} ({})", workflow.name, workflow.path);
//!     }
//!     Ok(())
//! }
//! ```

mod actions;
mod catalog;
mod contents;

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::{Client, Method, RequestBuilder, Response, Url, header};
use serde::de::DeserializeOwned;
use tracing::debug;

pub use actions::{DispatchRequest, WorkflowRun, WorkflowSummary, dispatch_request, dispatch_workflow, list_runs, list_workflows};
pub use catalog::RepoCatalog;
pub use contents::{DEFAULT_COMMIT_MESSAGE, RepoContents};

/// Public GitHub API.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Allowed hostnames or base domains for non-local API bases. Subdomains are also allowed.
const ALLOWED_GITHUB_DOMAINS: &[&str] = &["github.com", "githubusercontent.com"];
/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Characters escaped inside one URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub(crate) fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Environment variables checked, in order, for an API token.
pub const TOKEN_ENV_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];

/// Reads the API token from `GITHUB_TOKEN`, then `GH_TOKEN`.
pub fn token_from_env() -> Option<String> {
    TOKEN_ENV_VARS
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for GitHub API access.
///
/// Default headers (accept, API version and, when a token is known,
/// authorization) are installed on the client; requests are resolved against
/// a validated base URL.
pub struct GitHubClient {
    pub base_url: String,
    pub http: Client,
    pub user_agent: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Builds a client for `base_url`, authenticating with `token` when given.
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self> {
        validate_base_url(base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static(GITHUB_ACCEPT));
        default_headers.insert("x-github-api-version", header::HeaderValue::from_static(GITHUB_API_VERSION));
        if let Some(token) = token {
            let mut authorization =
                header::HeaderValue::from_str(&format!("Bearer {}", token)).context("API token contains invalid header characters")?;
            authorization.set_sensitive(true);
            default_headers.insert(header::AUTHORIZATION, authorization);
        }

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            .build()
            .context("build http client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            user_agent: format!("wdui/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
            token: token.map(str::to_string),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!(%url, %method, "building request");

        self.http.request(method, url).header(header::USER_AGENT, &self.user_agent)
    }

    /// Absolute URL for an API-relative path.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Every header a request carries, in `name: value` form, for display.
    ///
    /// The token is included verbatim; redact before printing.
    pub fn header_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("accept: {}", GITHUB_ACCEPT),
            format!("x-github-api-version: {}", GITHUB_API_VERSION),
            format!("user-agent: {}", self.user_agent),
        ];
        if let Some(token) = &self.token {
            lines.push(format!("authorization: Bearer {}", token));
        }
        lines
    }

    /// GET a JSON document.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self
            .request(Method::GET, path)
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {}", path))?;
        let response = ensure_success(response, path).await?;
        response.json::<T>().await.with_context(|| format!("decode response of GET {}", path))
    }
}

/// Converts a non-2xx response into an error that carries GitHub's message.
pub(crate) async fn ensure_success(response: Response, path: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    bail!("HTTP {} for {}: {}", status.as_u16(), path, error_message(&body))
}

/// The `message` field of a GitHub error body, or the raw body.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(|message| message.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS, and host must be one of the allowed
///   GitHub domains or a subdomain thereof
pub fn validate_base_url(base: &str) -> Result<()> {
    let parsed_base_url = Url::parse(base).map_err(|e| anyhow!("Invalid API base URL '{}': {}", base, e))?;

    let host_name = parsed_base_url
        .host_str()
        .ok_or_else(|| anyhow!("API base URL must include a host"))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed_base_url.scheme() != "https" {
        return Err(anyhow!(
            "API base URL must use https for non-localhost hosts; got '{}://'",
            parsed_base_url.scheme()
        ));
    }

    let is_allowed_domain = ALLOWED_GITHUB_DOMAINS.iter().any(|&allowed_domain| {
        host_name.eq_ignore_ascii_case(allowed_domain) || host_name.to_ascii_lowercase().ends_with(&format!(".{}", allowed_domain))
    });
    if !is_allowed_domain {
        return Err(anyhow!(
            "API base host '{}' is not allowed; must be one of {:?} or a subdomain, or localhost",
            host_name,
            ALLOWED_GITHUB_DOMAINS
        ));
    }

    Ok(())
}

/// An `owner/name` repository coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// `/repos/{owner}/{name}` followed by `suffix`.
    pub(crate) fn api_path(&self, suffix: &str) -> String {
        format!("/repos/{}/{}{}", self.owner, self.name, suffix)
    }
}

impl FromStr for RepoRef {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let is_valid_part = |part: &str| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
        };
        match raw.trim().split_once('/') {
            Some((owner, name)) if is_valid_part(owner) && is_valid_part(name) => Ok(Self::new(owner, name)),
            _ => Err(anyhow!("repository must look like 'owner/name', got '{}'", raw)),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_validation() {
        assert!(validate_base_url("https://api.github.com").is_ok());
        assert!(validate_base_url("https://github.example.github.com/api/v3").is_ok());
        assert!(validate_base_url("http://localhost:8080").is_ok());
        assert!(validate_base_url("http://127.0.0.1:9000").is_ok());
        assert!(validate_base_url("http://api.github.com").is_err());
        assert!(validate_base_url("https://github.com.evil.io").is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn repo_refs_parse_and_display() {
        let repo: RepoRef = "octo-org/app.rs".parse().expect("valid repo");
        assert_eq!(repo, RepoRef::new("octo-org", "app.rs"));
        assert_eq!(repo.to_string(), "octo-org/app.rs");
        assert_eq!(repo.api_path("/tags"), "/repos/octo-org/app.rs/tags");

        assert!("octo".parse::<RepoRef>().is_err());
        assert!("octo/".parse::<RepoRef>().is_err());
        assert!("octo/app/extra".parse::<RepoRef>().is_err());
    }

    #[test]
    fn token_prefers_github_token() {
        temp_env::with_vars([("GITHUB_TOKEN", Some("primary")), ("GH_TOKEN", Some("fallback"))], || {
            assert_eq!(token_from_env().as_deref(), Some("primary"));
        });
        temp_env::with_vars([("GITHUB_TOKEN", Some("  ")), ("GH_TOKEN", Some("fallback"))], || {
            assert_eq!(token_from_env().as_deref(), Some("fallback"));
        });
        temp_env::with_vars([("GITHUB_TOKEN", None::<&str>), ("GH_TOKEN", None)], || {
            assert_eq!(token_from_env(), None);
        });
    }

    #[test]
    fn header_lines_include_token_only_when_set() {
        let anonymous = GitHubClient::new(DEFAULT_API_BASE, None).expect("client");
        assert!(!anonymous.is_authenticated());
        assert!(anonymous.header_lines().iter().all(|line| !line.starts_with("authorization")));

        let client = GitHubClient::new("https://api.github.com/", Some("ghp_secret")).expect("client");
        assert_eq!(client.url("/repos/a/b"), "https://api.github.com/repos/a/b");
        assert!(client.header_lines().contains(&"authorization: Bearer ghp_secret".to_string()));
    }

    #[test]
    fn error_message_prefers_json_message() {
        assert_eq!(error_message(r#"{"message":"Not Found"}"#), "Not Found");
        assert_eq!(error_message(" plain \n"), "plain");
    }
}
