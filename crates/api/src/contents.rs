//! The repository contents API as a revisioned content store.
//!
//! A file's blob `sha` is its revision. GitHub rejects an update whose `sha`
//! is stale with 409, and a create over an existing file (no `sha`) with 422;
//! both surface as [`StoreError::Conflict`].

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use wdui_engine::{ContentStore, StoreError, StoredFile};

use crate::{GitHubClient, RepoRef, encode_segment, error_message};

pub const DEFAULT_COMMIT_MESSAGE: &str = "Update workflow dispatch configuration";

#[derive(Debug, Deserialize)]
struct ContentsFile {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
    sha: String,
}

#[derive(Debug, Serialize)]
struct ContentsUpdate<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ContentsUpdateResponse {
    content: ContentsCommitFile,
}

#[derive(Debug, Deserialize)]
struct ContentsCommitFile {
    sha: String,
}

/// Files of one repository (optionally pinned to a branch).
#[derive(Debug, Clone)]
pub struct RepoContents {
    client: GitHubClient,
    repo: RepoRef,
    branch: Option<String>,
    commit_message: String,
}

impl RepoContents {
    pub fn new(client: GitHubClient, repo: RepoRef) -> Self {
        Self {
            client,
            repo,
            branch: None,
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
        }
    }

    /// Reads and writes on `branch` instead of the default branch.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = message.into();
        self
    }

    fn contents_path(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .trim_start_matches('/')
            .split('/')
            .map(encode_segment)
            .collect();
        self.repo.api_path(&format!("/contents/{}", encoded.join("/")))
    }
}

fn backend(context: &str, error: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(format!("{}: {}", context, error))
}

fn decode_content(file: &ContentsFile, path: &str) -> Result<String, StoreError> {
    if file.encoding != "base64" {
        return Err(StoreError::Backend(format!(
            "{} is returned with encoding '{}'; only base64 payloads are supported",
            path, file.encoding
        )));
    }
    let compact: String = file.content.chars().filter(|ch| !ch.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact).map_err(|error| backend(&format!("decode {}", path), error))?;
    String::from_utf8(bytes).map_err(|error| backend(&format!("{} is not UTF-8", path), error))
}

#[async_trait]
impl ContentStore for RepoContents {
    async fn fetch_file(&self, path: &str) -> Result<Option<StoredFile>, StoreError> {
        let api_path = self.contents_path(path);
        let mut request = self.client.request(Method::GET, &api_path);
        if let Some(branch) = &self.branch {
            request = request.query(&[("ref", branch.as_str())]);
        }
        let response = request.send().await.map_err(|error| backend(&format!("GET {}", api_path), error))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(repo = %self.repo, %path, "file does not exist");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Backend(format!("HTTP {} for {}: {}", status.as_u16(), api_path, error_message(&body))));
        }

        let file: ContentsFile = response
            .json()
            .await
            .map_err(|error| backend(&format!("decode response of GET {}", api_path), error))?;
        let content = decode_content(&file, path)?;
        Ok(Some(StoredFile { content, revision: file.sha }))
    }

    async fn write_file(&self, path: &str, content: &str, expected_revision: Option<&str>) -> Result<String, StoreError> {
        let api_path = self.contents_path(path);
        let body = ContentsUpdate {
            message: &self.commit_message,
            content: STANDARD.encode(content.as_bytes()),
            sha: expected_revision,
            branch: self.branch.as_deref(),
        };
        let response = self
            .client
            .request(Method::PUT, &api_path)
            .json(&body)
            .send()
            .await
            .map_err(|error| backend(&format!("PUT {}", api_path), error))?;

        let status = response.status();
        if status.is_success() {
            let updated: ContentsUpdateResponse = response
                .json()
                .await
                .map_err(|error| backend(&format!("decode response of PUT {}", api_path), error))?;
            info!(repo = %self.repo, %path, revision = %updated.content.sha, "committed file");
            return Ok(updated.content.sha);
        }

        let text = response.text().await.unwrap_or_default();
        let message = error_message(&text);
        let is_conflict = status == StatusCode::CONFLICT
            || (status == StatusCode::UNPROCESSABLE_ENTITY && message.to_ascii_lowercase().contains("sha"));
        if is_conflict {
            return Err(StoreError::Conflict {
                path: path.to_string(),
                expected: expected_revision.map(str::to_string),
                actual: None,
            });
        }
        Err(StoreError::Backend(format!("HTTP {} for {}: {}", status.as_u16(), api_path, message)))
    }
}
