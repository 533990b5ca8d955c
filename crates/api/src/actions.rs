//! Workflow listing and dispatch.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{GitHubClient, RepoRef, encode_segment, ensure_success};

/// A workflow registered with GitHub Actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub id: u64,
    pub name: String,
    /// Repository path of the definition, for example `.github/workflows/deploy.yml`.
    pub path: String,
    pub state: String,
}

impl WorkflowSummary {
    pub fn is_active(&self) -> bool {
        self.state == "active"
    }
}

#[derive(Debug, Deserialize)]
struct WorkflowList {
    #[serde(default)]
    workflows: Vec<WorkflowSummary>,
}

/// Active workflows of a repository.
pub async fn list_workflows(client: &GitHubClient, repo: &RepoRef) -> Result<Vec<WorkflowSummary>> {
    let list: WorkflowList = client
        .get_json(&repo.api_path("/actions/workflows"), &[("per_page", "100")])
        .await
        .with_context(|| format!("list workflows of {}", repo))?;
    Ok(list.workflows.into_iter().filter(WorkflowSummary::is_active).collect())
}

/// One run of a workflow, as listed after a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    /// `queued`, `in_progress` or `completed`.
    #[serde(default)]
    pub status: Option<String>,
    /// Set once the run has completed.
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub head_branch: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    pub html_url: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
struct RunList {
    #[serde(default)]
    workflow_runs: Vec<WorkflowRun>,
}

/// Number of runs fetched per listing, newest first.
const RUNS_PAGE_SIZE: &str = "10";

/// Recent runs of one workflow, or of the whole repository when `workflow` is `None`.
pub async fn list_runs(client: &GitHubClient, repo: &RepoRef, workflow: Option<&str>) -> Result<Vec<WorkflowRun>> {
    let path = match workflow {
        Some(workflow) => repo.api_path(&format!("/actions/workflows/{}/runs", encode_segment(workflow))),
        None => repo.api_path("/actions/runs"),
    };
    let list: RunList = client
        .get_json(&path, &[("per_page", RUNS_PAGE_SIZE)])
        .await
        .with_context(|| format!("list runs of {}", repo))?;
    Ok(list.workflow_runs)
}

/// A fully described dispatch call, ready to send or print.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchRequest {
    pub method: String,
    pub url: String,
    pub body: serde_json::Value,
}

/// Describes `POST .../actions/workflows/{workflow}/dispatches`.
///
/// `workflow` is a numeric id or the workflow file name.
pub fn dispatch_request(client: &GitHubClient, repo: &RepoRef, workflow: &str, git_ref: &str, inputs: &IndexMap<String, String>) -> DispatchRequest {
    DispatchRequest {
        method: Method::POST.to_string(),
        url: client.url(&dispatch_path(repo, workflow)),
        body: json!({ "ref": git_ref, "inputs": inputs }),
    }
}

fn dispatch_path(repo: &RepoRef, workflow: &str) -> String {
    repo.api_path(&format!("/actions/workflows/{}/dispatches", encode_segment(workflow)))
}

/// Triggers a `workflow_dispatch` event.
pub async fn dispatch_workflow(
    client: &GitHubClient,
    repo: &RepoRef,
    workflow: &str,
    git_ref: &str,
    inputs: &IndexMap<String, String>,
) -> Result<()> {
    let path = dispatch_path(repo, workflow);
    let response = client
        .request(Method::POST, &path)
        .json(&json!({ "ref": git_ref, "inputs": inputs }))
        .send()
        .await
        .with_context(|| format!("dispatch {} on {}", workflow, repo))?;
    ensure_success(response, &path).await?;
    info!(%repo, %workflow, %git_ref, "dispatched workflow");
    Ok(())
}
