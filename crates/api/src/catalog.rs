//! Repository list endpoints as dynamic option sources.

use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;
use wdui_engine::{OptionsProvider, expand_endpoint, options_from_api_payload};
use wdui_types::{OptionsSource, OptionsSourceKind, SelectOption};

use crate::{GitHubClient, RepoRef};

const PAGE_SIZE: &str = "50";
const LABEL_PAGE_SIZE: &str = "100";

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Environments {
    #[serde(default)]
    environments: Vec<Named>,
}

#[derive(Debug, Deserialize)]
struct Collaborator {
    login: String,
}

#[derive(Debug, Deserialize)]
struct Milestone {
    title: String,
}

/// Option lists for one repository.
#[derive(Debug, Clone)]
pub struct RepoCatalog {
    client: GitHubClient,
    repo: RepoRef,
}

impl RepoCatalog {
    pub fn new(client: GitHubClient, repo: RepoRef) -> Self {
        Self { client, repo }
    }

    async fn list<T: serde::de::DeserializeOwned>(&self, suffix: &str, per_page: &str) -> Result<Vec<T>> {
        self.client
            .get_json(&self.repo.api_path(suffix), &[("per_page", per_page)])
            .await
    }

    async fn api_options(&self, source: &OptionsSource) -> Result<Vec<SelectOption>> {
        let Some(endpoint) = source.endpoint.as_deref().filter(|endpoint| !endpoint.trim().is_empty()) else {
            bail!("'api' option sources need an endpoint");
        };
        let path = expand_endpoint(endpoint, &self.repo.owner, &self.repo.name);
        let payload: JsonValue = self.client.get_json(&path, &[]).await?;
        Ok(options_from_api_payload(&payload, source))
    }
}

#[async_trait]
impl OptionsProvider for RepoCatalog {
    async fn list_options(&self, source: &OptionsSource) -> Result<Vec<SelectOption>> {
        debug!(repo = %self.repo, source = source.source.as_str(), "listing options");
        let options = match source.source {
            OptionsSourceKind::Tags => self
                .list::<Named>("/tags", PAGE_SIZE)
                .await?
                .into_iter()
                .map(|tag| SelectOption::plain(tag.name))
                .collect(),
            OptionsSourceKind::Branches => self
                .list::<Named>("/branches", PAGE_SIZE)
                .await?
                .into_iter()
                .map(|branch| SelectOption::plain(branch.name))
                .collect(),
            OptionsSourceKind::Releases => self
                .list::<Release>("/releases", PAGE_SIZE)
                .await?
                .into_iter()
                .map(|release| {
                    let label = release.name.filter(|name| !name.is_empty()).unwrap_or_else(|| release.tag_name.clone());
                    SelectOption::new(release.tag_name, label)
                })
                .collect(),
            OptionsSourceKind::Environments => {
                let environments: Environments = self.client.get_json(&self.repo.api_path("/environments"), &[]).await?;
                environments
                    .environments
                    .into_iter()
                    .map(|environment| SelectOption::plain(environment.name))
                    .collect()
            }
            OptionsSourceKind::Collaborators => self
                .list::<Collaborator>("/collaborators", PAGE_SIZE)
                .await?
                .into_iter()
                .map(|collaborator| SelectOption::plain(collaborator.login))
                .collect(),
            OptionsSourceKind::Labels => self
                .list::<Named>("/labels", LABEL_PAGE_SIZE)
                .await?
                .into_iter()
                .map(|label| SelectOption::plain(label.name))
                .collect(),
            OptionsSourceKind::Milestones => self
                .list::<Milestone>("/milestones", PAGE_SIZE)
                .await?
                .into_iter()
                .map(|milestone| SelectOption::plain(milestone.title))
                .collect(),
            OptionsSourceKind::Api => self.api_options(source).await?,
        };
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn catalog(server: &MockServer) -> RepoCatalog {
        let client = GitHubClient::new(&server.uri(), None).expect("client");
        RepoCatalog::new(client, RepoRef::new("octo", "app"))
    }

    #[tokio::test]
    async fn releases_fall_back_to_tag_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/app/releases"))
            .and(query_param("per_page", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"tag_name": "v2.0.0", "name": "Big release"},
                {"tag_name": "v1.0.0", "name": null},
                {"tag_name": "v0.1.0", "name": ""}
            ])))
            .mount(&server)
            .await;

        let options = catalog(&server)
            .await
            .list_options(&OptionsSource::new(OptionsSourceKind::Releases))
            .await
            .expect("releases");
        assert_eq!(
            options,
            vec![
                SelectOption::new("v2.0.0", "Big release"),
                SelectOption::plain("v1.0.0"),
                SelectOption::plain("v0.1.0"),
            ]
        );
    }

    #[tokio::test]
    async fn environments_are_unwrapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/app/environments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 2,
                "environments": [{"name": "staging"}, {"name": "production"}]
            })))
            .mount(&server)
            .await;

        let options = catalog(&server)
            .await
            .list_options(&OptionsSource::new(OptionsSourceKind::Environments))
            .await
            .expect("environments");
        assert_eq!(options, vec![SelectOption::plain("staging"), SelectOption::plain("production")]);
    }

    #[tokio::test]
    async fn api_sources_expand_placeholders() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/app/deployments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"sha": "abc", "environment": "staging"}
            ])))
            .mount(&server)
            .await;

        let source = OptionsSource {
            source: OptionsSourceKind::Api,
            endpoint: Some("/repos/{owner}/{repo}/deployments".into()),
            value_path: Some("sha".into()),
            label_path: Some("environment".into()),
        };
        let options = catalog(&server).await.list_options(&source).await.expect("api options");
        assert_eq!(options, vec![SelectOption::new("abc", "staging")]);
    }

    #[tokio::test]
    async fn api_source_without_endpoint_fails() {
        let server = MockServer::start().await;
        let result = catalog(&server)
            .await
            .list_options(&OptionsSource::new(OptionsSourceKind::Api))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn http_errors_propagate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "API rate limit exceeded"})))
            .mount(&server)
            .await;

        let error = catalog(&server)
            .await
            .list_options(&OptionsSource::new(OptionsSourceKind::Tags))
            .await
            .expect_err("rate limited");
        assert!(error.to_string().contains("rate limit"));
    }
}
