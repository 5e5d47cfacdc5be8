//! GitHub API client over the shared transport

use byelinear_core::config::{GITHUB_API_URL, GITHUB_GRAPHQL_URL};
use byelinear_core::graphql::{self, GraphQLRequest};
use byelinear_core::transport::authenticated_client;
use byelinear_core::{ratelimit, Error, Result, Transport};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::envelope::{decode_graphql, decode_rest};

/// GitHub API client for one repository and its owning organization
pub struct GitHubClient<T = reqwest::Client> {
    transport: T,
    owner: String,
    repo: String,
    api_url: String,
    graphql_url: String,
}

impl GitHubClient<reqwest::Client> {
    /// Create a client authenticated with a personal access token
    pub fn new(token: &str, owner: impl Into<String>, repo: impl Into<String>) -> Result<Self> {
        let transport = authenticated_client(
            &format!("Bearer {}", token),
            &[
                ("accept", "application/vnd.github+json"),
                ("x-github-api-version", "2022-11-28"),
            ],
        )?;
        let client = Self::with_transport(transport, owner, repo);
        info!(owner = %client.owner, repo = %client.repo, "Created GitHub client");
        Ok(client)
    }
}

impl<T: Transport> GitHubClient<T> {
    /// Create a client over an existing transport
    pub fn with_transport(transport: T, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            transport,
            owner: owner.into(),
            repo: repo.into(),
            api_url: GITHUB_API_URL.to_string(),
            graphql_url: GITHUB_GRAPHQL_URL.to_string(),
        }
    }

    /// Override the REST and GraphQL endpoints (e.g. for GitHub Enterprise)
    pub fn endpoints(mut self, api_url: impl Into<String>, graphql_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self.graphql_url = graphql_url.into();
        self
    }

    /// Get the repository owner (also the organization owning the project board)
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get the repository name
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Call a repository-scoped REST endpoint, e.g. `issues/12/comments`
    pub(crate) async fn rest<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &Value,
    ) -> Result<R> {
        let url = format!("{}/repos/{}/{}/{}", self.api_url, self.owner, self.repo, path);
        debug!(%method, url = %url, "GitHub REST request");

        let response = self
            .transport
            .send(method, &url, Some(body))
            .await
            .inspect_err(ratelimit::report)?;
        decode_rest(&response.body)
    }

    /// Run a GraphQL query or mutation and decode its `data`
    pub(crate) async fn graphql<R: DeserializeOwned>(&self, request: &GraphQLRequest) -> Result<R> {
        let response = graphql::execute(&self.transport, &self.graphql_url, request)
            .await
            .inspect_err(ratelimit::report)?;
        decode_graphql(&response.body)
    }
}

impl<T> std::fmt::Debug for GitHubClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}

/// Parse a GitHub repository reference into owner and repo
///
/// Supports formats:
/// - owner/repo
/// - https://github.com/owner/repo
/// - git@github.com:owner/repo.git
pub fn parse_github_url(url: &str) -> Result<(String, String)> {
    if !url.contains(':') && !url.contains('/') {
        return Err(Error::Parse(format!(
            "Invalid repository format: {}. Expected owner/repo",
            url
        )));
    }

    if !url.contains("://") && !url.contains('@') {
        let parts: Vec<&str> = url.split('/').collect();
        if parts.len() == 2 && parts.iter().all(|p| !p.is_empty()) {
            return Ok((
                parts[0].to_string(),
                parts[1].trim_end_matches(".git").to_string(),
            ));
        }
        return Err(Error::Parse(format!(
            "Invalid repository format: {}. Expected owner/repo",
            url
        )));
    }

    if url.starts_with("https://") || url.starts_with("http://") {
        let url = url::Url::parse(url).map_err(|e| Error::Parse(e.to_string()))?;
        let path = url.path().trim_start_matches('/').trim_end_matches(".git");
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() >= 2 {
            return Ok((parts[0].to_string(), parts[1].to_string()));
        }
        return Err(Error::Parse(format!("Invalid GitHub URL path: {}", path)));
    }

    if url.starts_with("git@") {
        if let Some(path) = url.split(':').nth(1) {
            let path = path.trim_end_matches(".git");
            let parts: Vec<&str> = path.split('/').collect();
            if parts.len() >= 2 {
                return Ok((parts[0].to_string(), parts[1].to_string()));
            }
        }
        return Err(Error::Parse(format!("Invalid SSH URL: {}", url)));
    }

    Err(Error::Parse(format!("Unrecognized URL format: {}", url)))
}
