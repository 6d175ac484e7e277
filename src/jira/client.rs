use crate::config::JiraConfig;
use crate::jira::types::*;
use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// HTTP failures worth telling apart in the status bar
#[derive(Debug, Error)]
pub enum JiraError {
    #[error("Jira rejected the token ({0}). Check token / token_env in config.toml")]
    NotAuthenticated(StatusCode),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Jira request failed: {status} - {body}")]
    Status { status: StatusCode, body: String },
}

pub struct JiraClient {
    http: Client,
    pub base_url: String,
    token: Option<String>,
    pub max_results: usize,
}

impl JiraClient {
    pub fn new(config: &JiraConfig, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.resolve_token(),
            max_results: 100,
        })
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    /// GET a REST path and parse the JSON body
    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, ?query, "jira GET");

        let mut request = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to reach Jira at {}", self.base_url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, %url, "jira request failed");
            let err = match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => JiraError::NotAuthenticated(status),
                StatusCode::NOT_FOUND => JiraError::NotFound(path.to_string()),
                _ => JiraError::Status {
                    status,
                    body: body.trim().chars().take(200).collect(),
                },
            };
            return Err(err.into());
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse Jira response for {path}"))
    }

    /// Run a JQL search, following pages until `total` is reached
    pub async fn search_issues(&self, jql: &str) -> Result<Vec<JiraIssue>> {
        let mut issues = Vec::new();
        let mut start_at = 0usize;

        loop {
            let page: SearchResponse = self
                .get(
                    "/rest/api/2/search",
                    &[
                        ("jql", jql.to_string()),
                        ("startAt", start_at.to_string()),
                        ("maxResults", self.max_results.to_string()),
                    ],
                )
                .await?;

            let fetched = page.issues.len();
            issues.extend(page.issues);
            start_at += fetched;

            if fetched == 0 || start_at >= page.total {
                break;
            }
        }

        debug!(count = issues.len(), %jql, "search finished");
        Ok(issues)
    }

    /// All issues linked to an epic
    pub async fn fetch_issues_by_epic(&self, epic_key: &str) -> Result<Vec<JiraIssue>> {
        self.search_issues(&epic_jql(epic_key)).await
    }

    pub async fn fetch_field_metadata(&self) -> Result<Vec<JiraField>> {
        self.get("/rest/api/2/field", &[]).await
    }

    pub async fn field_by_name(&self, name: &str) -> Result<Option<JiraField>> {
        let fields = self.fetch_field_metadata().await?;
        Ok(fields.into_iter().find(|f| f.name == name))
    }

    pub async fn get_issue(&self, key: &str) -> Result<JiraIssue> {
        let path = format!("/rest/api/2/issue/{}", urlencoding::encode(key));
        self.get(&path, &[]).await
    }

    /// Browser URL for an issue
    pub fn browse_url(&self, key: &str) -> String {
        browse_url(&self.base_url, key)
    }
}

pub fn epic_jql(epic_key: &str) -> String {
    format!("\"Epic Link\"={epic_key}")
}

pub fn browse_url(base_url: &str, key: &str) -> String {
    format!(
        "{}/browse/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(key)
    )
}
