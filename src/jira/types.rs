use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Status name that pins an issue to the current period
pub const IN_PROGRESS: &str = "In Progress";

/// Raw issue as returned by `/rest/api/2/search` and `/rest/api/2/issue/{key}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssue {
    pub key: String,
    pub fields: JiraIssueFields,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssueFields {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: JiraStatus,
    #[serde(default)]
    pub issuetype: Option<JiraIssueType>,
    #[serde(default)]
    pub assignee: Option<JiraUser>,
    #[serde(default)]
    pub resolutiondate: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    /// Everything else, custom fields included
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraStatus {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssueType {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
    pub display_name: String,
}

/// Field metadata from `/rest/api/2/field`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraField {
    pub id: String,
    pub name: String,
}

/// One page of `/rest/api/2/search`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub start_at: usize,
    #[serde(default)]
    pub max_results: usize,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub issues: Vec<JiraIssue>,
}

/// Ids of the custom fields that carry scheduling data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomFieldIds {
    pub story_points: String,
    pub due_date: String,
    pub start_date: String,
    pub end_date: String,
}

impl Default for CustomFieldIds {
    fn default() -> Self {
        Self {
            story_points: "customfield_10142".to_string(),
            due_date: "customfield_12362".to_string(),
            start_date: "customfield_14945".to_string(),
            end_date: "customfield_14946".to_string(),
        }
    }
}

impl CustomFieldIds {
    /// Replace ids with the ones whose display names match; unmatched names keep
    /// their configured id
    pub fn resolve(&self, fields: &[JiraField]) -> Self {
        let lookup = |name: &str, current: &str| {
            fields
                .iter()
                .find(|f| f.name == name)
                .map(|f| f.id.clone())
                .unwrap_or_else(|| current.to_string())
        };

        Self {
            story_points: lookup("Story Points", &self.story_points),
            due_date: lookup("Due Date", &self.due_date),
            start_date: lookup("Start Date", &self.start_date),
            end_date: lookup("End Date", &self.end_date),
        }
    }
}

/// Domain view of an issue, read-only to the timeline
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub key: String,
    pub summary: String,
    pub description: Option<String>,
    pub status: String,
    pub issue_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub resolution_date: Option<NaiveDate>,
    pub created: Option<NaiveDate>,
    pub updated: Option<NaiveDate>,
    pub story_points: Option<f64>,
    pub assignee: Option<String>,
}

impl Issue {
    pub fn from_jira(raw: &JiraIssue, ids: &CustomFieldIds) -> Self {
        let fields = &raw.fields;
        let date_field = |id: &str| {
            fields
                .extra
                .get(id)
                .and_then(|v| v.as_str())
                .and_then(parse_jira_date)
        };

        Self {
            key: raw.key.clone(),
            summary: fields.summary.clone(),
            description: fields.description.clone().filter(|d| !d.is_empty()),
            status: fields.status.name.clone(),
            issue_type: fields.issuetype.as_ref().map(|t| t.name.clone()),
            start_date: date_field(&ids.start_date),
            end_date: date_field(&ids.end_date),
            due_date: date_field(&ids.due_date),
            resolution_date: fields.resolutiondate.as_deref().and_then(parse_jira_date),
            created: fields.created.as_deref().and_then(parse_jira_date),
            updated: fields.updated.as_deref().and_then(parse_jira_date),
            story_points: fields
                .extra
                .get(&ids.story_points)
                .and_then(number_value),
            assignee: fields.assignee.as_ref().map(|a| a.display_name.clone()),
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == IN_PROGRESS
    }

    pub fn is_done(&self) -> bool {
        self.resolution_date.is_some()
    }

    pub fn points(&self) -> f64 {
        self.story_points.unwrap_or(0.0)
    }

    /// Empty, half, full: not started, in progress, resolved
    pub fn state_icon(&self) -> &'static str {
        if self.is_done() {
            return "●";
        }
        if self.is_in_progress() {
            "◐"
        } else {
            "○"
        }
    }
}

/// Parse the date formats Jira hands out: plain dates for date pickers,
/// `2025-07-01T10:00:00.000+0000` for timestamps, and RFC 3339 from fixtures
pub fn parse_jira_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.date_naive());
    }
    DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive())
}

fn number_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Fixture files hold either a bare issue array or a saved search response
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum IssueFixture {
    Issues(Vec<JiraIssue>),
    Search(SearchResponse),
}

impl IssueFixture {
    pub fn into_issues(self) -> Vec<JiraIssue> {
        match self {
            IssueFixture::Issues(issues) => issues,
            IssueFixture::Search(page) => page.issues,
        }
    }
}

/// Read issues from a fixture file instead of the API
pub fn load_fixture(path: &Path) -> Result<Vec<JiraIssue>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixture {}", path.display()))?;
    let fixture: IssueFixture = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse fixture {}", path.display()))?;
    Ok(fixture.into_issues())
}
