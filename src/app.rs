use crate::config::Config;
use crate::jira::{self, CustomFieldIds, Issue, JiraClient, JiraIssue};
use crate::markup::{self, Document};
use crate::timeline::layout::{self, Bar, Highlight};
use crate::timeline::stats::{self, Summary};
use crate::timeline::{self, Timeline};
use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate};
use ratatui::widgets::ListState;
use std::path::PathBuf;
use tracing::{info, warn};

/// Where the issue list is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueSource {
    Jql(String),
    Fixture(PathBuf),
}

impl IssueSource {
    pub fn describe(&self) -> String {
        match self {
            IssueSource::Jql(jql) => jql.clone(),
            IssueSource::Fixture(path) => format!("fixture {}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Details,
    Help,
}

/// One chart row: a scheduled issue and its bar, if it has one
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineRow {
    pub issue_idx: usize,
    pub period_idx: usize,
    pub bar: Option<Bar>,
}

pub struct App {
    // Config
    pub config: Config,
    pub source: Option<IssueSource>,
    pub field_ids: CustomFieldIds,
    /// Fixed "today" for reproducible output; wall clock when unset
    pub today_override: Option<NaiveDate>,

    // Data, rebuilt on every refresh
    pub issues: Vec<Issue>,
    pub timeline: Timeline,
    pub summary: Summary,
    pub rows: Vec<TimelineRow>,
    pub last_refreshed: Option<DateTime<Local>>,

    // UI state
    pub input_mode: InputMode,
    pub list_state: ListState,
    pub details_scroll: u16,
    pub details_scroll_max: u16,

    // Loading / status
    pub loading: bool,
    pub loading_message: String,
    pub spinner_frame: usize,
    pub status_message: Option<String>,
    pub status_is_error: bool,
    pub status_set_at: Option<std::time::Instant>,
}

impl App {
    pub fn new(config: Config, source: Option<IssueSource>, today_override: Option<NaiveDate>) -> Self {
        let field_ids = config.jira.fields.clone();
        let mut app = Self {
            config,
            source,
            field_ids,
            today_override,
            issues: Vec::new(),
            timeline: Timeline {
                periods: Vec::new(),
                buckets: Vec::new(),
                unscheduled: Vec::new(),
                today: NaiveDate::default(),
            },
            summary: Summary::default(),
            rows: Vec::new(),
            last_refreshed: None,
            input_mode: InputMode::Normal,
            list_state: ListState::default(),
            details_scroll: 0,
            details_scroll_max: 0,
            loading: false,
            loading_message: String::new(),
            spinner_frame: 0,
            status_message: None,
            status_is_error: false,
            status_set_at: None,
        };
        app.rebuild();
        app
    }

    /// Sampled once per rebuild so a pass never sees two different days
    pub fn today(&self) -> NaiveDate {
        self.today_override
            .unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn client(&self) -> Result<JiraClient> {
        if self.config.jira.base_url.is_empty() {
            anyhow::bail!("No Jira base_url configured");
        }
        Ok(JiraClient::new(&self.config.jira, self.config.settings.api_timeout)?
            .with_max_results(self.config.settings.max_results))
    }

    /// Fetch issues from the configured source and rebuild the timeline
    pub async fn load_issues(&mut self) -> Result<()> {
        let source = self
            .source
            .clone()
            .ok_or_else(|| anyhow::anyhow!("No epic, JQL or fixture configured"))?;

        let raw = match source {
            IssueSource::Fixture(path) => jira::load_fixture(&path)?,
            IssueSource::Jql(jql) => {
                let client = self.client()?;
                if self.config.settings.resolve_field_names {
                    let (fields, issues) = futures::future::try_join(
                        client.fetch_field_metadata(),
                        client.search_issues(&jql),
                    )
                    .await?;
                    self.field_ids = self.config.jira.fields.resolve(&fields);
                    issues
                } else {
                    client
                        .search_issues(&jql)
                        .await
                        .context("Failed to search issues")?
                }
            }
        };

        self.set_issues(&raw);
        Ok(())
    }

    /// Project raw issues and rebuild, keeping the selection on the same key
    pub fn set_issues(&mut self, raw: &[JiraIssue]) {
        let selected_key = self.selected_issue().map(|i| i.key.clone());

        self.issues = raw
            .iter()
            .map(|r| Issue::from_jira(r, &self.field_ids))
            .collect();
        self.rebuild();
        self.last_refreshed = Some(Local::now());

        let pos = selected_key
            .and_then(|key| self.rows.iter().position(|r| self.issues[r.issue_idx].key == key));
        self.list_state
            .select(pos.or(if self.rows.is_empty() { None } else { Some(0) }));
    }

    /// Recompute periods, buckets, bars and stats from `issues`
    pub fn rebuild(&mut self) {
        let today = self.today();
        let cfg = &self.config.timeline;
        let periods = timeline::generate_periods(cfg.anchor_date, cfg.period_count, cfg.numbering());
        let options = cfg.layout_options();

        self.timeline = timeline::bucket_issues(&self.issues, periods, today);
        self.summary = stats::summarize(&self.issues, &self.timeline);

        let mut rows = Vec::with_capacity(self.timeline.scheduled_count());
        for (period_idx, bucket) in self.timeline.buckets.iter().enumerate() {
            for &issue_idx in bucket {
                let issue = &self.issues[issue_idx];
                let bar = layout::compute_bar(issue, &self.timeline.periods, today, options);
                if bar.is_none() {
                    warn!(key = %issue.key, "scheduled issue has no drawable span");
                }
                rows.push(TimelineRow { issue_idx, period_idx, bar });
            }
        }
        self.rows = rows;

        info!(
            issues = self.issues.len(),
            scheduled = self.summary.scheduled,
            unscheduled = self.summary.unscheduled,
            %today,
            "timeline rebuilt"
        );

        if let Some(selected) = self.list_state.selected() {
            if selected >= self.rows.len() {
                self.list_state
                    .select(if self.rows.is_empty() { None } else { Some(0) });
            }
        }
    }

    pub fn current_highlight(&self) -> Option<Highlight> {
        let periods = &self.timeline.periods;
        layout::current_period(periods, self.timeline.today)
            .and_then(|p| layout::highlight(p, periods))
    }

    pub fn delivery_highlight(&self) -> Option<Highlight> {
        let periods = &self.timeline.periods;
        layout::period_containing(periods, self.config.timeline.delivery_target)
            .and_then(|p| layout::highlight(p, periods))
    }

    pub fn selected_row(&self) -> Option<&TimelineRow> {
        self.list_state.selected().and_then(|i| self.rows.get(i))
    }

    pub fn selected_issue(&self) -> Option<&Issue> {
        self.selected_row().and_then(|r| self.issues.get(r.issue_idx))
    }

    /// Parsed description of the selected issue
    pub fn selected_description(&self) -> Option<Document> {
        self.selected_issue()
            .and_then(|i| i.description.as_deref())
            .map(markup::parse_markup)
    }

    /// Selected issue as a markdown note: title, status line, description
    pub fn selected_markdown(&self) -> Option<String> {
        let issue = self.selected_issue()?;
        let mut content = format!("# {} {}\n\n", issue.key, issue.summary);
        content.push_str(&format!("**Status:** {}", issue.status));
        if let Some(points) = issue.story_points {
            content.push_str(&format!(" · **Points:** {points}"));
        }
        content.push_str("\n");
        if let Some(doc) = self.selected_description().filter(|d| !d.is_empty()) {
            content.push_str("\n## Description\n\n");
            content.push_str(&markup::render::to_markdown(&doc));
            content.push('\n');
        }
        Some(content)
    }

    pub fn browse_url(&self) -> Option<String> {
        let issue = self.selected_issue()?;
        if self.config.jira.base_url.is_empty() {
            return None;
        }
        Some(jira::client::browse_url(&self.config.jira.base_url, &issue.key))
    }

    pub fn open_details(&mut self) {
        if self.selected_issue().is_some() {
            self.input_mode = InputMode::Details;
            self.details_scroll = 0;
        }
    }

    pub fn close_popup(&mut self) {
        self.input_mode = InputMode::Normal;
        self.details_scroll = 0;
    }

    pub fn scroll_details(&mut self, delta: i32) {
        let next = (self.details_scroll as i32 + delta).clamp(0, self.details_scroll_max as i32);
        self.details_scroll = next as u16;
    }

    pub fn set_loading(&mut self, loading: bool, message: &str) {
        self.loading = loading;
        self.loading_message = message.to_string();
    }

    pub fn tick_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % 10;
    }

    pub fn spinner_char(&self) -> &'static str {
        const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
        SPINNER[self.spinner_frame]
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_is_error = false;
        self.status_set_at = Some(std::time::Instant::now());
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        warn!("{msg}");
        self.status_message = Some(msg);
        self.status_is_error = true;
        self.status_set_at = Some(std::time::Instant::now());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
        self.status_is_error = false;
        self.status_set_at = None;
    }

    /// Clear status message if it's older than 5 seconds
    pub fn clear_expired_status(&mut self) {
        if let Some(set_at) = self.status_set_at {
            if set_at.elapsed() > std::time::Duration::from_secs(5) {
                self.clear_status();
            }
        }
    }

    // Navigation
    pub fn list_next(&mut self) {
        let len = self.rows.len();
        if len == 0 { return; }
        // Stop at bottom, don't wrap
        let i = self.list_state.selected()
            .map(|i| (i + 1).min(len - 1))
            .unwrap_or(0);
        self.list_state.select(Some(i));
    }

    pub fn list_prev(&mut self) {
        if self.rows.is_empty() { return; }
        // Stop at top, don't wrap
        let i = self.list_state.selected()
            .map(|i| i.saturating_sub(1))
            .unwrap_or(0);
        self.list_state.select(Some(i));
    }

    pub fn list_top(&mut self) {
        if !self.rows.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn list_bottom(&mut self) {
        if !self.rows.is_empty() {
            self.list_state.select(Some(self.rows.len() - 1));
        }
    }

    pub fn list_jump_down(&mut self) {
        let len = self.rows.len();
        if len == 0 { return; }
        let jump = self.config.settings.page_jump;
        let i = self.list_state.selected()
            .map(|i| (i + jump).min(len - 1))
            .unwrap_or(0);
        self.list_state.select(Some(i));
    }

    pub fn list_jump_up(&mut self) {
        if self.rows.is_empty() { return; }
        let jump = self.config.settings.page_jump;
        let i = self.list_state.selected()
            .map(|i| i.saturating_sub(jump))
            .unwrap_or(0);
        self.list_state.select(Some(i));
    }
}
