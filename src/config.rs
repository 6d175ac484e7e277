use crate::jira::CustomFieldIds;
use crate::timeline::layout::LayoutOptions;
use crate::timeline::SprintNumber;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub jira: JiraConfig,
    pub timeline: TimelineConfig,
    pub theme: Theme,
    pub settings: Settings,
    pub keybindings: Keybindings,
}

/// Where issues come from and how to authenticate
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    pub base_url: String,
    /// Bearer token; prefer `token_env` so it stays out of the file
    pub token: Option<String>,
    /// Environment variable holding the bearer token
    pub token_env: String,
    /// Epic whose issues are shown (used when `jql` is empty)
    pub epic: Option<String>,
    /// Raw JQL, wins over `epic`
    pub jql: Option<String>,
    pub fields: CustomFieldIds,
}

/// Period horizon and markers
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// First day of the first period
    pub anchor_date: NaiveDate,
    /// Number of 14-day periods (13 = half a year, 26 = a year)
    pub period_count: usize,
    /// Deadline highlighted on the chart
    pub delivery_target: NaiveDate,
    /// Sprint number of the first period; unset shows dates only
    pub sprint_major: Option<u32>,
    pub sprint_minor: Option<u32>,
    /// Explicit start/end dates win over "In Progress" when placing bars
    pub prefer_explicit_dates: bool,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Auto-refresh interval in seconds (0 to disable)
    pub refresh_interval: u64,
    /// Number of rows to jump with Ctrl+D/U
    pub page_jump: usize,
    /// API request timeout in seconds
    pub api_timeout: u64,
    /// Page size for issue searches
    pub max_results: usize,
    /// Look custom field ids up by display name before projecting issues
    pub resolve_field_names: bool,
}

/// Customizable keybindings (single character keys)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Keybindings {
    pub down: char,
    pub up: char,
    pub top: char,
    pub bottom: char,
    pub open: char,
    pub copy_key: char,
    pub copy_details: char,
    pub refresh: char,
    pub help: char,
    pub quit: char,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub border: String,
    pub border_active: String,
    pub selected_bg: String,
    pub text: String,
    pub text_muted: String,
    pub highlight: String,
    pub current_period_bg: String,
    pub delivery_period_bg: String,
    pub bar_todo: String,
    pub bar_in_progress: String,
    pub bar_done: String,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: None,
            token_env: "JIRA_API_TOKEN".to_string(),
            epic: None,
            jql: None,
            fields: CustomFieldIds::default(),
        }
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            anchor_date: NaiveDate::from_ymd_opt(2025, 6, 12).unwrap_or_default(),
            period_count: 13,
            delivery_target: NaiveDate::from_ymd_opt(2025, 10, 2).unwrap_or_default(),
            sprint_major: None,
            sprint_minor: None,
            prefer_explicit_dates: false,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_interval: 300, // 5 minutes
            page_jump: 10,
            api_timeout: 30,
            max_results: 100,
            resolve_field_names: false,
        }
    }
}

impl Default for Keybindings {
    fn default() -> Self {
        Self {
            // Navigation (vim-style)
            down: 'j',
            up: 'k',
            top: 'g',
            bottom: 'G',
            // Actions
            open: 'o',
            copy_key: 'y',
            copy_details: 'Y',
            refresh: 'r',
            help: '?',
            quit: 'q',
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            // One Dark color scheme
            border: "#5c6370".to_string(),             // Gray
            border_active: "#61afef".to_string(),      // Blue
            selected_bg: "#2c323c".to_string(),        // Dark gray
            text: "#abb2bf".to_string(),               // Light gray
            text_muted: "#5c6370".to_string(),         // Muted gray
            highlight: "#61afef".to_string(),          // Blue
            current_period_bg: "#2c3b4c".to_string(),  // Dim blue
            delivery_period_bg: "#4a2f35".to_string(), // Dim red
            bar_todo: "#61afef".to_string(),           // Blue
            bar_in_progress: "#e5c07b".to_string(),    // Yellow
            bar_done: "#98c379".to_string(),           // Green
        }
    }
}

impl JiraConfig {
    /// Token from the config file, else from `token_env`
    pub fn resolve_token(&self) -> Option<String> {
        self.token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var(&self.token_env).ok().filter(|t| !t.is_empty()))
    }

    /// JQL to run: explicit query first, then the epic
    pub fn query(&self) -> Option<String> {
        self.jql
            .clone()
            .filter(|q| !q.trim().is_empty())
            .or_else(|| self.epic.as_deref().map(crate::jira::client::epic_jql))
    }
}

impl TimelineConfig {
    pub fn numbering(&self) -> Option<SprintNumber> {
        self.sprint_major
            .map(|major| SprintNumber::new(major, self.sprint_minor.unwrap_or(1)))
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            prefer_explicit_dates: self.prefer_explicit_dates,
        }
    }
}

impl Config {
    /// Search the usual places, falling back to defaults
    pub fn load() -> Self {
        let mut candidates = Vec::new();
        // 1. XDG config path (~/.config/waterfall/config.toml)
        if let Some(home_dir) = dirs::home_dir() {
            candidates.push(home_dir.join(".config").join("waterfall").join("config.toml"));
        }
        // 2. Platform-specific config dir (~/Library/Application Support/ on macOS)
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("waterfall").join("config.toml"));
        }
        // 3. ~/.waterfall.toml
        if let Some(home_dir) = dirs::home_dir() {
            candidates.push(home_dir.join(".waterfall.toml"));
        }

        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::load_from(&path) {
                Ok(config) => return config,
                Err(e) => warn!(path = %path.display(), "ignoring config: {e:#}"),
            }
        }

        Config::default()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!(path = %path.display(), "config loaded");
        config.validate();
        Ok(config)
    }

    fn validate(&self) {
        if !matches!(self.timeline.period_count, 13 | 26) {
            warn!(
                period_count = self.timeline.period_count,
                "unusual period_count, expected 13 or 26"
            );
        }
    }
}

impl Theme {
    pub fn parse_color(&self, hex: &str) -> ratatui::style::Color {
        // Parse hex color string (e.g., "#61afef")
        if hex.is_ascii() && hex.starts_with('#') && hex.len() == 7 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[1..3], 16),
                u8::from_str_radix(&hex[3..5], 16),
                u8::from_str_radix(&hex[5..7], 16),
            ) {
                return ratatui::style::Color::Rgb(r, g, b);
            }
        }
        // Fallback to white if parsing fails
        ratatui::style::Color::White
    }

    /// Bar colour by issue state
    pub fn bar_color(&self, status: &str, done: bool) -> ratatui::style::Color {
        if done {
            return self.parse_color(&self.bar_done);
        }
        match status {
            crate::jira::IN_PROGRESS => self.parse_color(&self.bar_in_progress),
            _ => self.parse_color(&self.bar_todo),
        }
    }

    /// Get foreground and background colors for a status badge
    pub fn status_badge_colors(&self, status: &str, done: bool) -> (ratatui::style::Color, ratatui::style::Color) {
        use ratatui::style::Color;
        if done {
            return (Color::Rgb(80, 200, 120), Color::Rgb(25, 55, 35));
        }
        match status {
            crate::jira::IN_PROGRESS => (Color::Rgb(200, 180, 60), Color::Rgb(60, 55, 20)),
            "Blocked" => (Color::Rgb(220, 80, 80), Color::Rgb(65, 25, 25)),
            _ => (Color::Rgb(140, 140, 140), Color::Rgb(50, 50, 50)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.timeline.period_count, 13);
        assert_eq!(config.timeline.anchor_date.to_string(), "2025-06-12");
        assert_eq!(config.jira.token_env, "JIRA_API_TOKEN");
        assert_eq!(config.jira.fields.start_date, "customfield_14945");
        assert!(config.timeline.numbering().is_none());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let file = write_config(
            r#"
[jira]
base_url = "https://jira.example.com"
epic = "SFG-62"

[jira.fields]
start_date = "customfield_1"

[timeline]
anchor_date = "2025-07-24"
period_count = 26
sprint_major = 3

[settings]
refresh_interval = 0
"#,
        );

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.jira.base_url, "https://jira.example.com");
        assert_eq!(config.jira.fields.start_date, "customfield_1");
        assert_eq!(config.jira.fields.end_date, "customfield_14946");
        assert_eq!(config.timeline.period_count, 26);
        assert_eq!(config.timeline.anchor_date.to_string(), "2025-07-24");
        assert_eq!(config.timeline.numbering(), Some(SprintNumber::new(3, 1)));
        assert_eq!(config.settings.refresh_interval, 0);
        assert_eq!(config.settings.page_jump, 10);
        assert_eq!(config.keybindings.quit, 'q');
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let file = write_config("[timeline]\nanchor_date = \"not a date\"\n");
        assert!(Config::load_from(file.path()).is_err());
    }

    #[test]
    fn test_query_prefers_jql() {
        let mut jira = JiraConfig {
            epic: Some("SFG-62".into()),
            ..JiraConfig::default()
        };
        assert_eq!(jira.query().as_deref(), Some("\"Epic Link\"=SFG-62"));

        jira.jql = Some("project = WDY".into());
        assert_eq!(jira.query().as_deref(), Some("project = WDY"));

        jira.jql = Some("  ".into());
        assert_eq!(jira.query().as_deref(), Some("\"Epic Link\"=SFG-62"));
    }

    #[test]
    fn test_token_from_config_wins() {
        let jira = JiraConfig {
            token: Some("abc".into()),
            token_env: "WATERFALL_TEST_TOKEN_UNSET".into(),
            ..JiraConfig::default()
        };
        assert_eq!(jira.resolve_token().as_deref(), Some("abc"));

        let empty = JiraConfig {
            token: Some(String::new()),
            token_env: "WATERFALL_TEST_TOKEN_UNSET".into(),
            ..JiraConfig::default()
        };
        assert_eq!(empty.resolve_token(), None);
    }

    #[test]
    fn test_parse_color() {
        use ratatui::style::Color;
        let theme = Theme::default();
        assert_eq!(theme.parse_color("#61afef"), Color::Rgb(0x61, 0xaf, 0xef));
        assert_eq!(theme.parse_color("blue"), Color::White);
        // Seven bytes but a multi-byte char straddles the slice bounds
        assert_eq!(theme.parse_color("#a\u{e9}123"), Color::White);
    }

    #[test]
    fn test_bar_color_done_wins() {
        let theme = Theme::default();
        assert_eq!(theme.bar_color("In Progress", true), theme.parse_color(&theme.bar_done));
        assert_eq!(
            theme.bar_color("In Progress", false),
            theme.parse_color(&theme.bar_in_progress)
        );
    }
}
