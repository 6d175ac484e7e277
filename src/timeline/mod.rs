//! Fixed-length period bucketing.
//!
//! The horizon is tiled by `period_count` consecutive 14-day periods starting at an
//! anchor date. Each issue lands in at most one period, picked by its status and
//! dates; issues that match nothing are kept aside as unscheduled.

pub mod layout;
pub mod stats;

use crate::jira::Issue;
use chrono::{Duration, NaiveDate};
use std::fmt;
use tracing::debug;

/// Calendar days per period
pub const PERIOD_DAYS: i64 = 14;

/// Sprint number shown in period labels; minor cycles 1..=3 before major moves on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SprintNumber {
    pub major: u32,
    pub minor: u32,
}

impl SprintNumber {
    pub const MINORS_PER_MAJOR: u32 = 3;

    pub fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor: minor.clamp(1, Self::MINORS_PER_MAJOR),
        }
    }

    pub fn next(self) -> Self {
        if self.minor >= Self::MINORS_PER_MAJOR {
            Self { major: self.major + 1, minor: 1 }
        } else {
            Self { major: self.major, minor: self.minor + 1 }
        }
    }
}

impl fmt::Display for SprintNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Inclusive `[start, end]` date range, `end = start + 13 days`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub index: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub sprint: Option<SprintNumber>,
}

impl Period {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn label(&self) -> String {
        match self.sprint {
            Some(sprint) => format!("{} - {} - {}", sprint, self.start, self.end),
            None => format!("{} - {}", self.start, self.end),
        }
    }

    /// Compact label for chart headers
    pub fn short_label(&self) -> String {
        match self.sprint {
            Some(sprint) => sprint.to_string(),
            None => self.start.format("%m/%d").to_string(),
        }
    }
}

/// Tile the horizon starting at `anchor`
pub fn generate_periods(
    anchor: NaiveDate,
    period_count: usize,
    numbering: Option<SprintNumber>,
) -> Vec<Period> {
    let mut periods = Vec::with_capacity(period_count);
    let mut start = anchor;
    let mut sprint = numbering;

    for index in 0..period_count {
        periods.push(Period {
            index,
            start,
            end: start + Duration::days(PERIOD_DAYS - 1),
            sprint,
        });
        start += Duration::days(PERIOD_DAYS);
        sprint = sprint.map(SprintNumber::next);
    }

    periods
}

/// Why an issue ended up in its period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    CurrentPeriod,
    StartDate,
    ResolutionDate,
}

/// First period whose range contains `date`
pub fn find_period(periods: &[Period], date: NaiveDate) -> Option<usize> {
    periods.iter().position(|p| p.contains(date))
}

/// Pick the period for one issue; `None` drops it from the timeline
pub fn place_issue(
    issue: &Issue,
    periods: &[Period],
    today: NaiveDate,
) -> Option<(usize, Placement)> {
    if issue.is_in_progress() {
        if let Some(idx) = find_period(periods, today) {
            return Some((idx, Placement::CurrentPeriod));
        }
    }

    let (reference, placement) = match (issue.start_date, issue.resolution_date) {
        (Some(start), _) => (start, Placement::StartDate),
        (None, Some(resolved)) => (resolved, Placement::ResolutionDate),
        (None, None) => return None,
    };

    find_period(periods, reference).map(|idx| (idx, placement))
}

/// Periods in chronological order with the indices of the issues assigned to them
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub periods: Vec<Period>,
    /// `buckets[i]` holds indices into the bucketed issue slice, input order kept
    pub buckets: Vec<Vec<usize>>,
    pub unscheduled: Vec<usize>,
    pub today: NaiveDate,
}

impl Timeline {
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|b| b.is_empty())
    }

    pub fn scheduled_count(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// Period index of an issue, if it was scheduled
    pub fn period_of(&self, issue_idx: usize) -> Option<usize> {
        self.buckets.iter().position(|b| b.contains(&issue_idx))
    }

    pub fn current_period(&self) -> Option<&Period> {
        find_period(&self.periods, self.today).map(|idx| &self.periods[idx])
    }

    /// Ordered label -> issues view
    pub fn entries<'a>(&'a self, issues: &'a [Issue]) -> Vec<(String, Vec<&'a Issue>)> {
        self.periods
            .iter()
            .zip(&self.buckets)
            .map(|(period, bucket)| {
                (
                    period.label(),
                    bucket.iter().filter_map(|&i| issues.get(i)).collect(),
                )
            })
            .collect()
    }

    /// Issue indices in display order: period by period
    pub fn ordered_issues(&self) -> Vec<usize> {
        self.buckets.iter().flatten().copied().collect()
    }
}

/// Assign every issue to at most one period
pub fn bucket_issues(issues: &[Issue], periods: Vec<Period>, today: NaiveDate) -> Timeline {
    let mut buckets = vec![Vec::new(); periods.len()];
    let mut unscheduled = Vec::new();

    for (issue_idx, issue) in issues.iter().enumerate() {
        match place_issue(issue, &periods, today) {
            Some((period_idx, placement)) => {
                debug!(key = %issue.key, period = period_idx, ?placement, "bucketed");
                buckets[period_idx].push(issue_idx);
            }
            None => {
                debug!(key = %issue.key, "no matching period");
                unscheduled.push(issue_idx);
            }
        }
    }

    Timeline {
        periods,
        buckets,
        unscheduled,
        today,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::jira::Issue;
    use chrono::NaiveDate;

    pub fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub fn make_issue(key: &str, status: &str) -> Issue {
        Issue {
            key: key.to_string(),
            summary: format!("Summary of {key}"),
            description: None,
            status: status.to_string(),
            issue_type: None,
            start_date: None,
            end_date: None,
            due_date: None,
            resolution_date: None,
            created: None,
            updated: None,
            story_points: None,
            assignee: None,
        }
    }

    pub fn with_start(mut issue: Issue, start: &str) -> Issue {
        issue.start_date = Some(d(start));
        issue
    }

    pub fn with_range(mut issue: Issue, start: &str, end: &str) -> Issue {
        issue.start_date = Some(d(start));
        issue.end_date = Some(d(end));
        issue
    }

    pub fn with_resolution(mut issue: Issue, resolved: &str) -> Issue {
        issue.resolution_date = Some(d(resolved));
        issue
    }
}
