use crate::jira::Issue;
use crate::timeline::Timeline;

/// Load carried by one period
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodLoad {
    pub label: String,
    pub short_label: String,
    pub issues: usize,
    pub points: f64,
}

/// Header numbers for the dashboard
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub scheduled: usize,
    pub unscheduled: usize,
    pub in_progress: usize,
    pub done: usize,
    pub total_points: f64,
    pub done_points: f64,
    pub periods: Vec<PeriodLoad>,
}

impl Summary {
    /// Share of story points already resolved, 0..=100
    pub fn points_done_pct(&self) -> f64 {
        if self.total_points > 0.0 {
            100.0 * self.done_points / self.total_points
        } else {
            0.0
        }
    }

    /// Busiest period by story points
    pub fn peak_period(&self) -> Option<&PeriodLoad> {
        self.periods
            .iter()
            .filter(|p| p.issues > 0)
            .max_by(|a, b| a.points.total_cmp(&b.points))
    }
}

/// Story points of `issues`; an empty set is `+0.0`, never `-0.0`
fn total_points<'a>(issues: impl Iterator<Item = &'a Issue>) -> f64 {
    issues.map(Issue::points).fold(0.0, |acc, p| acc + p)
}

pub fn summarize(issues: &[Issue], timeline: &Timeline) -> Summary {
    let periods = timeline
        .periods
        .iter()
        .zip(&timeline.buckets)
        .map(|(period, bucket)| PeriodLoad {
            label: period.label(),
            short_label: period.short_label(),
            issues: bucket.len(),
            points: total_points(bucket.iter().filter_map(|&i| issues.get(i))),
        })
        .collect();

    Summary {
        total: issues.len(),
        scheduled: timeline.scheduled_count(),
        unscheduled: timeline.unscheduled.len(),
        in_progress: issues.iter().filter(|i| i.is_in_progress()).count(),
        done: issues.iter().filter(|i| i.is_done()).count(),
        total_points: total_points(issues.iter()),
        done_points: total_points(issues.iter().filter(|i| i.is_done())),
        periods,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::test_support::*;
    use crate::timeline::{bucket_issues, generate_periods};

    fn pointed(mut issue: Issue, points: f64) -> Issue {
        issue.story_points = Some(points);
        issue
    }

    #[test]
    fn test_summarize_counts() {
        let issues = vec![
            pointed(with_start(make_issue("A", "To Do"), "2025-06-12"), 3.0),
            pointed(make_issue("B", "In Progress"), 5.0),
            pointed(with_resolution(make_issue("C", "Done"), "2025-06-30"), 2.0),
            make_issue("D", "To Do"),
        ];
        let periods = generate_periods(d("2025-06-12"), 13, None);
        let timeline = bucket_issues(&issues, periods, d("2025-06-13"));
        let summary = summarize(&issues, &timeline);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.scheduled, 3);
        assert_eq!(summary.unscheduled, 1);
        assert_eq!(summary.in_progress, 1);
        assert_eq!(summary.done, 1);
        assert_eq!(summary.total_points, 10.0);
        assert_eq!(summary.done_points, 2.0);
        assert!((summary.points_done_pct() - 20.0).abs() < 1e-9);

        assert_eq!(summary.periods.len(), 13);
        assert_eq!(summary.periods[0].issues, 2);
        assert_eq!(summary.periods[0].points, 8.0);
        assert_eq!(summary.periods[1].points, 2.0);
        assert_eq!(summary.peak_period().map(|p| p.points), Some(8.0));
    }

    #[test]
    fn test_missing_points_count_as_zero() {
        let issues = vec![make_issue("A", "To Do")];
        let periods = generate_periods(d("2025-06-12"), 13, None);
        let timeline = bucket_issues(&issues, periods, d("2025-06-13"));
        let summary = summarize(&issues, &timeline);
        assert_eq!(summary.total_points, 0.0);
        assert_eq!(summary.points_done_pct(), 0.0);
        assert!(summary.peak_period().is_none());
    }

    #[test]
    fn test_empty_sums_are_positive_zero() {
        let issues = vec![pointed(make_issue("A", "To Do"), 3.0)];
        let periods = generate_periods(d("2025-06-12"), 13, None);
        let timeline = bucket_issues(&issues, periods, d("2025-06-13"));
        let summary = summarize(&issues, &timeline);
        assert!(summary.done_points.is_sign_positive());
        assert!(summary.periods[0].points.is_sign_positive());
        assert_eq!(format!("{}", summary.done_points), "0");

        let no_issues = bucket_issues(&[], generate_periods(d("2025-06-12"), 1, None), d("2025-06-13"));
        let empty = summarize(&[], &no_issues);
        assert!(empty.total_points.is_sign_positive());
    }
}
