//! Bar geometry for the waterfall chart.
//!
//! Positions are percentages of the full horizon, measured from the first
//! period's start to the last period's end.

use crate::jira::Issue;
use crate::timeline::{find_period, Period};
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Let explicit start/end dates win over the In Progress rule
    pub prefer_explicit_dates: bool,
}

/// Where a bar's span came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarSource {
    CurrentPeriod,
    ExplicitDates,
    ResolutionPeriod,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub source: BarSource,
    /// Days from the first period's start; negative before the horizon
    pub start_offset_days: i64,
    /// Never below 1
    pub duration_days: i64,
    /// Signed `start_offset_days` over the horizon. Negative before the anchor,
    /// where an absolute day difference would mirror the bar past the anchor.
    pub start_pct: f64,
    pub width_pct: f64,
}

/// Overlay rectangle for a whole period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Highlight {
    pub left_pct: f64,
    pub width_pct: f64,
}

/// Absolute whole days between two dates
pub fn day_diff(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days().abs()
}

/// Horizon length, `day_diff(first.start, last.end)`; 0 without periods
pub fn total_days(periods: &[Period]) -> i64 {
    match (periods.first(), periods.last()) {
        (Some(first), Some(last)) => day_diff(first.start, last.end),
        _ => 0,
    }
}

pub fn current_period(periods: &[Period], today: NaiveDate) -> Option<&Period> {
    period_containing(periods, today)
}

pub fn period_containing(periods: &[Period], date: NaiveDate) -> Option<&Period> {
    find_period(periods, date).map(|idx| &periods[idx])
}

/// Span of an issue before normalisation
fn bar_span(
    issue: &Issue,
    periods: &[Period],
    today: NaiveDate,
    options: LayoutOptions,
) -> Option<(NaiveDate, NaiveDate, BarSource)> {
    let explicit = match (issue.start_date, issue.end_date) {
        (Some(start), Some(end)) => Some((start, end, BarSource::ExplicitDates)),
        _ => None,
    };

    if options.prefer_explicit_dates && explicit.is_some() {
        return explicit;
    }

    if issue.is_in_progress() {
        if let Some(current) = current_period(periods, today) {
            return Some((current.start, current.end, BarSource::CurrentPeriod));
        }
    }

    if explicit.is_some() {
        return explicit;
    }

    let resolved = issue.resolution_date?;
    period_containing(periods, resolved).map(|p| (p.start, p.end, BarSource::ResolutionPeriod))
}

/// Bar for one issue, `None` when it can't be drawn
pub fn compute_bar(
    issue: &Issue,
    periods: &[Period],
    today: NaiveDate,
    options: LayoutOptions,
) -> Option<Bar> {
    let first = periods.first()?;
    let total = total_days(periods);
    if total == 0 {
        return None;
    }

    let (start, end, source) = bar_span(issue, periods, today, options)?;
    let start_offset_days = (start - first.start).num_days();
    let duration_days = day_diff(start, end).max(1);

    Some(Bar {
        start,
        end,
        source,
        start_offset_days,
        duration_days,
        start_pct: 100.0 * start_offset_days as f64 / total as f64,
        width_pct: 100.0 * duration_days as f64 / total as f64,
    })
}

/// Overlay for a period, same normalisation as bars
pub fn highlight(period: &Period, periods: &[Period]) -> Option<Highlight> {
    let first = periods.first()?;
    let total = total_days(periods);
    if total == 0 {
        return None;
    }

    Some(Highlight {
        left_pct: 100.0 * day_diff(first.start, period.start) as f64 / total as f64,
        width_pct: 100.0 * day_diff(period.start, period.end).max(1) as f64 / total as f64,
    })
}

/// Map a percentage span onto `columns` character cells.
///
/// Returns `(x, width)` clipped to the chart, at least one cell wide, or `None`
/// when the span lies entirely outside.
pub fn to_cells(start_pct: f64, width_pct: f64, columns: u16) -> Option<(u16, u16)> {
    if columns == 0 {
        return None;
    }
    let cols = columns as f64;
    let x = (start_pct / 100.0 * cols).floor().max(0.0);
    let end = ((start_pct + width_pct) / 100.0 * cols).ceil().min(cols);

    if x >= cols || end <= 0.0 {
        return None;
    }

    let width = (end - x).max(1.0);
    Some((x as u16, (width as u16).min(columns - x as u16)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::generate_periods;
    use crate::timeline::test_support::*;

    fn periods() -> Vec<Period> {
        generate_periods(d("2025-06-12"), 13, None)
    }

    #[test]
    fn test_day_diff_is_absolute() {
        assert_eq!(day_diff(d("2025-06-12"), d("2025-06-25")), 13);
        assert_eq!(day_diff(d("2025-06-25"), d("2025-06-12")), 13);
        assert_eq!(day_diff(d("2025-06-12"), d("2025-06-12")), 0);
    }

    #[test]
    fn test_total_days() {
        assert_eq!(total_days(&periods()), 13 * 14 - 1);
        assert_eq!(total_days(&[]), 0);
    }

    #[test]
    fn test_in_progress_spans_current_period() {
        let issue = with_range(make_issue("A", "In Progress"), "2025-06-12", "2025-06-20");
        let bar = compute_bar(&issue, &periods(), d("2025-06-27"), LayoutOptions::default()).unwrap();
        assert_eq!(bar.source, BarSource::CurrentPeriod);
        assert_eq!(bar.start, d("2025-06-26"));
        assert_eq!(bar.end, d("2025-07-09"));
        assert_eq!(bar.start_offset_days, 14);
        assert_eq!(bar.duration_days, 13);
    }

    #[test]
    fn test_prefer_explicit_dates_option() {
        let issue = with_range(make_issue("A", "In Progress"), "2025-06-12", "2025-06-20");
        let options = LayoutOptions { prefer_explicit_dates: true };
        let bar = compute_bar(&issue, &periods(), d("2025-06-27"), options).unwrap();
        assert_eq!(bar.source, BarSource::ExplicitDates);
        assert_eq!(bar.start, d("2025-06-12"));
    }

    #[test]
    fn test_bar_before_anchor_starts_left_of_chart() {
        let issue = with_range(make_issue("A", "To Do"), "2025-06-05", "2025-06-19");
        let bar = compute_bar(&issue, &periods(), d("2025-06-12"), LayoutOptions::default()).unwrap();
        assert_eq!(bar.start_offset_days, -7);
        assert!(bar.start_pct < 0.0);
        // Clipped at the first cell, only the in-horizon week is drawn
        let (x, width) = to_cells(bar.start_pct, bar.width_pct, 181).unwrap();
        assert_eq!(x, 0);
        assert!(width < 14);
    }

    #[test]
    fn test_explicit_range() {
        let issue = with_range(make_issue("A", "To Do"), "2025-06-19", "2025-07-03");
        let bar = compute_bar(&issue, &periods(), d("2025-06-12"), LayoutOptions::default()).unwrap();
        assert_eq!(bar.source, BarSource::ExplicitDates);
        assert_eq!(bar.start_offset_days, 7);
        assert_eq!(bar.duration_days, 14);
        let total = (13 * 14 - 1) as f64;
        assert!((bar.start_pct - 700.0 / total).abs() < 1e-9);
        assert!((bar.width_pct - 1400.0 / total).abs() < 1e-9);
    }

    #[test]
    fn test_zero_length_range_gets_one_day() {
        let issue = with_range(make_issue("A", "To Do"), "2025-07-01", "2025-07-01");
        let bar = compute_bar(&issue, &periods(), d("2025-06-12"), LayoutOptions::default()).unwrap();
        assert_eq!(bar.duration_days, 1);
        let total = (13 * 14 - 1) as f64;
        assert!((bar.width_pct - 100.0 / total).abs() < 1e-9);
    }

    #[test]
    fn test_resolution_spans_its_period() {
        let issue = with_resolution(make_issue("A", "Done"), "2025-07-12");
        let bar = compute_bar(&issue, &periods(), d("2025-06-12"), LayoutOptions::default()).unwrap();
        assert_eq!(bar.source, BarSource::ResolutionPeriod);
        assert_eq!(bar.start, d("2025-07-10"));
        assert_eq!(bar.end, d("2025-07-23"));
    }

    #[test]
    fn test_resolution_outside_horizon_has_no_bar() {
        let issue = with_resolution(make_issue("A", "Done"), "2024-01-01");
        assert!(compute_bar(&issue, &periods(), d("2025-06-12"), LayoutOptions::default()).is_none());
    }

    #[test]
    fn test_start_only_has_no_bar() {
        let issue = with_start(make_issue("A", "To Do"), "2025-06-20");
        assert!(compute_bar(&issue, &periods(), d("2025-06-12"), LayoutOptions::default()).is_none());
    }

    #[test]
    fn test_in_progress_without_current_period_falls_through() {
        let issue = make_issue("A", "In Progress");
        assert!(compute_bar(&issue, &periods(), d("2030-01-01"), LayoutOptions::default()).is_none());
    }

    #[test]
    fn test_no_periods_no_bar() {
        let issue = with_range(make_issue("A", "To Do"), "2025-06-19", "2025-07-03");
        assert!(compute_bar(&issue, &[], d("2025-06-12"), LayoutOptions::default()).is_none());
    }

    #[test]
    fn test_highlight_matches_period_geometry() {
        let periods = periods();
        let total = (13 * 14 - 1) as f64;
        let h = highlight(&periods[2], &periods).unwrap();
        assert!((h.left_pct - 2800.0 / total).abs() < 1e-9);
        assert!((h.width_pct - 1300.0 / total).abs() < 1e-9);

        let first = highlight(&periods[0], &periods).unwrap();
        assert_eq!(first.left_pct, 0.0);
    }

    #[test]
    fn test_delivery_target_lookup() {
        let periods = periods();
        let target = period_containing(&periods, d("2025-10-02")).unwrap();
        assert_eq!(target.index, 8);
        assert!(period_containing(&periods, d("2026-06-01")).is_none());
    }

    #[test]
    fn test_to_cells_basic() {
        assert_eq!(to_cells(0.0, 50.0, 100), Some((0, 50)));
        assert_eq!(to_cells(25.0, 10.0, 40), Some((10, 4)));
    }

    #[test]
    fn test_to_cells_minimum_width() {
        assert_eq!(to_cells(50.0, 0.1, 20), Some((10, 1)));
    }

    #[test]
    fn test_to_cells_clipping() {
        assert_eq!(to_cells(-10.0, 20.0, 100), Some((0, 10)));
        assert_eq!(to_cells(95.0, 20.0, 100), Some((95, 5)));
        assert_eq!(to_cells(-30.0, 10.0, 100), None);
        assert_eq!(to_cells(100.0, 5.0, 100), None);
        assert_eq!(to_cells(0.0, 10.0, 0), None);
    }
}
