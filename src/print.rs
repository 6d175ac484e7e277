//! Non-interactive output for `--print` and `--describe`.

use crate::jira::Issue;
use crate::markup::{self, render};
use crate::timeline::stats::Summary;
use crate::timeline::Timeline;
use std::io::{self, Write};

const WRAP_WIDTH: usize = 100;

/// Period headings with their issues, then the summary
pub fn write_timeline<W: Write>(
    out: &mut W,
    issues: &[Issue],
    timeline: &Timeline,
    summary: &Summary,
) -> io::Result<()> {
    for (label, bucket) in timeline.entries(issues) {
        writeln!(out, "{label}")?;
        if bucket.is_empty() {
            writeln!(out, "  No issues in this period.")?;
        }
        for issue in bucket {
            writeln!(out, "  {}: {} (Status: {})", issue.key, issue.summary, issue.status)?;
        }
        writeln!(out)?;
    }

    if !timeline.unscheduled.is_empty() {
        writeln!(out, "Unscheduled")?;
        for issue in timeline.unscheduled.iter().filter_map(|&i| issues.get(i)) {
            writeln!(out, "  {}: {} (Status: {})", issue.key, issue.summary, issue.status)?;
        }
        writeln!(out)?;
    }

    write_summary(out, summary)
}

pub fn write_summary<W: Write>(out: &mut W, summary: &Summary) -> io::Result<()> {
    writeln!(
        out,
        "{} issues: {} scheduled, {} unscheduled, {} in progress, {} done",
        summary.total, summary.scheduled, summary.unscheduled, summary.in_progress, summary.done
    )?;
    writeln!(
        out,
        "Story points: {} of {} done ({:.0}%)",
        summary.done_points,
        summary.total_points,
        summary.points_done_pct()
    )?;
    if let Some(peak) = summary.peak_period().filter(|p| p.points > 0.0) {
        writeln!(out, "Busiest period: {} ({} points)", peak.label, peak.points)?;
    }
    Ok(())
}

/// Heading line plus the description as markdown
pub fn write_description<W: Write>(out: &mut W, issue: &Issue) -> io::Result<()> {
    writeln!(out, "# {}: {}", issue.key, issue.summary)?;
    writeln!(out)?;
    match issue.description.as_deref() {
        Some(text) => {
            let doc = markup::parse_markup(text);
            writeln!(out, "{}", render::to_markdown_wrapped(&doc, WRAP_WIDTH))
        }
        None => writeln!(out, "_No description_"),
    }
}
