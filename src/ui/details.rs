use crate::app::App;
use crate::config::Theme;
use crate::jira::Issue;
use crate::markup::{Block as MarkupBlock, Document, Inline};
use chrono::NaiveDate;
use ratatui::prelude::*;
use ratatui::widgets::{Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap};

pub fn draw_popup(f: &mut Frame, app: &mut App, area: Rect) {
    let Some(issue) = app.selected_issue().cloned() else {
        return;
    };
    let description = app.selected_description();
    let theme = &app.config.theme;

    let width = (area.width * 4 / 5).max(40);
    let height = (area.height * 4 / 5).max(10);
    let popup = super::centered_rect(width, height, area);
    f.render_widget(Clear, popup);

    let title = format!("{} - Esc to close", issue.key);
    let block = super::styled_block(&title, true, theme);
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let label_fg = Color::Rgb(220, 220, 225);
    let label_bg = Color::Rgb(50, 50, 55);
    let badge = |label: &str, value: String, fg: Color, bg: Color| {
        Line::from(vec![
            Span::styled(format!(" {label}"), Style::default().fg(label_fg).bg(label_bg)),
            Span::styled("\u{e0b4} ", Style::default().fg(label_bg)),
            Span::styled("\u{e0b6}", Style::default().fg(bg)),
            Span::styled(format!(" {value} "), Style::default().fg(fg).bg(bg)),
            Span::styled("\u{e0b4}", Style::default().fg(bg)),
        ])
    };

    let mut lines: Vec<Line> = Vec::new();

    // Title
    lines.push(Line::from(vec![
        Span::styled(
            format!("{} ", issue.state_icon()),
            Style::default().fg(theme.bar_color(&issue.status, issue.is_done())),
        ),
        Span::styled(
            issue.summary.clone(),
            Style::default().add_modifier(Modifier::BOLD).fg(Color::White),
        ),
    ]));
    lines.push(Line::from(""));

    let (status_fg, status_bg) = theme.status_badge_colors(&issue.status, issue.is_done());
    lines.push(badge("Status", issue.status.clone(), status_fg, status_bg));

    if let Some(issue_type) = &issue.issue_type {
        lines.push(badge("Type", issue_type.clone(), Color::Rgb(180, 200, 255), Color::Rgb(35, 45, 65)));
    }

    let (assignee, assignee_fg, assignee_bg) = match &issue.assignee {
        Some(name) => (name.clone(), Color::Rgb(200, 220, 230), Color::Rgb(45, 70, 80)),
        None => ("Unassigned".into(), Color::Rgb(100, 100, 100), Color::Rgb(40, 40, 40)),
    };
    lines.push(badge("Assignee", assignee, assignee_fg, assignee_bg));

    if let Some(points) = issue.story_points {
        lines.push(badge("Points", format!("{points}"), Color::Rgb(255, 200, 100), Color::Rgb(55, 45, 25)));
    }

    let date_bg = Color::Rgb(40, 45, 50);
    let date_fg = Color::Rgb(190, 190, 190);
    for (label, date) in date_rows(&issue) {
        lines.push(badge(label, date.to_string(), date_fg, date_bg));
    }

    if let Some(row) = app.selected_row() {
        if let Some(period) = app.timeline.periods.get(row.period_idx) {
            lines.push(badge("Period", period.label(), Color::Rgb(180, 200, 255), Color::Rgb(35, 45, 65)));
        }
    }

    // Divider
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "─".repeat(inner.width.saturating_sub(2) as usize),
        Style::default().fg(Color::Rgb(60, 60, 60)),
    )));
    lines.push(Line::from(""));

    match description {
        Some(doc) if !doc.is_empty() => lines.extend(document_lines(&doc, theme)),
        _ => lines.push(Line::from(Span::styled(
            "No description",
            Style::default()
                .fg(theme.parse_color(&theme.text_muted))
                .add_modifier(Modifier::ITALIC),
        ))),
    }

    // Calculate scroll
    let total_lines = lines.len() as u16;
    app.details_scroll_max = total_lines.saturating_sub(inner.height);
    app.details_scroll = app.details_scroll.min(app.details_scroll_max);

    let paragraph = Paragraph::new(lines)
        .scroll((app.details_scroll, 0))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, inner);

    if app.details_scroll_max > 0 {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));

        let mut scrollbar_state = ScrollbarState::new(app.details_scroll_max as usize)
            .position(app.details_scroll as usize);

        f.render_stateful_widget(scrollbar, popup, &mut scrollbar_state);
    }
}

/// Dates shown as badges, in display order, absent ones skipped
fn date_rows(issue: &Issue) -> Vec<(&'static str, NaiveDate)> {
    [
        ("Start", issue.start_date),
        ("End", issue.end_date),
        ("Due", issue.due_date),
        ("Resolved", issue.resolution_date),
        ("Created", issue.created),
        ("Updated", issue.updated),
    ]
    .into_iter()
    .filter_map(|(label, date)| date.map(|d| (label, d)))
    .collect()
}

fn inline_spans(content: &[Inline], base: Style) -> Vec<Span<'static>> {
    content
        .iter()
        .map(|span| match span {
            Inline::Text(s) => Span::styled(s.clone(), base),
            Inline::Bold(s) => Span::styled(s.clone(), base.add_modifier(Modifier::BOLD)),
            Inline::Italic(s) => Span::styled(s.clone(), base.add_modifier(Modifier::ITALIC)),
        })
        .collect()
}

/// Styled lines for a parsed description
pub fn document_lines(doc: &Document, theme: &Theme) -> Vec<Line<'static>> {
    let text = Style::default().fg(Color::Rgb(180, 180, 180));
    let heading = Style::default()
        .fg(theme.parse_color(&theme.highlight))
        .add_modifier(Modifier::BOLD);
    let marker = Style::default().fg(theme.parse_color(&theme.text_muted));

    let mut lines = Vec::new();
    for block in &doc.blocks {
        match block {
            MarkupBlock::Heading { level, content } => {
                let style = if *level <= 2 {
                    heading.add_modifier(Modifier::UNDERLINED)
                } else {
                    heading
                };
                lines.push(Line::from(inline_spans(content, style)));
            }
            MarkupBlock::Paragraph(content) => lines.push(Line::from(inline_spans(content, text))),
            MarkupBlock::BulletList(items) => {
                for item in items {
                    let mut spans = vec![Span::styled("  • ", marker)];
                    spans.extend(inline_spans(item, text));
                    lines.push(Line::from(spans));
                }
            }
            MarkupBlock::OrderedList(items) => {
                for (n, item) in items.iter().enumerate() {
                    let mut spans = vec![Span::styled(format!("  {}. ", n + 1), marker)];
                    spans.extend(inline_spans(item, text));
                    lines.push(Line::from(spans));
                }
            }
            MarkupBlock::LineBreak => lines.push(Line::from("")),
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_markup;
    use crate::timeline::test_support::*;

    fn make_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_document_lines_layout() {
        let doc = parse_markup("h2. Goal\n* *one*\n1. a\n2. b\n\nplain");
        let lines = document_lines(&doc, &Theme::default());
        let texts: Vec<String> = lines.iter().map(make_text).collect();
        assert_eq!(texts, vec!["Goal", "  • one", "  1. a", "  2. b", "", "plain"]);
    }

    #[test]
    fn test_inline_modifiers() {
        let doc = parse_markup("*b* _i_");
        let lines = document_lines(&doc, &Theme::default());
        let spans = &lines[0].spans;
        assert!(spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert!(spans[2].style.add_modifier.contains(Modifier::ITALIC));
        assert!(!spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_heading_is_styled() {
        let doc = parse_markup("h4. Small");
        let lines = document_lines(&doc, &Theme::default());
        let style = lines[0].spans[0].style;
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert!(!style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_date_rows_skip_missing() {
        let mut issue = with_range(make_issue("A-1", "To Do"), "2025-06-12", "2025-06-20");
        issue.created = Some(d("2025-06-01"));
        let rows = date_rows(&issue);
        assert_eq!(
            rows,
            vec![
                ("Start", d("2025-06-12")),
                ("End", d("2025-06-20")),
                ("Created", d("2025-06-01")),
            ]
        );
    }
}
