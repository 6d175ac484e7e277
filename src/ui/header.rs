use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35), // Source
            Constraint::Percentage(35), // Counts
            Constraint::Percentage(30), // Points done
        ])
        .split(area);

    draw_source(f, app, chunks[0]);
    draw_counts(f, app, chunks[1]);
    draw_progress(f, app, chunks[2]);
}

fn draw_source(f: &mut Frame, app: &App, area: Rect) {
    let source = app
        .source
        .as_ref()
        .map(|s| s.describe())
        .unwrap_or_else(|| "No source".into());

    let refreshed = app
        .last_refreshed
        .map(|t| format!(" {} ", t.format("%H:%M")))
        .unwrap_or_default();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Source ")
        .title_bottom(Line::from(refreshed).right_aligned());
    let text = Paragraph::new(super::truncate_str(&source, area.width.saturating_sub(2) as usize))
        .block(block);
    f.render_widget(text, area);
}

fn draw_counts(f: &mut Frame, app: &App, area: Rect) {
    let s = &app.summary;
    let theme = &app.config.theme;
    let muted = Style::default().fg(theme.parse_color(&theme.text_muted));

    let period = app
        .timeline
        .current_period()
        .map(|p| p.short_label())
        .unwrap_or_else(|| "-".into());

    let line = Line::from(vec![
        Span::raw(format!("{} issues", s.total)),
        Span::styled("  │  ", muted),
        Span::styled(format!("◐ {}", s.in_progress), Style::default().fg(theme.parse_color(&theme.bar_in_progress))),
        Span::raw("  "),
        Span::styled(format!("● {}", s.done), Style::default().fg(theme.parse_color(&theme.bar_done))),
        Span::styled("  │  ", muted),
        Span::styled(format!("{} unscheduled", s.unscheduled), muted),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Today {} · {} ", app.timeline.today, period));
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_progress(f: &mut Frame, app: &App, area: Rect) {
    let s = &app.summary;
    let theme = &app.config.theme;
    let pct = s.points_done_pct();

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Points done "))
        .gauge_style(Style::default().fg(theme.parse_color(&theme.bar_done)))
        .ratio((pct / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.0} / {:.0} ({pct:.0}%)", s.done_points, s.total_points));
    f.render_widget(gauge, area);
}
