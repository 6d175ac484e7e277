use crate::app::{App, TimelineRow};
use crate::config::Theme;
use crate::jira::Issue;
use crate::timeline::layout::{self, Highlight};
use crate::timeline::Period;
use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, Paragraph};

const MAX_LABEL_WIDTH: u16 = 42;
const HIGHLIGHT_SYMBOL: &str = "▶ ";

/// Background of a chart cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shade {
    None,
    Current,
    Delivery,
}

/// Consecutive chart cells sharing bar / shade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Run {
    len: u16,
    on_bar: bool,
    shade: Shade,
}

pub fn draw(f: &mut Frame, app: &mut App, area: Rect) {
    let title = format!(
        "Waterfall · {} scheduled · {} unscheduled",
        app.summary.scheduled, app.summary.unscheduled
    );
    let block = crate::ui::styled_block(&title, true, &app.config.theme);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.timeline.is_empty() {
        let empty = Paragraph::new("No issues fall inside the timeline")
            .style(Style::default().fg(app.config.theme.parse_color(&app.config.theme.text_muted)));
        f.render_widget(empty, inner);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    // Label column, then one separator cell, then the chart
    let symbol_width = HIGHLIGHT_SYMBOL.chars().count() as u16;
    let label_width = MAX_LABEL_WIDTH.min(inner.width / 3);
    let columns = inner
        .width
        .saturating_sub(symbol_width + label_width + 1);

    let theme = &app.config.theme;
    let current = app.current_highlight().and_then(|h| highlight_cells(h, columns));
    let delivery = app.delivery_highlight().and_then(|h| highlight_cells(h, columns));

    let ruler = format!(
        "{}{}",
        " ".repeat((symbol_width + label_width + 1) as usize),
        period_ruler(&app.timeline.periods, columns)
    );
    f.render_widget(
        Paragraph::new(ruler).style(Style::default().fg(theme.parse_color(&theme.text_muted))),
        chunks[0],
    );

    let items: Vec<ListItem> = app
        .rows
        .iter()
        .map(|row| {
            let issue = &app.issues[row.issue_idx];
            render_row(issue, row, theme, label_width, columns, current, delivery)
        })
        .collect();

    let list = List::new(items)
        .highlight_style(Style::default().bg(theme.parse_color(&theme.selected_bg)))
        .highlight_symbol(HIGHLIGHT_SYMBOL);

    f.render_stateful_widget(list, chunks[1], &mut app.list_state);
}

fn render_row(
    issue: &Issue,
    row: &TimelineRow,
    theme: &Theme,
    label_width: u16,
    columns: u16,
    current: Option<(u16, u16)>,
    delivery: Option<(u16, u16)>,
) -> ListItem<'static> {
    let icon_color = theme.bar_color(&issue.status, issue.is_done());
    let label = super::truncate_str(
        &format!("{} {}", issue.key, issue.summary),
        label_width.saturating_sub(2) as usize,
    );

    let mut spans = vec![
        Span::styled(format!("{} ", issue.state_icon()), Style::default().fg(icon_color)),
        Span::styled(
            format!("{label:<width$}", width = label_width.saturating_sub(2) as usize),
            Style::default().fg(theme.parse_color(&theme.text)),
        ),
        Span::raw(" "),
    ];

    let bar = row
        .bar
        .as_ref()
        .and_then(|b| layout::to_cells(b.start_pct, b.width_pct, columns));

    for run in cell_runs(bar, current, delivery, columns) {
        let mut style = Style::default().fg(icon_color);
        style = match run.shade {
            Shade::Current => style.bg(theme.parse_color(&theme.current_period_bg)),
            Shade::Delivery => style.bg(theme.parse_color(&theme.delivery_period_bg)),
            Shade::None => style,
        };
        let fill = if run.on_bar { "█" } else { " " };
        spans.push(Span::styled(fill.repeat(run.len as usize), style));
    }

    ListItem::new(Line::from(spans))
}

fn highlight_cells(h: Highlight, columns: u16) -> Option<(u16, u16)> {
    layout::to_cells(h.left_pct, h.width_pct, columns)
}

fn within(x: u16, span: Option<(u16, u16)>) -> bool {
    span.is_some_and(|(start, width)| x >= start && x < start + width)
}

/// Run-length encode one chart row; the current period shades over delivery
fn cell_runs(
    bar: Option<(u16, u16)>,
    current: Option<(u16, u16)>,
    delivery: Option<(u16, u16)>,
    columns: u16,
) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for x in 0..columns {
        let shade = if within(x, current) {
            Shade::Current
        } else if within(x, delivery) {
            Shade::Delivery
        } else {
            Shade::None
        };
        let on_bar = within(x, bar);

        match runs.last_mut() {
            Some(last) if last.on_bar == on_bar && last.shade == shade => last.len += 1,
            _ => runs.push(Run { len: 1, on_bar, shade }),
        }
    }
    runs
}

/// Tick marks and short labels at every period start
fn period_ruler(periods: &[Period], columns: u16) -> String {
    let mut cells = vec![' '; columns as usize];
    for period in periods {
        let Some((x, _)) = layout::highlight(period, periods)
            .and_then(|h| highlight_cells(h, columns))
        else {
            continue;
        };
        let text = format!("┆{}", period.short_label());
        for (offset, ch) in text.chars().enumerate() {
            match cells.get_mut(x as usize + offset) {
                Some(cell) => *cell = ch,
                None => break,
            }
        }
    }
    cells.into_iter().collect()
}
