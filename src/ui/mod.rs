mod details;
mod header;
mod help;
mod waterfall;

use crate::app::{App, InputMode};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();

    // Main vertical layout: header (3) + content + status bar (1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Source / progress / today
            Constraint::Min(0),    // Waterfall
            Constraint::Length(1), // Status/help bar
        ])
        .split(size);

    header::draw(f, app, chunks[0]);
    waterfall::draw(f, app, chunks[1]);
    draw_status_bar(f, app, chunks[2]);

    // Overlays
    match app.input_mode {
        InputMode::Help => help::draw_popup(f, app, size),
        InputMode::Details => details::draw_popup(f, app, size),
        InputMode::Normal => {}
    }

    // Loading overlay
    if app.loading {
        draw_loading(f, app, size);
    }
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let style = if app.status_is_error {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let content = if let Some(msg) = &app.status_message {
        msg.clone()
    } else {
        match app.input_mode {
            InputMode::Normal => {
                "j/k:nav  g/G:top/bottom  ^d/^u:page  Enter:details  o:open  y/Y:copy key/markdown  r:refresh  ?:help  q:quit".into()
            }
            InputMode::Details => "j/k:scroll  ^d/^u:page  o:open  y/Y:copy key/markdown  Esc:close".into(),
            InputMode::Help => "Esc:close".into(),
        }
    };

    let paragraph = Paragraph::new(content).style(style);
    f.render_widget(paragraph, area);
}

fn draw_loading(f: &mut Frame, app: &App, area: Rect) {
    let spinner = app.spinner_char();
    let message = if app.loading_message.is_empty() {
        "Loading..."
    } else {
        &app.loading_message
    };

    let text = format!(" {spinner} {message} ");
    let width = (text.len() as u16).clamp(20, 50);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .style(Style::default().bg(Color::Black));

    let inner = centered_rect(width, 3, area);
    f.render_widget(Clear, inner);
    f.render_widget(block, inner);

    let text_area = Rect::new(inner.x + 1, inner.y + 1, inner.width.saturating_sub(2), 1);
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);
    f.render_widget(paragraph, text_area);
}

// Helper: create a centered rect
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

// Helper: styled block with focus indicator
pub fn styled_block<'a>(
    title: &'a str,
    focused: bool,
    theme: &'a crate::config::Theme,
) -> Block<'a> {
    let border_color = if focused {
        theme.parse_color(&theme.border_active)
    } else {
        theme.parse_color(&theme.border)
    };

    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {title} "))
}

pub fn truncate_str(s: &str, max_chars: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() > max_chars {
        let truncated: String = chars[..max_chars.saturating_sub(3)].iter().collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use ratatui::backend::TestBackend;
    use serde_json::json;

    #[test]
    fn test_centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered_rect(10, 4, area), Rect::new(5, 3, 10, 4));
        assert_eq!(centered_rect(40, 40, area), Rect::new(0, 0, 20, 10));
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("a longer summary", 8), "a lon...");
    }

    #[test]
    fn test_draw_smoke() {
        let today = chrono::NaiveDate::from_ymd_opt(2025, 6, 27).unwrap();
        let mut app = App::new(Config::default(), None, Some(today));
        let raw = serde_json::from_value(json!({
            "key": "WDY-1",
            "fields": {
                "summary": "Build the thing",
                "description": "h1. Plan\n* *ship*",
                "status": { "name": "In Progress" }
            }
        }))
        .unwrap();
        app.set_issues(&[raw]);

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();

        app.open_details();
        terminal.draw(|f| draw(f, &mut app)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("WDY-1"));
        assert!(text.contains("Plan"));
    }

    #[test]
    fn test_draw_empty_timeline_message() {
        let today = chrono::NaiveDate::from_ymd_opt(2025, 6, 27).unwrap();
        let mut app = App::new(Config::default(), None, Some(today));
        assert!(app.timeline.is_empty());

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();

        let text: String = terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("No issues fall inside the timeline"));
    }
}
