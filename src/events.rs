use crate::app::{App, InputMode};
use crate::ui;
use anyhow::Result;
use arboard::Clipboard;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use std::time::{Duration, Instant};
use tracing::info;

pub async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    refresh(terminal, app).await?;

    let mut last_refresh = Instant::now();
    let mut last_spinner_tick = Instant::now();
    let refresh_interval = Duration::from_secs(app.config.settings.refresh_interval);
    let spinner_interval = Duration::from_millis(80);

    loop {
        // Tick spinner during loading
        if app.loading && last_spinner_tick.elapsed() >= spinner_interval {
            app.tick_spinner();
            last_spinner_tick = Instant::now();
        }

        // Clear status messages after 5 seconds
        app.clear_expired_status();

        terminal.draw(|f| ui::draw(f, app))?;

        // Poll for events with short timeout for responsive UI
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                match handle_key(app, key) {
                    KeyAction::Quit => return Ok(()),
                    KeyAction::Refresh => {
                        refresh(terminal, app).await?;
                        last_refresh = Instant::now();
                    }
                    KeyAction::None => {}
                }
            }
        }

        // Auto refresh, skipped while a popup is open
        if !refresh_interval.is_zero()
            && !app.loading
            && app.input_mode == InputMode::Normal
            && last_refresh.elapsed() >= refresh_interval
        {
            info!("auto refresh");
            refresh(terminal, app).await?;
            last_refresh = Instant::now();
        }
    }
}

/// Reload issues, reporting failures in the status bar
async fn refresh<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let what = app
        .source
        .as_ref()
        .map(|s| s.describe())
        .unwrap_or_default();
    app.set_loading(true, "Loading issues...");
    terminal.draw(|f| ui::draw(f, app))?;

    match app.load_issues().await {
        Ok(()) => app.set_status(format!("Loaded {} issues from {what}", app.issues.len())),
        Err(e) => app.set_error(format!("Failed to load issues: {e:#}")),
    }
    app.set_loading(false, "");
    Ok(())
}

/// What the loop should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Refresh,
    Quit,
}

pub fn handle_key(app: &mut App, key: KeyEvent) -> KeyAction {
    // Ctrl+C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyAction::Quit;
    }

    match app.input_mode {
        InputMode::Help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q'))
                || key.code == KeyCode::Char(app.config.keybindings.help)
            {
                app.close_popup();
            }
            KeyAction::None
        }
        InputMode::Details => {
            handle_details_key(app, key);
            KeyAction::None
        }
        InputMode::Normal => handle_normal_key(app, key),
    }
}

fn handle_details_key(app: &mut App, key: KeyEvent) {
    let kb = app.config.keybindings.clone();
    let page = app.config.settings.page_jump as i32;

    match key.code {
        KeyCode::Esc | KeyCode::Enter => app.close_popup(),
        KeyCode::Char('q') => app.close_popup(),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => app.scroll_details(page),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => app.scroll_details(-page),
        KeyCode::Down => app.scroll_details(1),
        KeyCode::Up => app.scroll_details(-1),
        KeyCode::Char(c) if c == kb.down => app.scroll_details(1),
        KeyCode::Char(c) if c == kb.up => app.scroll_details(-1),
        KeyCode::Char(c) if c == kb.top => app.details_scroll = 0,
        KeyCode::Char(c) if c == kb.bottom => app.details_scroll = app.details_scroll_max,
        KeyCode::Char(c) if c == kb.open => open_selected(app),
        KeyCode::Char(c) if c == kb.copy_key => copy_selected_key(app),
        KeyCode::Char(c) if c == kb.copy_details => copy_selected_markdown(app),
        _ => {}
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) -> KeyAction {
    let kb = app.config.keybindings.clone();

    match key.code {
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => app.list_jump_down(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => app.list_jump_up(),
        KeyCode::Down => app.list_next(),
        KeyCode::Up => app.list_prev(),
        KeyCode::Home => app.list_top(),
        KeyCode::End => app.list_bottom(),
        KeyCode::Enter => app.open_details(),
        KeyCode::Esc => app.clear_status(),
        KeyCode::Char(c) if c == kb.quit => return KeyAction::Quit,
        KeyCode::Char(c) if c == kb.down => app.list_next(),
        KeyCode::Char(c) if c == kb.up => app.list_prev(),
        KeyCode::Char(c) if c == kb.top => app.list_top(),
        KeyCode::Char(c) if c == kb.bottom => app.list_bottom(),
        KeyCode::Char(c) if c == kb.help => app.input_mode = InputMode::Help,
        KeyCode::Char(c) if c == kb.open => open_selected(app),
        KeyCode::Char(c) if c == kb.copy_key => copy_selected_key(app),
        KeyCode::Char(c) if c == kb.copy_details => copy_selected_markdown(app),
        KeyCode::Char(c) if c == kb.refresh => {
            if !app.loading {
                return KeyAction::Refresh;
            }
        }
        _ => {}
    }
    KeyAction::None
}

fn open_selected(app: &mut App) {
    let Some(key) = app.selected_issue().map(|i| i.key.clone()) else {
        return;
    };
    let Some(url) = app.browse_url() else {
        app.set_error("No Jira base_url configured");
        return;
    };
    if let Err(e) = open::that(&url) {
        app.set_error(format!("Failed to open browser: {e}"));
    } else {
        app.set_status(format!("Opened {key}"));
    }
}

fn copy_selected_key(app: &mut App) {
    let Some(key) = app.selected_issue().map(|i| i.key.clone()) else {
        return;
    };
    match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(key.clone())) {
        Ok(()) => app.set_status(format!("Copied {key}")),
        Err(e) => app.set_error(format!("Failed to copy: {e}")),
    }
}

fn copy_selected_markdown(app: &mut App) {
    let (Some(key), Some(content)) = (app.selected_issue().map(|i| i.key.clone()), app.selected_markdown()) else {
        return;
    };
    match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(content)) {
        Ok(()) => app.set_status(format!("Copied {key} as markdown")),
        Err(e) => app.set_error(format!("Failed to copy: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use chrono::NaiveDate;
    use serde_json::json;

    fn make_key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn make_ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn make_app(rows: usize) -> App {
        let today = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
        let mut app = App::new(Config::default(), None, Some(today));
        let raw: Vec<_> = (0..rows)
            .map(|i| {
                serde_json::from_value(json!({
                    "key": format!("K-{i}"),
                    "fields": { "summary": "s", "status": { "name": "In Progress" } }
                }))
                .unwrap()
            })
            .collect();
        app.set_issues(&raw);
        app
    }

    #[test]
    fn test_quit_keys() {
        let mut app = make_app(1);
        assert_eq!(handle_key(&mut app, make_key(KeyCode::Char('q'))), KeyAction::Quit);
        assert_eq!(handle_key(&mut app, make_ctrl('c')), KeyAction::Quit);
    }

    #[test]
    fn test_navigation_keys() {
        let mut app = make_app(30);
        handle_key(&mut app, make_key(KeyCode::Char('j')));
        assert_eq!(app.list_state.selected(), Some(1));
        handle_key(&mut app, make_ctrl('d'));
        assert_eq!(app.list_state.selected(), Some(11));
        handle_key(&mut app, make_ctrl('u'));
        assert_eq!(app.list_state.selected(), Some(1));
        handle_key(&mut app, make_key(KeyCode::Char('G')));
        assert_eq!(app.list_state.selected(), Some(29));
        handle_key(&mut app, make_key(KeyCode::Char('g')));
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn test_details_popup_keys() {
        let mut app = make_app(2);
        handle_key(&mut app, make_key(KeyCode::Enter));
        assert_eq!(app.input_mode, InputMode::Details);

        // j scrolls the popup, not the list
        app.details_scroll_max = 5;
        handle_key(&mut app, make_key(KeyCode::Char('j')));
        assert_eq!(app.details_scroll, 1);
        assert_eq!(app.list_state.selected(), Some(0));

        // q closes the popup instead of quitting
        assert_eq!(handle_key(&mut app, make_key(KeyCode::Char('q'))), KeyAction::None);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_help_toggle() {
        let mut app = make_app(0);
        handle_key(&mut app, make_key(KeyCode::Char('?')));
        assert_eq!(app.input_mode, InputMode::Help);
        handle_key(&mut app, make_key(KeyCode::Char('?')));
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_refresh_key() {
        let mut app = make_app(0);
        assert_eq!(handle_key(&mut app, make_key(KeyCode::Char('r'))), KeyAction::Refresh);
        app.loading = true;
        assert_eq!(handle_key(&mut app, make_key(KeyCode::Char('r'))), KeyAction::None);
    }

    #[test]
    fn test_open_without_base_url_sets_error() {
        let mut app = make_app(1);
        handle_key(&mut app, make_key(KeyCode::Char('o')));
        assert!(app.status_is_error);
    }

    #[test]
    fn test_copy_markdown_without_selection_is_noop() {
        let mut app = make_app(0);
        assert_eq!(handle_key(&mut app, make_key(KeyCode::Char('Y'))), KeyAction::None);
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_custom_keybindings() {
        let mut app = make_app(3);
        app.config.keybindings.down = 'n';
        handle_key(&mut app, make_key(KeyCode::Char('n')));
        assert_eq!(app.list_state.selected(), Some(1));
    }
}
