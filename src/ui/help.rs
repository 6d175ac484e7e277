use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

pub fn draw_popup(f: &mut Frame, app: &App, area: Rect) {
    let kb = &app.config.keybindings;
    let help_text = format!(
        r#"
NAVIGATION
  {down}/{up} ↑/↓       Move down/up
  {top}/{bottom}           Go to top/bottom
  Ctrl+d/u      Page down/up
  Enter         Issue details
  Esc           Close popup

ACTIONS
  {open}             Open issue in browser
  {copy}             Copy issue key
  {copy_details}             Copy issue as markdown
  {refresh}             Refresh issues

CHART
  ●             Resolved
  ◐             In Progress
  ○             Not started
  shaded column Current period
  red column    Delivery target

  {help}             Toggle help
  {quit}             Quit
"#,
        down = kb.down,
        up = kb.up,
        top = kb.top,
        bottom = kb.bottom,
        open = kb.open,
        copy = kb.copy_key,
        copy_details = kb.copy_details,
        refresh = kb.refresh,
        help = kb.help,
        quit = kb.quit,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help - Press ? or Esc to close ");

    let inner = super::centered_rect(50, 27, area);
    f.render_widget(Clear, inner);

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, inner);
}
