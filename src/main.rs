use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use waterfall::app::{App, IssueSource};
use waterfall::config::Config;
use waterfall::{events, jira, print};

/// Waterfall timeline for the issues of a Jira epic
#[derive(Parser)]
#[command(name = "waterfall")]
#[command(version = "0.1.0")]
#[command(about = "Waterfall timeline for Jira epics", long_about = None)]
struct Args {
    /// Config file (defaults to ~/.config/waterfall/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Epic whose issues are shown
    #[arg(long, conflicts_with_all = ["jql", "fixture"])]
    epic: Option<String>,

    /// Raw JQL query
    #[arg(long, conflicts_with = "fixture")]
    jql: Option<String>,

    /// JSON file with issues, used instead of the API
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Print the timeline to stdout instead of starting the TUI
    #[arg(long)]
    print: bool,

    /// Print one issue's description as markdown
    #[arg(long, value_name = "KEY")]
    describe: Option<String>,

    /// Pretend today is this date (YYYY-MM-DD)
    #[arg(long, value_name = "YYYY-MM-DD")]
    today: Option<NaiveDate>,
}

impl Args {
    fn interactive(&self) -> bool {
        !self.print && self.describe.is_none()
    }

    /// Command line source first, then the config
    fn source(&self, config: &Config) -> Option<IssueSource> {
        if let Some(path) = &self.fixture {
            return Some(IssueSource::Fixture(path.clone()));
        }
        if let Some(jql) = &self.jql {
            return Some(IssueSource::Jql(jql.clone()));
        }
        if let Some(epic) = &self.epic {
            return Some(IssueSource::Jql(jira::client::epic_jql(epic)));
        }
        config.jira.query().map(IssueSource::Jql)
    }
}

/// Log to a file under the cache dir in TUI mode so the screen stays clean,
/// to stderr otherwise. `RUST_LOG` sets the level, `warn` by default.
fn init_logging(interactive: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if interactive {
        let Some(dir) = dirs::cache_dir().map(|d| d.join("waterfall")) else {
            return;
        };
        let file = std::fs::create_dir_all(&dir)
            .and_then(|_| {
                std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(dir.join("waterfall.log"))
            });
        if let Ok(file) = file {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_level(true)
            .with_writer(io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.interactive());

    // Load config
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };

    let source = args.source(&config);
    if source.is_none() {
        eprintln!("No issues to show. Pass --epic, --jql or --fixture, or set jira.epic in ~/.config/waterfall/config.toml");
        std::process::exit(1);
    }

    let mut app = App::new(config, source, args.today);

    if !args.interactive() {
        return run_print(&mut app, &args).await;
    }

    // Setup panic hook for clean terminal restore
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = events::run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }

    Ok(())
}

async fn run_print(app: &mut App, args: &Args) -> Result<()> {
    app.load_issues().await.context("Failed to load issues")?;

    let described = match &args.describe {
        Some(key) => Some(match app.issues.iter().find(|i| &i.key == key) {
            Some(issue) => issue.clone(),
            None => {
                let raw = app.client()?.get_issue(key).await?;
                jira::Issue::from_jira(&raw, &app.field_ids)
            }
        }),
        None => None,
    };

    let mut stdout = io::stdout().lock();
    if let Some(issue) = &described {
        print::write_description(&mut stdout, issue)?;
    }
    if args.print {
        print::write_timeline(&mut stdout, &app.issues, &app.timeline, &app.summary)?;
    }
    Ok(())
}
