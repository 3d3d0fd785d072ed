use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use ihelp_core::{BackendClient, Config, GatewaySettings, Overrides, Session};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;

use app::{wait_for, App};
use tui::{EventHandler, Tui};

const TICK_RATE: Duration = Duration::from_millis(300);

#[derive(Parser)]
#[command(name = "ihelp", version)]
#[command(about = "Chat with your documents from the terminal")]
struct Cli {
    /// Backend base URL (overrides IHELP_API_URL and the config file)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Where to write the log (defaults to the config directory)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "could not read config, using defaults");
        Config::new()
    });
    let overrides = Overrides {
        api_url: cli.api_url,
        timeout_secs: cli.timeout,
    };
    let settings = GatewaySettings::resolve(&config, &overrides);
    info!(
        base_url = %settings.base_url,
        chat_path = %settings.chat_path,
        timeout_secs = settings.timeout.as_secs(),
        "starting ihelp"
    );

    let client = BackendClient::new(settings).context("failed to build HTTP client")?;
    let mut app = App::new(Session::new(), client);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    result
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new(TICK_RATE);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        tokio::select! {
            event = events.next() => match event {
                Some(event) => handler::handle_event(app, event)?,
                None => break,
            },
            result = wait_for(&mut app.chat_task) => app.complete_chat(result),
            result = wait_for(&mut app.documents_task) => app.complete_documents(result),
        }
    }

    info!("exiting");
    Ok(())
}

/// Logs go to a file because the terminal belongs to the UI
fn init_logging(cli: &Cli) -> Result<()> {
    let path = match &cli.log_file {
        Some(path) => path.clone(),
        None => Config::config_dir()?.join("ihelp.log"),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ihelp_tui={level},ihelp_core={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
