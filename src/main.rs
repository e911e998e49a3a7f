mod app;
mod catalog;
mod config;
mod constants;
mod debounce;
mod input;
mod player;
mod reminder;
mod theme;
mod ui;
mod youtube;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use directories::ProjectDirs;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::time::{Duration, Instant};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use app::App;
use youtube::YoutubeClient;

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Jump straight to a category after login (e.g. "Typescript")
  #[arg(short, long)]
  category: Option<String>,

  /// Generate shell completions and exit
  #[arg(long, value_enum)]
  completions: Option<Shell>,
}

/// Logs go to a rolling file under the data dir; the terminal is owned by
/// the UI, so nothing may write to stdout/stderr while the app runs.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
  let proj_dirs = ProjectDirs::from("", "", "edutube")?;
  let log_dir = proj_dirs.data_dir().join("logs");
  std::fs::create_dir_all(&log_dir).ok()?;
  let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, "edutube.log"));
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("edutube=info")))
    .with_writer(writer)
    .with_ansi(false)
    .init();
  Some(guard)
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(shell) = args.completions {
    clap_complete::generate(shell, &mut Args::command(), "edutube", &mut std::io::stdout());
    return Ok(());
  }

  let _log_guard = init_logging();

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, args).await;
  ratatui::restore();
  result
}

async fn run(terminal: &mut DefaultTerminal, args: Args) -> Result<()> {
  let api_key = std::env::var("YOUTUBE_API_KEY").unwrap_or_default();
  let mut app = App::new(YoutubeClient::new(api_key.clone()), args.category);
  if api_key.is_empty() {
    warn!("YOUTUBE_API_KEY not set, searches will return no results");
    app.info_message = Some("Set YOUTUBE_API_KEY to fetch videos.".to_string());
  }

  loop {
    app.check_pending();
    app.player.check_mpv_status();
    app.poll_debounce(Instant::now());
    app.expire_error();

    terminal.draw(|frame| ui::ui(frame, &mut app))?;

    if event::poll(Duration::from_millis(100))?
      && let Event::Key(key) = event::read()?
      && key.kind == KeyEventKind::Press
    {
      input::handle_key_event(&mut app, key).await?;
    }

    if app.should_quit {
      break;
    }
  }

  app.reminder.cancel_all();
  app.player.stop().await?;
  Ok(())
}
