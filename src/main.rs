mod app;
mod cache;
mod config;
mod directory;
mod event;
mod mutation;
mod query;
mod table;
mod ui;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "userdeck")]
#[command(about = "A terminal dashboard for managing users over a REST API")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./userdeck.yaml or $XDG_CONFIG_HOME/userdeck/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Base URL of the REST API (overrides config and USERDECK_API_URL)
  #[arg(long)]
  api_url: Option<String>,

  /// Rows per page
  #[arg(long)]
  page_size: Option<u32>,
}

/// Log to a file, since the terminal belongs to the UI.
///
/// The returned guard flushes buffered lines on drop and must be kept alive
/// until exit.
fn init_tracing() -> Result<WorkerGuard> {
  let log_dir = dirs::data_dir()
    .or_else(|| std::env::current_dir().ok())
    .ok_or_else(|| eyre!("No directory available for the log file"))?
    .join("userdeck");
  std::fs::create_dir_all(&log_dir)?;

  let appender = tracing_appender::rolling::never(&log_dir, "userdeck.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

  tracing_subscriber::registry()
    .with(env_filter)
    .with(
      tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false),
    )
    .try_init()
    .map_err(|e| eyre!("Failed to initialise logging: {}", e))?;

  Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = init_tracing()?;

  // Command line wins over file and environment
  let config =
    config::Config::load(args.config.as_deref())?.with_overrides(args.api_url, args.page_size)?;

  tracing::info!(api = %config.api.url, page_size = config.table.page_size, "starting");

  // Initialize and run the app
  let mut app = app::App::new(config)?;
  app.run().await?;

  Ok(())
}
