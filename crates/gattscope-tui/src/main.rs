//! `gattscope` — Terminal inspector for BLE devices and their GATT trees.
//!
//! Built on [ratatui](https://ratatui.rs) with reactive data from
//! `gattscope-core`'s [`SnapshotStream`](gattscope_core::SnapshotStream).
//! Screens are navigable via number keys (1-2): Inspector and Log.
//!
//! Logs are written to a file (default `/tmp/gattscope.log`) to avoid
//! corrupting the terminal UI. A background data bridge task continuously
//! streams store updates from the session into the TUI action loop.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, and app
//! launch.

mod action;
mod app;
mod component;
mod config;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use gattscope_core::{Session, SimulatedDriver};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;

/// Terminal inspector for BLE devices and their GATT attribute trees.
#[derive(Parser, Debug)]
#[command(name = "gattscope", version, about)]
struct Cli {
    /// Advertising name for the local adapter
    #[arg(short = 'n', long, env = "GATTSCOPE_ADAPTER_NAME")]
    adapter_name: Option<String>,

    /// Log file path (defaults to /tmp/gattscope.log)
    #[arg(long, env = "GATTSCOPE_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr — that would
/// corrupt the TUI output. Returns a guard that must be held for the
/// lifetime of the application to ensure logs are flushed.
fn setup_tracing(log_file: &std::path::Path, verbose: u8) -> WorkerGuard {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("gattscope={log_level},gattscope_core={log_level}"))
    });

    let log_dir = log_file.parent().unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("gattscope.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // CLI flags win over the config file
    let mut cfg = config::load_or_default();
    if let Some(name) = cli.adapter_name {
        cfg.adapter_name = name;
    }
    if let Some(path) = cli.log_file {
        cfg.log_file = path;
    }

    // Tracing to file — hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cfg.log_file, cli.verbose);

    info!(adapter = %cfg.adapter_name, "starting gattscope");

    let session = Session::new();
    session
        .attach(SimulatedDriver::with_adapter_name(cfg.adapter_name.clone()))
        .await?;

    let mut app = App::new(session.clone(), cfg);
    let result = app.run().await;

    session.shutdown().await;
    result
}
