//! MultiBox Player (mbx-player) - Main entry point
//!
//! Runs the tick loop and reads world events and admin commands from stdin,
//! one per line. Replies go to stdout; logs go to stderr or the configured
//! log file.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use mbx_common::config::{default_config_path, LoggingConfig};
use mbx_player::config::{Config, ConfigOverrides};
use mbx_player::output::LogOutput;
use mbx_player::Host;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for mbx-player
#[derive(Parser, Debug)]
#[command(name = "mbx-player")]
#[command(about = "Multi-item playback units driven by a tick scheduler")]
#[command(version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "MBX_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding item_durations.toml and units.json
    #[arg(short, long, env = "MBX_DATA_FOLDER")]
    data_folder: Option<PathBuf>,

    /// Log level (overrides the config file; RUST_LOG overrides both)
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(default_config_path);
    let config = Config::load(
        config_path.as_deref(),
        ConfigOverrides {
            data_folder: args.data_folder.clone(),
            log_level: args.log_level.clone(),
        },
    )
    .context("Failed to load configuration")?;

    init_tracing(&config.logging)?;

    info!("Starting MultiBox player");
    info!("Data folder: {}", config.data_folder.display());

    let mut host = Host::new(&config, Box::new(LogOutput)).context("Failed to initialize host")?;
    let restored = host.restore().context("Failed to load unit store")?;
    info!("Started {} playback engines", restored);

    let tick = mbx_common::timing::ticks_to_duration(1, config.playback.tick_ms);
    run(&mut host, tick).await;

    host.shutdown().context("Failed to save units")?;
    info!("Shutdown complete");
    Ok(())
}

/// Tick loop plus stdin commands until a shutdown signal or EOF
async fn run(host: &mut Host, tick: Duration) {
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = interval.tick() => {
                host.tick();
                flush_discoveries(host);
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    for reply in host.handle_line(&line) {
                        println!("{}", reply);
                    }
                }
                Ok(None) => {
                    debug!("stdin closed, running until signal");
                    stdin_open = false;
                }
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    stdin_open = false;
                }
            },
        }
    }
}

/// Persist discovered item types without blocking the tick loop
fn flush_discoveries(host: &Host) {
    let durations = host.durations();
    if durations.pending_discoveries() == 0 {
        return;
    }
    tokio::task::spawn_blocking(move || {
        let registered = durations.flush_discoveries();
        if registered > 0 {
            info!("Registered {} new item types", registered);
        }
    });
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter_directive(&["mbx_player", "mbx_common"])));

    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
