//! `Hoist` installer daemon
//!
//! Serves the browser-driven installer: starts the provisioning workflow,
//! streams its events over SSE, and relays prompt answers back to it.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use hoist_core::config::{load_config, load_config_from};
use hoist_core::tracing_init::init_tracing;
use hoist_daemon::server::{AppState, HttpServer, ServerConfig};
use hoist_daemon::workflow::AwsCredentials;

#[derive(Parser, Debug)]
#[command(name = "hoist-daemon")]
#[command(version, about = "Hoist installer - browser-driven cluster install")]
struct Args {
    /// HTTP port (overrides settings and `HOIST_PORT`)
    #[arg(long)]
    port: Option<u16>,

    /// Settings file (defaults to `<config dir>/hoist/settings.json`)
    #[arg(long, env = "HOIST_CONFIG")]
    config: Option<PathBuf>,

    /// Log level filter (e.g. "info", "debug", "warn").
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, env = "HOIST_LOG_JSON")]
    log_json: bool,

    /// Seconds between SSE keep-alive comments.
    #[arg(long)]
    keepalive_secs: Option<u64>,

    /// Pause between simulated provisioning steps, in milliseconds.
    #[arg(long)]
    step_delay_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match args.config.as_deref() {
        Some(path) => load_config_from(Some(path))?,
        None => load_config()?,
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(level) = args.log_level {
        config.server.log_level = level;
    }
    if let Some(secs) = args.keepalive_secs {
        config.server.keepalive_secs = secs;
    }
    if let Some(ms) = args.step_delay_ms {
        config.install.step_delay_ms = ms;
    }

    init_tracing(&config.server.log_level, args.log_json);

    let env_credentials = AwsCredentials::from_env();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.server.port,
        region = %config.install.region,
        env_credentials = env_credentials.is_some(),
        "Starting hoist-daemon"
    );

    let server_config = ServerConfig::port(config.server.port)
        .with_keepalive(Duration::from_secs(config.server.keepalive_secs));
    let server = HttpServer::new(server_config, AppState::new(config.install, env_credentials));

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);
    let mut server_handle = tokio::spawn(server.serve(async move {
        let _ = shutdown_rx.changed().await;
    }));

    #[cfg(unix)]
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    #[cfg(unix)]
    let sigterm_future = sigterm.recv();
    #[cfg(not(unix))]
    let sigterm_future = std::future::pending::<Option<()>>();

    info!(
        "Navigate to http://localhost:{} in your web browser to get started",
        config.server.port
    );

    tokio::select! {
        result = &mut server_handle => {
            return Ok(result??);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C shutdown signal");
        }
        _ = sigterm_future => {
            info!("Received SIGTERM shutdown signal");
        }
    }

    let _ = shutdown_tx.send(true);
    server_handle.await??;

    info!("Installer stopped");
    Ok(())
}
