//! brokenhub control panel
//!
//! Serves the impairment settings form, writes submitted values to the
//! daemon's JSON config file, and runs the daemon's control command with
//! `reload`.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use brokenhub_panel::settings::{Overrides, Settings};
use brokenhub_panel::{panel, state};

/// Web control panel for the brokenhub impairment daemon.
#[derive(Parser, Debug)]
#[command(name = "brokenhub-panel", about = "brokenhub web control panel")]
struct Cli {
    /// Optional TOML settings file.
    #[arg(long, env = "BROKENHUB_PANEL_SETTINGS")]
    settings: Option<PathBuf>,

    /// HTTP listen address [default: 0.0.0.0:5001].
    #[arg(long, env = "BROKENHUB_PANEL_LISTEN_ADDR")]
    listen_addr: Option<SocketAddr>,

    /// Daemon configuration file [default: /etc/brokenhub.conf].
    #[arg(long, env = "BROKENHUB_PANEL_CONFIG_PATH")]
    config_path: Option<PathBuf>,

    /// Control command, invoked as `<command> reload` [default: /etc/init.d/brokenhub].
    #[arg(long, env = "BROKENHUB_PANEL_CONTROL_COMMAND")]
    control_command: Option<PathBuf>,

    /// Seconds before a hung reload is killed and reported as failed (0 = wait forever).
    #[arg(long, env = "BROKENHUB_PANEL_RELOAD_TIMEOUT")]
    reload_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ─────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── Settings ────────────────────────────────────────────────
    let cli = Cli::parse();
    let base = match &cli.settings {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    let settings = base.with_overrides(Overrides {
        listen_addr: cli.listen_addr,
        config_path: cli.config_path,
        control_command: cli.control_command,
        reload_timeout_secs: cli.reload_timeout_secs,
    });

    tracing::info!(
        config_path = %settings.config_path.display(),
        control_command = %settings.control_command.display(),
        reload_timeout = ?settings.reload_timeout(),
        "brokenhub-panel starting"
    );

    // ── Shared state ────────────────────────────────────────────
    let state = state::AppState::from_settings(&settings);

    // The file is never created here; a bad file only fails requests.
    if let Err(e) = state.store().load().await {
        tracing::warn!(error = %e, "config file not usable yet");
    }

    // ── Router ──────────────────────────────────────────────────
    let app = panel::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // ── Listen ──────────────────────────────────────────────────
    tracing::info!("brokenhub-panel listening on http://{}", settings.listen_addr);
    let listener = tokio::net::TcpListener::bind(settings.listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("brokenhub-panel stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for SIGINT: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("received SIGINT, shutting down");
}
