use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use pagerbridge_server::config::{ConfigStore, PluginConfig};
use pagerbridge_server::plugin::Plugin;

/// PagerDuty schedules and on-calls for chat.
#[derive(Parser, Debug)]
#[command(name = "pagerbridge-server", about = "HTTP facade for PagerDuty schedules and on-calls")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "pagerbridge.toml")]
    config: PathBuf,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if !cli.config.exists() {
        info!(path = %cli.config.display(), "config file not found, using defaults");
    }
    let config = PluginConfig::load(&cli.config)?;

    let host = cli.host.unwrap_or_else(|| config.server.host.clone());
    let port = cli.port.unwrap_or(config.server.port);
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);

    let store = Arc::new(ConfigStore::from_file(&cli.config, config));
    let plugin = Plugin::activate(Arc::clone(&store)).await?;

    #[cfg(unix)]
    spawn_reload_on_hangup(Arc::clone(plugin.config()))?;

    let app = pagerbridge_server::api::router(plugin.state());

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "pagerbridge-server listening");

    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
    let serve = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(());
        })
        .into_future();
    tokio::pin!(serve);

    // Serve until a shutdown signal, then give in-flight requests a bounded
    // amount of time to finish.
    tokio::select! {
        res = &mut serve => res?,
        _ = signalled_rx => {
            match tokio::time::timeout(shutdown_timeout, &mut serve).await {
                Ok(res) => res?,
                Err(_) => warn!(
                    timeout_secs = shutdown_timeout.as_secs(),
                    "shutdown timeout exceeded, dropping in-flight requests"
                ),
            }
        }
    }

    plugin.deactivate();
    info!("pagerbridge-server shut down");
    Ok(())
}

/// Reload the configuration file on every SIGHUP.
#[cfg(unix)]
fn spawn_reload_on_hangup(store: Arc<ConfigStore>) -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = signal(SignalKind::hangup())?;
    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            info!("received SIGHUP, reloading configuration");
            // Failures are logged by the store and leave the old snapshot active.
            let _ = store.reload().await;
        }
    });
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
