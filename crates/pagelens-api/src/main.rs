//! Pagelens server entry point.
//!
//! Binary name: `pagelens`
//!
//! Parses CLI arguments, loads the TOML configuration, initializes the
//! chat manager against the local model runtime, and serves the HTTP +
//! WebSocket API the extension client connects to.

mod http;
mod state;

use clap::Parser;

use pagelens_types::config::AssistantConfig;
use state::AppState;

#[derive(Parser)]
#[command(name = "pagelens", about = "Page-context-aware chat over on-device AI")]
struct Cli {
    /// Path to the TOML configuration file. Missing file means defaults.
    #[arg(long, env = "PAGELENS_CONFIG", default_value = "pagelens.toml")]
    config: std::path::PathBuf,

    /// Bind address, overriding the configuration.
    #[arg(long)]
    bind: Option<String>,

    /// Export traces to stdout via OpenTelemetry.
    #[arg(long)]
    otel: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    pagelens_observe::tracing_setup::init_tracing(cli.otel)
        .map_err(|e| anyhow::anyhow!("tracing init failed: {e}"))?;

    let mut config = load_config(&cli.config).await?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    let addr = config.server.bind.clone();
    let state = AppState::init(config);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "pagelens listening");

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pagelens_observe::tracing_setup::shutdown_tracing();
    Ok(())
}

/// Load configuration, treating a missing file as all-defaults.
async fn load_config(path: &std::path::Path) -> anyhow::Result<AssistantConfig> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => {
            let config = toml::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))?;
            tracing::info!(path = %path.display(), "configuration loaded");
            Ok(config)
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Ok(AssistantConfig::default())
        }
        Err(err) => Err(anyhow::anyhow!("cannot read {}: {err}", path.display())),
    }
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
