//! SSRF Lab server
//!
//! Run: cargo run --bin ssrf-lab
//! Test:
//!   # Direct access is refused
//!   curl http://localhost:5000/internal/flag
//!
//!   # The relay fetches it from loopback
//!   curl -X POST http://localhost:5000/fetch -d 'url=http://127.0.0.1:5000/internal/flag'
//!
//!   # Hardened mode shortcut: path-only values target this service
//!   curl -X POST http://localhost:5000/fetch -d 'url=/internal/health'

use anyhow::Context;
use ssrf_lab::{AppState, Config, fetch::Fetcher, telemetry};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    telemetry::init(config.log_format).context("failed to initialize logging")?;

    let fetcher = Fetcher::new().context("failed to build HTTP client")?;
    let addr = config.bind_addr();

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("SSRF lab server running on http://{}", addr);
    tracing::info!("");
    tracing::info!("Available endpoints:");
    tracing::info!("  GET  /                 - Landing page");
    tracing::info!("  POST /fetch            - VULNERABLE: Fetches any URL");
    tracing::info!("");
    tracing::info!("Internal endpoints (loopback only):");
    tracing::info!("  GET  /internal/flag    - The secret");
    tracing::info!("  GET  /internal/health  - Liveness probe");
    tracing::info!("");
    tracing::info!(mode = ?config.mode, "Fetch relay mode");
    tracing::info!(
        trusted_proxy_hops = config.trusted_proxy_hops,
        "Client address resolution"
    );
    if config.trusted_proxy_hops > 0 {
        tracing::warn!(
            trusted_proxy_hops = config.trusted_proxy_hops,
            "X-Forwarded-For is trusted; a hop count above the real proxy depth lets clients spoof loopback"
        );
    }

    let state = AppState::new(config, fetcher);
    ssrf_lab::serve(listener, state, shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
