//! SSRF Lab - Rust Implementation
//!
//! An intentionally vulnerable URL fetcher next to a loopback-only flag
//! endpoint. Do not expose it anywhere that matters.

pub mod config;
pub mod error;
pub mod fetch;
pub mod guard;
pub mod pages;
pub mod routes;
pub mod telemetry;

pub use config::Config;
pub use error::AppError;
pub use routes::{AppState, build_router};

use std::{future::Future, net::SocketAddr};
use tokio::net::TcpListener;

/// Serves the lab on `listener` until `shutdown` resolves.
///
/// Connect info is required: the access guard reads the TCP peer address.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}
