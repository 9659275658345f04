//! Access guard for the `/internal/*` endpoints
//!
//! The decision is a plain string comparison against two loopback literals.
//! IPv4-mapped forms (`::ffff:127.0.0.1`) and the rest of `127.0.0.0/8` do
//! not count as local.

use crate::routes::AppState;
use axum::{
    extract::{ConnectInfo, FromRequestParts, rejection::ExtensionRejection},
    http::{HeaderMap, request::Parts},
};
use std::net::SocketAddr;

pub const LOOPBACK_ADDRS: [&str; 2] = ["127.0.0.1", "::1"];
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

pub fn is_local(addr: &str) -> bool {
    LOOPBACK_ADDRS.contains(&addr)
}

/// All `X-Forwarded-For` entries, left to right, across repeated headers.
/// Non-UTF-8 bytes are replaced, never dropped, so appended entries keep their positions.
pub fn forwarded_chain(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .flat_map(|v| {
            String::from_utf8_lossy(v.as_bytes())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Resolves the address the guard should judge.
///
/// Each trusted proxy appends the address it saw, so with `trusted_hops`
/// proxies in front the client is the entry `trusted_hops` positions from the
/// right. A shorter (or absent) chain falls back to the TCP peer.
pub fn resolve_client_addr(peer: SocketAddr, headers: &HeaderMap, trusted_hops: usize) -> String {
    if trusted_hops == 0 {
        return peer.ip().to_string();
    }

    let chain = forwarded_chain(headers);
    if chain.len() >= trusted_hops {
        chain[chain.len() - trusted_hops].clone()
    } else {
        peer.ip().to_string()
    }
}

/// Client address as resolved for the current request
#[derive(Debug, Clone)]
pub struct ClientAddr {
    pub addr: String,
    pub peer: SocketAddr,
}

impl ClientAddr {
    pub fn is_local(&self) -> bool {
        is_local(&self.addr)
    }
}

impl FromRequestParts<AppState> for ClientAddr {
    type Rejection = ExtensionRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ConnectInfo(peer) =
            ConnectInfo::<SocketAddr>::from_request_parts(parts, state).await?;
        let addr = resolve_client_addr(peer, &parts.headers, state.config.trusted_proxy_hops);

        tracing::debug!(
            peer = %peer,
            resolved = addr,
            trusted_hops = state.config.trusted_proxy_hops,
            "Resolved client address"
        );

        Ok(ClientAddr { addr, peer })
    }
}
