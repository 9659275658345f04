//! HTTP surface: landing page, fetch relay and the internal endpoints
//!
//! Routes:
//!   GET  /                 - landing page with the URL form
//!   POST /fetch            - VULNERABLE: fetches whatever URL is submitted
//!   GET  /internal/flag    - secret, loopback callers only
//!   GET  /internal/health  - liveness probe, loopback callers only

use crate::{
    config::Config,
    error::AppError,
    fetch::{self, Fetcher},
    guard::ClientAddr,
    pages,
};
use axum::{
    Form, Json, Router,
    extract::{State, rejection::FormRejection},
    http::{HeaderMap, header::ACCEPT},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

pub const FLAG_FORBIDDEN: &str = "Forbidden: internal endpoint (localhost only)\n";
pub const HEALTH_FORBIDDEN: &str = "Forbidden\n";

/// Same ceiling as axum's default body limit; the URL itself is not capped
const MAX_FORM_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub fetcher: Fetcher,
}

impl AppState {
    pub fn new(config: Config, fetcher: Fetcher) -> Self {
        Self {
            config: Arc::new(config),
            fetcher,
        }
    }
}

/// Form submitted by the landing page
#[derive(Debug, Deserialize)]
pub struct FetchForm {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FetchResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        // Vulnerable endpoint - SSRF by design
        .route("/fetch", post(fetch_url))
        // Internal endpoints (attack targets)
        .route("/internal/flag", get(internal_flag))
        .route("/internal/health", get(internal_health))
        .layer(RequestBodyLimitLayer::new(MAX_FORM_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(pages::index_page())
}

/// VULNERABLE: fetches the submitted URL with no destination validation
///
/// Anything reachable from the server is reachable through here, including
/// this service's own `/internal/*` endpoints via loopback.
async fn fetch_url(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<FetchForm>, FormRejection>,
) -> Result<Response, AppError> {
    // No form at all (wrong content type, JSON, bare POST) reads as an empty url
    let raw = match form {
        Ok(Form(form)) => form.url,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "No usable form body on /fetch");
            String::new()
        }
    };
    let url = fetch::normalize_url(&raw)?;
    let target = fetch::resolve_target(&url, state.config.mode, state.config.port)?;

    tracing::warn!(
        url = target,
        mode = ?state.config.mode,
        "VULNERABLE: Fetching user-provided URL without destination validation"
    );

    let outcome = state.fetcher.fetch(&target).await;

    tracing::info!(
        url = target,
        status = outcome.status,
        body_length = outcome.body.len(),
        "Returned fetched content to user"
    );

    if wants_json(&headers) {
        return Ok(Json(FetchResponse {
            url: target,
            status: outcome.status,
            body: outcome.body,
        })
        .into_response());
    }

    Ok(Html(pages::result_page(&target, &outcome)).into_response())
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}

/// Internal-only flag. The intended way in is through `/fetch`.
async fn internal_flag(
    State(state): State<AppState>,
    client: ClientAddr,
) -> Result<String, AppError> {
    if !client.is_local() {
        tracing::warn!(
            client = client.addr,
            peer = %client.peer,
            "Blocked non-loopback access to /internal/flag"
        );
        return Err(AppError::Forbidden(FLAG_FORBIDDEN));
    }

    tracing::warn!(client = client.addr, "Flag disclosed to loopback caller");
    Ok(format!("{}\n", state.config.flag))
}

/// Liveness probe behind the same loopback check
async fn internal_health(client: ClientAddr) -> Result<&'static str, AppError> {
    if !client.is_local() {
        tracing::info!(client = client.addr, "Blocked non-loopback health check");
        return Err(AppError::Forbidden(HEALTH_FORBIDDEN));
    }
    Ok("OK\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wants_json() {
        let mut headers = HeaderMap::new();
        assert!(!wants_json(&headers));

        headers.insert(ACCEPT, "text/html".parse().unwrap());
        assert!(!wants_json(&headers));

        headers.insert(ACCEPT, "application/json, text/plain".parse().unwrap());
        assert!(wants_json(&headers));
    }
}
