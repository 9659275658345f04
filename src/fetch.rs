//! The fetch relay
//!
//! Takes a caller-supplied URL and GETs it from the server. There is no
//! allowlist, no private-IP filter and no DNS-rebinding check. That is the
//! whole point of the lab: the relay runs next to `/internal/*` and its
//! requests arrive from the loopback interface.

use crate::{config::FetchMode, error::AppError};
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Bodies longer than this many characters are cut for the UI
pub const MAX_BODY_CHARS: usize = 5000;
pub const TRUNCATION_MARKER: &str = "\n\n[truncated]";
pub const USER_AGENT: &str = "A10-SSRF-CTF/1.0";
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(4);
pub const MAX_REDIRECTS: usize = 10;

/// Status and (possibly truncated) body of one relayed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchOutcome {
    pub status: u16,
    pub body: String,
}

/// Removes every whitespace character; an empty result is a missing URL.
pub fn normalize_url(raw: &str) -> Result<String, AppError> {
    let url: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if url.is_empty() {
        return Err(AppError::MissingUrl);
    }
    Ok(url)
}

/// Turns the normalized input into the URL that is actually requested.
///
/// In hardened mode a path-only value such as `/internal/health` targets this
/// service over loopback, and anything that is not http/https is refused.
/// Open mode passes the value through untouched.
pub fn resolve_target(url: &str, mode: FetchMode, loopback_port: u16) -> Result<String, AppError> {
    match mode {
        FetchMode::Open => Ok(url.to_string()),
        FetchMode::Hardened => {
            if url.starts_with('/') {
                return Ok(format!("http://127.0.0.1:{loopback_port}{url}"));
            }

            let parsed = Url::parse(url).map_err(|_| AppError::SchemeNotAllowed)?;
            match parsed.scheme() {
                "http" | "https" => Ok(url.to_string()),
                _ => Err(AppError::SchemeNotAllowed),
            }
        }
    }
}

/// Cuts `text` to [`MAX_BODY_CHARS`] characters and marks the cut.
pub fn truncate_body(mut text: String) -> String {
    if let Some((cut, _)) = text.char_indices().nth(MAX_BODY_CHARS) {
        text.truncate(cut);
        text.push_str(TRUNCATION_MARKER);
    }
    text
}

/// Compares parsed forms, so scheme/host case and a bare trailing `/` don't count.
pub fn was_redirected(requested: &str, final_url: &Url) -> bool {
    Url::parse(requested).map_or(true, |requested| &requested != final_url)
}

/// Outbound HTTP client shared by every `/fetch` request
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        // Redirects are followed without re-checking the destination
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }

    /// GETs `url`. Transport failures come back as a 500 outcome, never as an error.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        match self.try_fetch(url).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(url = url, error = %e, "Fetch failed");
                FetchOutcome {
                    status: 500,
                    body: format!("Fetch error: {}", e),
                }
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<FetchOutcome, reqwest::Error> {
        let response = self.client.get(url).send().await?;

        let status = response.status().as_u16();
        if was_redirected(url, response.url()) {
            tracing::warn!(
                original = url,
                final_url = %response.url(),
                "Request was redirected, destination not re-validated"
            );
        }

        let body = response.text().await?;
        tracing::debug!(url = url, status = status, body_length = body.len(), "Upstream responded");

        Ok(FetchOutcome {
            status,
            body: truncate_body(body),
        })
    }
}
