//! Error handling for the lab endpoints
//!
//! Errors here are user-facing and rendered as plain text so the response
//! body can be read directly through the fetch relay.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Missing url")]
    MissingUrl,

    #[error("Only http/https allowed")]
    SchemeNotAllowed,

    #[error("{0}")]
    Forbidden(&'static str),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingUrl | AppError::SchemeNotAllowed => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Startup configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid PORT value '{0}': expected a number between 1 and 65535")]
    InvalidPort(String),

    #[error("invalid TRUSTED_PROXY_HOPS value '{0}': expected a non-negative integer")]
    InvalidHops(String),

    #[error("invalid SSRF_MODE value '{0}': expected 'hardened' or 'open'")]
    InvalidMode(String),

    #[error("invalid LOG_FORMAT value '{0}': expected 'pretty' or 'json'")]
    InvalidLogFormat(String),
}
