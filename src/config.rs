//! Runtime configuration loaded from the environment
//!
//! Everything is read once at startup and shared read-only afterwards.

use crate::error::ConfigError;
use std::{net::SocketAddr, str::FromStr};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_FLAG: &str = "FLAG{ssrf_loopback_bypass}";

/// How much input hygiene the fetch relay applies before fetching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Any URL string goes straight to the HTTP client
    Open,
    /// Only http/https, and `/path` is rewritten to the loopback interface.
    /// Still no destination allowlist.
    #[default]
    Hardened,
}

impl FromStr for FetchMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(FetchMode::Open),
            "hardened" => Ok(FetchMode::Hardened),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub flag: String,
    /// Number of reverse-proxy hops allowed to set `X-Forwarded-For`.
    /// Zero means forwarded headers are never consulted.
    pub trusted_proxy_hops: usize,
    pub mode: FetchMode,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            flag: DEFAULT_FLAG.to_string(),
            trusted_proxy_hops: 0,
            mode: FetchMode::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; unset keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(raw) = lookup("PORT") {
            config.port = raw
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|port| *port != 0)
                .ok_or(ConfigError::InvalidPort(raw))?;
        }

        if let Some(flag) = lookup("FLAG") {
            config.flag = flag;
        }

        if let Some(raw) = lookup("TRUSTED_PROXY_HOPS") {
            config.trusted_proxy_hops = raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidHops(raw))?;
        }

        if let Some(raw) = lookup("SSRF_MODE") {
            config.mode = raw.parse()?;
        }

        if let Some(raw) = lookup("LOG_FORMAT") {
            config.log_format = raw.parse()?;
        }

        Ok(config)
    }

    /// The server listens on every interface, like a real networked service.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.flag, DEFAULT_FLAG);
        assert_eq!(config.trusted_proxy_hops, 0);
        assert_eq!(config.mode, FetchMode::Hardened);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:5000");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "8081"),
            ("FLAG", "CTF{test}"),
            ("TRUSTED_PROXY_HOPS", "1"),
            ("SSRF_MODE", "Open"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8081);
        assert_eq!(config.flag, "CTF{test}");
        assert_eq!(config.trusted_proxy_hops, 1);
        assert_eq!(config.mode, FetchMode::Open);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            Config::from_lookup(lookup_from(&[("PORT", "http")])),
            Err(ConfigError::InvalidPort(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup_from(&[("PORT", "0")])),
            Err(ConfigError::InvalidPort(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup_from(&[("TRUSTED_PROXY_HOPS", "-1")])),
            Err(ConfigError::InvalidHops(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup_from(&[("SSRF_MODE", "strict")])),
            Err(ConfigError::InvalidMode(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup_from(&[("LOG_FORMAT", "xml")])),
            Err(ConfigError::InvalidLogFormat(_))
        ));
    }
}
