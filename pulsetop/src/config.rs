//! Resolved client configuration: where to stream from, where to send commands.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::ws::{DEFAULT_RECONNECT_DELAY, MIN_RECONNECT_DELAY};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid url {0:?}: {1}")]
    Url(String, url::ParseError),
    #[error("unsupported scheme {0:?} (expected ws, wss, http or https)")]
    Scheme(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub url: String,
    pub tls_ca: Option<PathBuf>,
    pub api_base: String,
    pub reconnect_delay: Duration,
}

impl ClientConfig {
    pub fn new(
        url: &str,
        tls_ca: Option<&str>,
        api: Option<&str>,
        reconnect_ms: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let api_base = match api {
            Some(a) => normalize_api(a)?,
            None => api_base_from_ws(url)?,
        };
        Ok(Self {
            url: url.to_string(),
            tls_ca: tls_ca.map(PathBuf::from),
            api_base,
            reconnect_delay: reconnect_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_RECONNECT_DELAY)
                .max(MIN_RECONNECT_DELAY),
        })
    }
}

/// `ws://host:port/ws` -> `http://host:port`, `wss` -> `https`.
pub fn api_base_from_ws(ws_url: &str) -> Result<String, ConfigError> {
    let u = Url::parse(ws_url).map_err(|e| ConfigError::Url(ws_url.to_string(), e))?;
    let scheme = match u.scheme() {
        "ws" | "http" => "http",
        "wss" | "https" => "https",
        other => return Err(ConfigError::Scheme(other.to_string())),
    };
    let host = u.host_str().unwrap_or("127.0.0.1");
    Ok(match u.port() {
        Some(p) => format!("{scheme}://{host}:{p}"),
        None => format!("{scheme}://{host}"),
    })
}

fn normalize_api(api: &str) -> Result<String, ConfigError> {
    let u = Url::parse(api).map_err(|e| ConfigError::Url(api.to_string(), e))?;
    match u.scheme() {
        "http" | "https" => Ok(api.trim_end_matches('/').to_string()),
        other => Err(ConfigError::Scheme(other.to_string())),
    }
}
