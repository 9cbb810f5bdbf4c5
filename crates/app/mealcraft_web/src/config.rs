//! Frontend configuration.

use std::time::Duration;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Configuration for the frontend server.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Address to bind the HTTP listener.
    pub bind_addr: String,
    /// Base of the backend API, including the version prefix.
    pub backend_api_base: Url,
    /// Deadline for the backend health probe on the index page.
    pub health_timeout: Duration,
    /// Deadline for a forwarded query. Longer than the backend's own
    /// completion timeout so its 504 reaches the page.
    pub query_timeout: Duration,
}

impl WebConfig {
    /// | Variable           | Default                          |
    /// |--------------------|----------------------------------|
    /// | `WEB_BIND_ADDR`    | `0.0.0.0:3000`                   |
    /// | `BACKEND_API_BASE` | `http://localhost:8000/api/v1`   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let raw = get("BACKEND_API_BASE").unwrap_or_else(|| "http://localhost:8000/api/v1".into());
        let backend_api_base = Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
            key: "BACKEND_API_BASE",
            value: raw.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            bind_addr: get("WEB_BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
            backend_api_base,
            health_timeout: Duration::from_secs(5),
            query_timeout: Duration::from_secs(45),
        })
    }
}
