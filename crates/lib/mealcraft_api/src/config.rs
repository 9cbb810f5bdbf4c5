//! API server configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use jsonwebtoken::Algorithm;
use mealcraft_core::auth::jwt::{
    DEFAULT_ACCESS_TOKEN_EXPIRY_MINUTES, jwt_secret_path, parse_algorithm, resolve_jwt_secret_with,
};
use mealcraft_core::completion::OpenAiConfig;
use mealcraft_core::completion::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use url::Url;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Origins allowed to call the API from a browser.
#[derive(Debug, Clone)]
pub enum CorsOrigins {
    Any,
    List(Vec<HeaderValue>),
}

/// Configuration for the API server.
#[derive(Clone)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "0.0.0.0:8000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// Database name overriding the one in the URL.
    pub database_name: Option<String>,
    /// Maximum number of pooled database connections.
    pub max_connections: u32,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// JWT signing algorithm (HMAC family).
    pub jwt_algorithm: Algorithm,
    /// Access token lifetime in minutes.
    pub access_token_expire_minutes: i64,
    /// Completion service connection.
    pub openai: OpenAiConfig,
    /// Token budget per completion.
    pub ai_max_tokens: u32,
    /// Deadline per completion call.
    pub ai_timeout: Duration,
    pub cors_origins: CorsOrigins,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_name", &self.database_name)
            .field("max_connections", &self.max_connections)
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field(
                "access_token_expire_minutes",
                &self.access_token_expire_minutes,
            )
            .field("openai", &self.openai)
            .field("ai_max_tokens", &self.ai_max_tokens)
            .field("ai_timeout", &self.ai_timeout)
            .field("cors_origins", &self.cors_origins)
            .finish_non_exhaustive()
    }
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                      | Default                              |
    /// |-------------------------------|--------------------------------------|
    /// | `BIND_ADDR`                   | `0.0.0.0:8000`                       |
    /// | `DATABASE_URL`                | `postgres://localhost:5432/mealcraft`|
    /// | `DATABASE_NAME`               | from the URL                         |
    /// | `DATABASE_MAX_CONNECTIONS`    | `5`                                  |
    /// | `JWT_SECRET_KEY` / `JWT_SECRET` | generated & persisted to file      |
    /// | `JWT_ALGORITHM`               | `HS256`                              |
    /// | `ACCESS_TOKEN_EXPIRE_MINUTES` | `60`                                 |
    /// | `OPENAI_API_KEY`              | unset (query endpoints fail)         |
    /// | `OPENAI_BASE_URL`             | `https://api.openai.com/v1`          |
    /// | `AI_MODEL`                    | `gpt-3.5-turbo`                      |
    /// | `AI_MAX_TOKENS`               | `800`                                |
    /// | `AI_TIMEOUT_SECS`             | `30`                                 |
    /// | `CORS_ALLOWED_ORIGINS`        | `*` (comma-separated list)           |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_algorithm = match get("JWT_ALGORITHM") {
            Some(name) => parse_algorithm(&name).map_err(|e| ConfigError::Invalid {
                key: "JWT_ALGORITHM",
                value: name.clone(),
                reason: e.to_string(),
            })?,
            None => Algorithm::HS256,
        };

        let access_token_expire_minutes: i64 = parse_or(
            &get,
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            DEFAULT_ACCESS_TOKEN_EXPIRY_MINUTES,
        )?;
        if access_token_expire_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "ACCESS_TOKEN_EXPIRE_MINUTES",
                value: access_token_expire_minutes.to_string(),
                reason: "must be positive".into(),
            });
        }

        let base_url_raw = get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let base_url = Url::parse(&base_url_raw).map_err(|e| ConfigError::Invalid {
            key: "OPENAI_BASE_URL",
            value: base_url_raw.clone(),
            reason: e.to_string(),
        })?;

        let ai_timeout_secs: u64 = parse_or(&get, "AI_TIMEOUT_SECS", 30)?;

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8000".into()),
            pg_connection_url: get("DATABASE_URL")
                .unwrap_or_else(|| "postgres://localhost:5432/mealcraft".into()),
            database_name: get("DATABASE_NAME"),
            max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 5)?,
            jwt_secret: resolve_jwt_secret_with(&lookup, jwt_secret_path()),
            jwt_algorithm,
            access_token_expire_minutes,
            openai: OpenAiConfig {
                api_key: get("OPENAI_API_KEY"),
                base_url,
                model: get("AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            },
            ai_max_tokens: parse_or(&get, "AI_MAX_TOKENS", 800)?,
            ai_timeout: Duration::from_secs(ai_timeout_secs),
            cors_origins: parse_cors_origins(get("CORS_ALLOWED_ORIGINS").as_deref())?,
        })
    }

    /// CORS policy for the configured origins. A wildcard never allows
    /// credentials.
    pub fn cors_layer(&self) -> CorsLayer {
        match &self.cors_origins {
            CorsOrigins::Any => CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
            CorsOrigins::List(origins) => CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins.iter().cloned()))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true),
        }
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_cors_origins(raw: Option<&str>) -> Result<CorsOrigins, ConfigError> {
    let Some(raw) = raw else {
        return Ok(CorsOrigins::Any);
    };
    let entries: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if entries.is_empty() || entries.contains(&"*") {
        return Ok(CorsOrigins::Any);
    }
    entries
        .into_iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| ConfigError::Invalid {
                key: "CORS_ALLOWED_ORIGINS",
                value: origin.to_string(),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(CorsOrigins::List)
}
