//! Application error types.
//!
//! Callers only ever see the coarse category and a fixed message; the
//! underlying detail goes to the operator log.

use axum::{
    Json,
    extract::rejection::{FormRejection, JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use mealcraft_core::auth::AuthError;
use mealcraft_core::completion::CompletionError;
use mealcraft_core::store::StoreError;
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

pub const INVALID_LOGIN_MESSAGE: &str = "Incorrect email or password";
pub const INVALID_TOKEN_MESSAGE: &str = "Could not validate credentials";
pub const ALREADY_REGISTERED_MESSAGE: &str = "Email already registered";

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown user or wrong password; the two are not distinguished.
    #[error("Invalid login")]
    InvalidCredentials,

    /// Missing, invalid or expired bearer token, or its user is gone.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Service misconfigured: {0}")]
    Misconfigured(String),

    #[error("Upstream timed out")]
    GatewayTimeout,

    #[error("Generation failed: {0}")]
    Generation(&'static str),

    #[error("Database unavailable: {0}")]
    DbUnavailable(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.clone()),
            AppError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                "invalid_credentials",
                INVALID_LOGIN_MESSAGE.to_string(),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                INVALID_TOKEN_MESSAGE.to_string(),
            ),
            AppError::Misconfigured(detail) => {
                error!(%detail, "service misconfigured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "service_misconfigured",
                    "Service misconfigured".to_string(),
                )
            }
            AppError::GatewayTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "gateway_timeout",
                "AI request timed out".to_string(),
            ),
            AppError::Generation(kind) => (
                StatusCode::BAD_GATEWAY,
                "generation_failed",
                format!("AI generation failed ({kind})"),
            ),
            AppError::DbUnavailable(detail) => {
                error!(%detail, "database unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "db_unavailable",
                    "Database unavailable".to_string(),
                )
            }
            AppError::Internal(detail) => {
                error!(%detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
        });
        let mut response = (status, body).into_response();
        if matches!(self, AppError::Unauthorized) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

// Malformed bodies get the same envelope as every other failure.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::DbUnavailable(e.to_string())
            }
            _ => AppError::Internal(e.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(_) => AppError::Validation(ALREADY_REGISTERED_MESSAGE.into()),
            StoreError::Db(e) => AppError::from(e),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::CredentialError => AppError::InvalidCredentials,
            AuthError::TokenError(msg) => AppError::Internal(msg),
            AuthError::UnsupportedAlgorithm(alg) => {
                AppError::Misconfigured(format!("unsupported JWT algorithm {alg}"))
            }
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<CompletionError> for AppError {
    fn from(e: CompletionError) -> Self {
        match e {
            CompletionError::MissingCredential => {
                AppError::Misconfigured("completion API key not configured".into())
            }
            CompletionError::Timeout(_) => AppError::GatewayTimeout,
            CompletionError::Upstream { kind, .. } => AppError::Generation(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unauthorized_carries_bearer_challenge() {
        let resp = AppError::Unauthorized.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
        let json = body_json(resp).await;
        assert_eq!(json["message"], INVALID_TOKEN_MESSAGE);
    }

    #[tokio::test]
    async fn internal_detail_is_not_exposed() {
        let resp = AppError::Internal("connection string postgres://secret".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["message"], "Internal server error");
    }

    #[tokio::test]
    async fn generation_failure_exposes_only_kind() {
        let err = AppError::from(CompletionError::Upstream {
            kind: "UpstreamStatus",
            message: "500 stack trace with secrets".into(),
        });
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "generation_failed");
        let message = json["message"].as_str().unwrap();
        assert!(message.contains("UpstreamStatus"));
        assert!(!message.contains("secrets"));
    }

    #[test]
    fn completion_errors_map_to_categories() {
        assert!(matches!(
            AppError::from(CompletionError::MissingCredential),
            AppError::Misconfigured(_)
        ));
        assert!(matches!(
            AppError::from(CompletionError::Timeout(std::time::Duration::from_secs(30))),
            AppError::GatewayTimeout
        ));
    }

    #[tokio::test]
    async fn json_rejection_uses_error_envelope() {
        #[derive(Debug, serde::Deserialize)]
        struct NeedsQuery {
            #[allow(dead_code)]
            query: String,
        }
        let rejection = Json::<NeedsQuery>::from_bytes(b"{}").unwrap_err();
        let resp = AppError::from(rejection).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "validation_error");
        assert!(json["message"].as_str().unwrap().contains("query"));
    }

    #[test]
    fn duplicate_maps_to_already_registered() {
        match AppError::from(StoreError::Duplicate("a@b.co".into())) {
            AppError::Validation(m) => assert_eq!(m, ALREADY_REGISTERED_MESSAGE),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
