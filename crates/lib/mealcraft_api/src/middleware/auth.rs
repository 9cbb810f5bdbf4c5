//! Authentication middleware: Bearer token extraction and JWT verification.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use mealcraft_core::models::auth::TokenClaims;
use tracing::debug;

use crate::AppState;
use crate::error::AppError;

/// Verified claims stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub TokenClaims);

/// Pull the token out of `Authorization: Bearer <token>`. The scheme is
/// matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Axum middleware: verifies the bearer token and injects
/// `AuthenticatedUser` into request extensions. Every failure is the same
/// `401`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(request.headers()) else {
        debug!("missing or malformed authorization header");
        return Err(AppError::Unauthorized);
    };

    let claims = state.tokens.verify(token).ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(AuthenticatedUser(claims));

    Ok(next.run(request).await)
}
