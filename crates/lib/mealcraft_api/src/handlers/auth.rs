//! Authentication request handlers.

use axum::extract::State;
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::http::StatusCode;
use axum::{Extension, Form, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{LoginForm, RegisterRequest, TokenResponse, UserResponse};
use crate::services::auth;

/// `POST /api/v1/auth/register`: create a new user account.
pub async fn register_handler(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let Json(body) = payload?;
    let resp = auth::register(state.users.as_ref(), &body.email, &body.password).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// `POST /api/v1/auth/login`: form-encoded `username` + `password`.
pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Form<LoginForm>, FormRejection>,
) -> AppResult<Json<TokenResponse>> {
    let Form(form) = payload?;
    let resp = auth::login(
        state.users.as_ref(),
        &state.tokens,
        &form.username,
        &form.password,
    )
    .await?;
    Ok(Json(resp))
}

/// `GET /api/v1/auth/users/me`: profile of the bearer token's subject.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<UserResponse>> {
    let resp = auth::current_user(state.users.as_ref(), &user.0).await?;
    Ok(Json(resp))
}
