//! # mealcraft_api
//!
//! HTTP API library for MealCraft.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use chrono::Duration;
use mealcraft_core::auth::AuthError;
use mealcraft_core::auth::jwt::TokenIssuer;
use mealcraft_core::completion::CompletionProvider;
use mealcraft_core::store::UserStore;
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{ai, auth, health};
use crate::services::ai::CompletionLimits;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: ApiConfig,
    /// User credential store.
    pub users: Arc<dyn UserStore>,
    /// Completion service client.
    pub completions: Arc<dyn CompletionProvider>,
    /// Access token issuer/verifier.
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    /// Build state from configuration and injected collaborators.
    pub fn new(
        config: ApiConfig,
        users: Arc<dyn UserStore>,
        completions: Arc<dyn CompletionProvider>,
    ) -> Result<Self, AuthError> {
        let tokens = TokenIssuer::new(
            config.jwt_secret.as_bytes(),
            config.jwt_algorithm,
            Duration::minutes(config.access_token_expire_minutes),
        )?;
        Ok(Self {
            config,
            users,
            completions,
            tokens: Arc::new(tokens),
        })
    }

    pub fn completion_limits(&self) -> CompletionLimits {
        CompletionLimits {
            max_tokens: self.config.ai_max_tokens,
            timeout: self.config.ai_timeout,
        }
    }
}

/// Run embedded database migrations.
///
/// Delegates to `mealcraft_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    mealcraft_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = state.config.cors_layer();

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::GET_ROOT, get(health::root))
        .route(routes::GET_HEALTH, get(health::health))
        .route(routes::POST_AUTH_REGISTER, post(auth::register_handler))
        .route(routes::POST_AUTH_LOGIN, post(auth::login_handler))
        .route(routes::POST_RESPOND, post(ai::respond_handler))
        .route(
            routes::POST_BEVERAGE_PAIRINGS,
            post(ai::beverage_pairings_handler),
        )
        .route(routes::POST_DISH_PAIRINGS, post(ai::dish_pairings_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route(routes::GET_AUTH_USERS_ME, get(auth::me_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
