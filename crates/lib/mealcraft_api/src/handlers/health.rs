//! Liveness endpoints. Neither touches the store or the completion service.

use axum::Json;

use crate::models::{HealthResponse, WelcomeResponse};

/// `GET /api/v1/health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// `GET /`
pub async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to MealCraft AI Backend".to_string(),
    })
}
