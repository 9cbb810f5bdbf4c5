//! Query endpoints. Each selects a task prompt and returns the envelope.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use mealcraft_core::prompts::Task;

use crate::AppState;
use crate::error::AppResult;
use crate::models::{CompletionEnvelope, QueryRequest};
use crate::services::ai;

async fn run(
    state: &AppState,
    task: Task,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> AppResult<Json<CompletionEnvelope>> {
    let Json(body) = payload?;
    let envelope = ai::answer(
        state.completions.as_ref(),
        state.completion_limits(),
        task,
        &body.query,
    )
    .await?;
    Ok(Json(envelope))
}

/// `POST /api/v1/respond`: nutrition and recipe questions.
pub async fn respond_handler(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> AppResult<Json<CompletionEnvelope>> {
    run(&state, Task::Nutrition, payload).await
}

/// `POST /api/v1/beverage-pairings`: drinks for a dish.
pub async fn beverage_pairings_handler(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> AppResult<Json<CompletionEnvelope>> {
    run(&state, Task::BeveragePairing, payload).await
}

/// `POST /api/v1/dish-pairings`: dishes for a drink.
pub async fn dish_pairings_handler(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> AppResult<Json<CompletionEnvelope>> {
    run(&state, Task::DishPairing, payload).await
}
