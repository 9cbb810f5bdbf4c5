//! # mealcraft_web
//!
//! Browser frontend for MealCraft. Renders a query form, forwards
//! submissions to the backend API and shows the answer.

pub mod backend;
pub mod config;
pub mod render;
pub mod shutdown;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::backend::{BackendClient, TaskChoice};
use crate::config::WebConfig;
use crate::render::{PageView, Pages};

/// Shared frontend state.
#[derive(Debug, Clone)]
pub struct WebState {
    pub backend: BackendClient,
    pub pages: Arc<Pages>,
}

impl WebState {
    /// Fails only if the page template does not compile.
    pub fn new(config: WebConfig) -> Result<Self, tera::Error> {
        Ok(Self {
            backend: BackendClient::new(config),
            pages: Arc::new(Pages::new()?),
        })
    }

    fn render(&self, view: &PageView<'_>) -> Response {
        match self.pages.page(view) {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                error!(error = ?e, "failed to render page");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
            }
        }
    }
}

/// `POST /ask` form.
#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub task: TaskChoice,
    pub query: String,
}

/// `GET /`: form plus backend health.
async fn index(State(state): State<WebState>) -> Response {
    let health = state.backend.health().await;
    state.render(&PageView {
        backend_health: Some(&health),
        ..Default::default()
    })
}

/// `POST /ask`: forward the query and render the result or the error.
async fn ask(State(state): State<WebState>, Form(form): Form<AskForm>) -> Response {
    let query = form.query.trim();
    if query.is_empty() {
        return state.render(&PageView {
            task: form.task,
            error: Some("Please enter a question."),
            ..Default::default()
        });
    }

    match state.backend.ask(form.task, query).await {
        Ok(answer) => {
            info!(task = form.task.path(), kind = %answer.kind, "rendered answer");
            state.render(&PageView {
                task: form.task,
                query,
                answer: Some(&answer),
                ..Default::default()
            })
        }
        Err(e) => {
            warn!(task = form.task.path(), error = %e, "backend query failed");
            let message = e.to_string();
            state.render(&PageView {
                task: form.task,
                query,
                error: Some(&message),
                ..Default::default()
            })
        }
    }
}

/// `GET /health`: frontend liveness only.
async fn health() -> Json<Value> {
    Json(json!({"frontend_status": "ok"}))
}

/// Builds the frontend router.
pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ask", post(ask))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
