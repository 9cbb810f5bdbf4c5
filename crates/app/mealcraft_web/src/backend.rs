//! Client for the MealCraft backend API.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::warn;

use crate::config::WebConfig;

/// Which backend endpoint a query goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskChoice {
    #[default]
    Respond,
    BeveragePairings,
    DishPairings,
}

impl TaskChoice {
    pub const ALL: [TaskChoice; 3] = [
        TaskChoice::Respond,
        TaskChoice::BeveragePairings,
        TaskChoice::DishPairings,
    ];

    /// Path under the API base.
    pub fn path(self) -> &'static str {
        match self {
            TaskChoice::Respond => "respond",
            TaskChoice::BeveragePairings => "beverage-pairings",
            TaskChoice::DishPairings => "dish-pairings",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskChoice::Respond => "Meal ideas & recipes",
            TaskChoice::BeveragePairings => "Drinks for a dish",
            TaskChoice::DishPairings => "Dishes for a drink",
        }
    }
}

/// Envelope returned by the query endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub latency_seconds: f64,
    pub timestamp: String,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    #[error("Backend did not answer in time")]
    Timeout,

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected backend response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BackendError::Timeout
        } else if e.is_decode() {
            BackendError::Decode(e.to_string())
        } else {
            BackendError::Unreachable(e.to_string())
        }
    }
}

/// Backend API client sharing one connection pool.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    config: WebConfig,
}

impl BackendClient {
    pub fn new(config: WebConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.backend_api_base.as_str().trim_end_matches('/'),
            path
        )
    }

    /// Backend health as reported, or `{"status": "error", "detail": ...}`
    /// when it cannot be reached.
    pub async fn health(&self) -> Value {
        let result = async {
            self.client
                .get(self.url("health"))
                .timeout(self.config.health_timeout)
                .send()
                .await?
                .json::<Value>()
                .await
        }
        .await;
        match result {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "backend health check failed");
                json!({"status": "error", "detail": e.to_string()})
            }
        }
    }

    /// Forward a query to the endpoint for `task`.
    pub async fn ask(&self, task: TaskChoice, query: &str) -> Result<Answer, BackendError> {
        let resp = self
            .client
            .post(self.url(task.path()))
            .timeout(self.config.query_timeout)
            .json(&json!({ "query": query }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body: Value = resp.json().await.unwrap_or(Value::Null);
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Backend returned {status}"));
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json::<Answer>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_paths_match_backend_routes() {
        assert_eq!(TaskChoice::Respond.path(), "respond");
        assert_eq!(TaskChoice::BeveragePairings.path(), "beverage-pairings");
        assert_eq!(TaskChoice::DishPairings.path(), "dish-pairings");
    }

    #[test]
    fn task_choice_parses_form_values() {
        let t: TaskChoice = serde_json::from_str("\"dish-pairings\"").unwrap();
        assert_eq!(t, TaskChoice::DishPairings);
    }

    #[test]
    fn url_joins_without_double_slash() {
        let mut cfg = WebConfig::from_lookup(|_| None).unwrap();
        cfg.backend_api_base = url::Url::parse("http://backend:8000/api/v1/").unwrap();
        let client = BackendClient::new(cfg);
        assert_eq!(client.url("health"), "http://backend:8000/api/v1/health");
    }
}
