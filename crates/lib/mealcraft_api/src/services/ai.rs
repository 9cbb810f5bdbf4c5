//! Query service: wraps the caller's text in a task prompt, calls the
//! completion provider once and classifies the reply.

use std::time::{Duration, Instant};

use mealcraft_core::classify::classify;
use mealcraft_core::completion::{CompletionError, CompletionProvider, CompletionRequest};
use mealcraft_core::models::completion::CompletionEnvelope;
use mealcraft_core::prompts::Task;
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult};

/// Per-call limits taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct CompletionLimits {
    pub max_tokens: u32,
    pub timeout: Duration,
}

/// Answer `query` for `task`, returning the timestamped envelope.
pub async fn answer(
    provider: &dyn CompletionProvider,
    limits: CompletionLimits,
    task: Task,
    query: &str,
) -> AppResult<CompletionEnvelope> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("Query must not be empty".into()));
    }

    let request = CompletionRequest {
        system_instruction: task.system_instruction().to_string(),
        user_text: query.to_string(),
        max_tokens: limits.max_tokens,
        timeout: limits.timeout,
    };

    let started = Instant::now();
    let reply = match provider.complete(&request).await {
        Ok(reply) => reply,
        Err(e) => {
            match &e {
                CompletionError::MissingCredential => {}
                CompletionError::Timeout(after) => {
                    warn!(task = task.name(), timeout = ?after, "completion timed out");
                }
                CompletionError::Upstream { kind, message } => {
                    error!(task = task.name(), kind, %message, "completion failed");
                }
            }
            return Err(AppError::from(e));
        }
    };
    let latency = started.elapsed();

    let kind = classify(&reply);
    info!(
        task = task.name(),
        kind = kind.as_str(),
        latency_ms = latency.as_millis() as u64,
        chars = reply.chars().count(),
        "completion answered"
    );
    Ok(CompletionEnvelope::new(kind, reply, latency))
}
