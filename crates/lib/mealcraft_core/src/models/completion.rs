//! Completion request and response envelope.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::ResponseKind;

/// A single prompt sent to the completion service.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Instruction sent in the `system` role.
    pub system_instruction: String,
    /// The caller's query, sent in the `user` role.
    pub user_text: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Deadline for the whole call.
    pub timeout: Duration,
}

/// JSON envelope returned by the query endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionEnvelope {
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    pub content: String,
    pub latency_seconds: f64,
    pub timestamp: DateTime<Utc>,
}

impl CompletionEnvelope {
    /// Wrap a reply, rounding latency to hundredths of a second.
    pub fn new(kind: ResponseKind, content: String, latency: Duration) -> Self {
        Self {
            kind,
            content,
            latency_seconds: round_latency(latency),
            timestamp: Utc::now(),
        }
    }
}

fn round_latency(latency: Duration) -> f64 {
    (latency.as_secs_f64() * 100.0).round() / 100.0
}
