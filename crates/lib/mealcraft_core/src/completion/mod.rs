//! Completion client: sends role-tagged prompts to an external
//! text-generation service.
//!
//! One attempt per call; the caller sees every failure.

pub mod openai;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use crate::models::completion::CompletionRequest;
pub use openai::{OpenAiClient, OpenAiConfig};

/// Errors from the completion service.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Completion service credential is not configured")]
    MissingCredential,

    #[error("Completion request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Completion failed: {kind}: {message}")]
    Upstream {
        /// Short error class, safe to show callers.
        kind: &'static str,
        /// Full diagnostic detail, for logs.
        message: String,
    },
}

impl CompletionError {
    pub(crate) fn upstream(kind: &'static str, message: impl Into<String>) -> Self {
        CompletionError::Upstream {
            kind,
            message: message.into(),
        }
    }
}

/// Something that can answer a [`CompletionRequest`] with reply text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}
