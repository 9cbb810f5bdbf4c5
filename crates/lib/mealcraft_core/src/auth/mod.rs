//! Authentication logic.
//!
//! Provides password hashing and JWT issuance/verification shared by the
//! HTTP layer.

pub mod jwt;
pub mod password;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
