//! Authentication domain models.
//!
//! These are internal domain models, distinct from the API request and
//! response bodies in `mealcraft_api`.

use serde::{Deserialize, Serialize};

/// Stored user record.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    /// Unique key, compared exactly as supplied.
    pub email: String,
    /// bcrypt hash of the password.
    pub password_hash: String,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// JWT claims embedded in access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user's email.
    pub sub: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}
