//! JWT token issuance and verification.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::{debug, info, warn};

use super::AuthError;
use crate::models::auth::TokenClaims;

/// Access token lifetime used when none is configured: 60 minutes.
pub const DEFAULT_ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 60;

/// Parse a signing algorithm name. Only the HMAC family is accepted since
/// the signing key is a shared secret.
pub fn parse_algorithm(name: &str) -> Result<Algorithm, AuthError> {
    let alg = Algorithm::from_str(name.trim())
        .map_err(|_| AuthError::UnsupportedAlgorithm(name.to_string()))?;
    match alg {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(alg),
        _ => Err(AuthError::UnsupportedAlgorithm(name.to_string())),
    }
}

/// Issues and verifies signed access tokens.
///
/// Holds the process-wide signing secret; built once at startup.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Create an issuer for an HMAC `algorithm` with a default token lifetime.
    pub fn new(secret: &[u8], algorithm: Algorithm, ttl: Duration) -> Result<Self, AuthError> {
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(AuthError::UnsupportedAlgorithm(format!("{algorithm:?}")));
        }
        if secret.is_empty() {
            return Err(AuthError::Internal("empty signing secret".into()));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            algorithm,
            ttl,
        })
    }

    /// Default token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signing algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Issue a token for `subject` with the default lifetime.
    pub fn issue(&self, subject: &str) -> Result<String, AuthError> {
        self.issue_at(subject, self.ttl, Utc::now())
    }

    /// Issue a token for `subject` valid for `ttl` starting at `now`.
    pub fn issue_at(
        &self,
        subject: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = TokenClaims {
            sub: subject.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenError(format!("jwt encode: {e}")))
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Option<TokenClaims> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token's signature and claims, treating it as expired once
    /// `now` reaches `exp`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Option<TokenClaims> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked below against the supplied clock, without leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = match decode::<TokenClaims>(token, &self.decoding, &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                debug!(error = %e, "token rejected");
                return None;
            }
        };
        if claims.exp <= now.timestamp() {
            debug!(sub = %claims.sub, "token expired");
            return None;
        }
        if claims.sub.is_empty() {
            return None;
        }
        Some(claims)
    }
}

/// Resolve the JWT secret: `JWT_SECRET_KEY` → `JWT_SECRET` → persisted file.
pub fn resolve_jwt_secret() -> String {
    resolve_jwt_secret_with(|key| std::env::var(key).ok(), jwt_secret_path())
}

/// Secret resolution over an arbitrary variable lookup and secret file.
pub fn resolve_jwt_secret_with<F>(lookup: F, secret_path: PathBuf) -> String
where
    F: Fn(&str) -> Option<String>,
{
    for key in ["JWT_SECRET_KEY", "JWT_SECRET"] {
        if let Some(secret) = lookup(key)
            && !secret.is_empty()
        {
            return secret;
        }
    }
    if let Ok(existing) = std::fs::read_to_string(&secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    if let Some(parent) = secret_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match std::fs::write(&secret_path, &secret) {
        Ok(()) => info!(path = %secret_path.display(), "generated new JWT secret"),
        Err(e) => warn!(path = %secret_path.display(), error = %e, "could not persist JWT secret"),
    }
    secret
}

/// Path to the persisted JWT secret file.
pub fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mealcraft")
        .join("jwt-secret")
}
