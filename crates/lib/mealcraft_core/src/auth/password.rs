//! Password hashing via bcrypt.

use std::sync::LazyLock;

use super::AuthError;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Stand-in hash verified when no account exists, so an unknown email
/// costs the same bcrypt rounds as a wrong password.
static DUMMY_HASH: LazyLock<Result<String, bcrypt::BcryptError>> =
    LazyLock::new(|| bcrypt::hash("mealcraft/no-such-account", BCRYPT_COST));

fn bcrypt_error(op: &str, e: bcrypt::BcryptError) -> AuthError {
    AuthError::Internal(format!("bcrypt {op}: {e}"))
}

/// Hash a password with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST).map_err(|e| bcrypt_error("hash", e))
}

/// `Ok(false)` on mismatch. A stored hash bcrypt cannot parse is an
/// error, not a mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| bcrypt_error("verify", e))
}

/// Check a login attempt against the stored hash, if any.
///
/// Both an absent account and a wrong password yield
/// [`AuthError::CredentialError`] after one full bcrypt verification.
pub fn check_credentials(password: &str, stored_hash: Option<&str>) -> Result<(), AuthError> {
    let matched = match stored_hash {
        Some(hash) => verify_password(password, hash)?,
        None => {
            let dummy = DUMMY_HASH
                .as_deref()
                .map_err(|e| AuthError::Internal(format!("bcrypt dummy hash: {e}")))?;
            verify_password(password, dummy)?;
            false
        }
    };
    if matched {
        Ok(())
    } else {
        Err(AuthError::CredentialError)
    }
}
