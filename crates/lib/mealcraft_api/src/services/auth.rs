//! Authentication service: register, login and identity lookup
//! delegating to `mealcraft_core::auth` and the user store.

use mealcraft_core::auth::jwt::TokenIssuer;
use mealcraft_core::auth::password::{check_credentials, hash_password};
use mealcraft_core::models::auth::{TokenClaims, User};
use mealcraft_core::store::UserStore;
use tracing::{debug, info};

use crate::error::{ALREADY_REGISTERED_MESSAGE, AppError, AppResult};
use crate::models::{TokenResponse, UserResponse};

/// bcrypt only reads the first 72 bytes of its input.
const MAX_PASSWORD_BYTES: usize = 72;

/// Loose structural email check: one `@`, a non-empty local part and a
/// dotted domain, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

fn validate_registration(email: &str, password: &str) -> AppResult<()> {
    if !is_valid_email(email) {
        return Err(AppError::Validation("Invalid email address".into()));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::Validation(format!(
            "Password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    Ok(())
}

/// Register a new user. Returns the stored email, never the hash.
pub async fn register(
    users: &dyn UserStore,
    email: &str,
    password: &str,
) -> AppResult<UserResponse> {
    validate_registration(email, password)?;

    if users.find_by_email(email).await?.is_some() {
        debug!(email, "registration rejected: email taken");
        return Err(AppError::Validation(ALREADY_REGISTERED_MESSAGE.into()));
    }

    let password_hash = hash_password(password)?;

    // A concurrent registration can win between the lookup and here; the
    // store's uniqueness guard turns that into the same error.
    users
        .insert(User {
            email: email.to_string(),
            password_hash,
        })
        .await?;

    info!(email, "registered new user");
    Ok(UserResponse {
        email: email.to_string(),
    })
}

/// Authenticate with email + password and issue an access token.
pub async fn login(
    users: &dyn UserStore,
    tokens: &TokenIssuer,
    email: &str,
    password: &str,
) -> AppResult<TokenResponse> {
    let user = users.find_by_email(email).await?;

    // An unknown email still pays for a bcrypt verification.
    let stored_hash = user.as_ref().map(|u| u.password_hash.as_str());
    if let Err(e) = check_credentials(password, stored_hash) {
        debug!("login failed");
        return Err(e.into());
    }
    let Some(user) = user else {
        return Err(AppError::InvalidCredentials);
    };

    let access_token = tokens.issue(&user.email)?;
    info!(email = %user.email, "issued access token");
    Ok(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    })
}

/// Resolve verified token claims to the user's public profile.
pub async fn current_user(users: &dyn UserStore, claims: &TokenClaims) -> AppResult<UserResponse> {
    let user = users
        .find_by_email(&claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(UserResponse { email: user.email })
}
