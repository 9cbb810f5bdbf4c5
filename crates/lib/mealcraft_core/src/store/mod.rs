//! User credential storage.
//!
//! [`UserStore`] is the seam between the auth flows and whatever keeps user
//! records durable. Uniqueness of the email key is the store's job: an
//! insert that collides with an existing record fails with
//! [`StoreError::Duplicate`] rather than overwriting it.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::auth::User;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("User already exists: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Email-keyed user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch the user with exactly this email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new user; fails with [`StoreError::Duplicate`] if the email is taken.
    async fn insert(&self, user: User) -> Result<(), StoreError>;
}
