//! PostgreSQL-backed user store.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{StoreError, UserStore};
use crate::models::auth::User;

/// User store over the `users` table created by the embedded migrations.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for shutdown.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, (String, String)>(
            "SELECT email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(email, password_hash)| User {
            email,
            password_hash,
        }))
    }

    async fn insert(&self, user: User) -> Result<(), StoreError> {
        let result = sqlx::query("INSERT INTO users (email, password_hash) VALUES ($1, $2)")
            .bind(&user.email)
            .bind(&user.password_hash)
            .execute(&self.pool)
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Duplicate(user.email))
            }
            Err(e) => Err(StoreError::Db(e)),
        }
    }
}
