//! In-memory user store for tests and database-less development.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{StoreError, UserStore};
use crate::models::auth::User;

/// Concurrent map keyed by email. Insert-if-absent is atomic per key.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: DashMap<String, User>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(email).map(|u| u.value().clone()))
    }

    async fn insert(&self, user: User) -> Result<(), StoreError> {
        match self.users.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(user.email)),
            Entry::Vacant(slot) => {
                slot.insert(user);
                Ok(())
            }
        }
    }
}
