//! User record lookup used by the auth gate.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use super::{AuthError, queries};
use crate::models::auth::{Role, UserRecord};

/// Read access to user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, AuthError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError>;
}

#[async_trait]
impl UserStore for PgPool {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, AuthError> {
        queries::find_user_by_id(self, id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        queries::find_user_by_email(self, email).await
    }
}

/// In-process user store, for tests and database-less runs of the auth layer.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<i64, UserRecord>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user with an already hashed password. Returns the new ID.
    pub fn insert(&self, email: &str, username: &str, password_hash: &str, role: Role) -> i64 {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        let id = users.keys().max().copied().unwrap_or(0) + 1;
        users.insert(
            id,
            UserRecord {
                id,
                email: email.to_string(),
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                role,
                created_at: Utc::now(),
            },
        );
        id
    }

    /// Remove a user. Returns whether it existed.
    pub fn remove(&self, id: i64) -> bool {
        self.users
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id)
            .is_some()
    }

    /// Change a stored role.
    pub fn set_role(&self, id: i64, role: Role) {
        if let Some(user) = self
            .users
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(&id)
        {
            user.role = role;
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, AuthError> {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        Ok(users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        Ok(users.values().find(|u| u.email == email).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_lookups() {
        let store = MemoryUserStore::new();
        let a = store.insert("a@example.com", "alice", "h", Role::Admin);
        let b = store.insert("b@example.com", "bob", "h", Role::User);
        assert_ne!(a, b);

        let found = store.find_by_email("b@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, b);
        assert_eq!(found.username, "bob");
        assert!(store.find_by_email("c@example.com").await.unwrap().is_none());

        assert!(store.remove(a));
        assert!(store.find_by_id(a).await.unwrap().is_none());
    }
}
