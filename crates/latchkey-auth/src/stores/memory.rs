//! In-memory user store for development and tests

use crate::{AuthResult, StoredUser, UserStore};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// User records keyed by exact email
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, StoredUser>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `users`
    pub fn with_users(users: impl IntoIterator<Item = StoredUser>) -> Self {
        Self {
            users: RwLock::new(
                users
                    .into_iter()
                    .map(|user| (user.email.clone(), user))
                    .collect(),
            ),
        }
    }

    /// Insert or replace the user with the same email
    pub async fn insert(&self, user: StoredUser) {
        self.users.write().await.insert(user.email.clone(), user);
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<StoredUser>> {
        Ok(self.users.read().await.get(email).cloned())
    }

    fn store_name(&self) -> &str {
        "memory"
    }
}
