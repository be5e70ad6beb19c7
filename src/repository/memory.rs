//! In-memory credential store for local runs and tests

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::{CredentialStore, HealthStatus, StoreError};
use crate::models::user::{Credential, Role};

#[derive(Default)]
struct Inner {
    by_username: HashMap<String, Credential>,
    next_id: i64,
}

/// Credentials kept in a process-local map. Ids are assigned from 1;
/// 0 stays reserved for the built-in admin identity.
#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Inner>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_username.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_credential(&self, username: &str) -> Result<Option<Credential>, StoreError> {
        Ok(self.inner.read().by_username.get(username).cloned())
    }

    async fn insert_credential(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<i64, StoreError> {
        let mut inner = self.inner.write();
        if inner.by_username.contains_key(username) {
            return Err(StoreError::DuplicateUsername(username.to_string()));
        }

        inner.next_id += 1;
        let user_id = inner.next_id;
        inner.by_username.insert(
            username.to_string(),
            Credential {
                user_id,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                role,
            },
        );

        Ok(user_id)
    }

    async fn health_check(&self) -> HealthStatus {
        HealthStatus::Healthy
    }
}
