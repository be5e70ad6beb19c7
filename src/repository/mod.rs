//! Credential store layer (数据库访问层)

pub mod credential_repo;
pub mod memory;

pub use credential_repo::PgCredentialStore;
pub use memory::MemoryCredentialStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::user::{Credential, Role};

/// Credential store failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("username already exists: {0}")]
    DuplicateUsername(String),

    #[error("credential store unavailable: {0}")]
    Unavailable(String),

    /// Stored row cannot be trusted (e.g. an unknown role value)
    #[error("corrupt credential record: {0}")]
    Corrupt(String),
}

/// Credential store health as reported by `/ready`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// Lookup and insert of login credentials, keyed by username.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_credential(&self, username: &str) -> Result<Option<Credential>, StoreError>;

    /// Returns the store-assigned user id.
    async fn insert_credential(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<i64, StoreError>;

    async fn health_check(&self) -> HealthStatus;
}
