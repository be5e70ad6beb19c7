//! Credential repository backed by PostgreSQL

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

use super::{CredentialStore, HealthStatus, StoreError};
use crate::{
    config::DatabaseConfig,
    models::user::{Credential, CredentialRow, Role},
};

pub struct PgCredentialStore {
    db: PgPool,
}

impl PgCredentialStore {
    /// 连接凭据库并应用 `users` 表迁移
    ///
    /// 连接或迁移失败都视为存储不可用，服务不会在没有凭据表的情况下启动。
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .test_before_acquire(true)
            .connect(config.url.expose_secret())
            .await
            .map_err(unavailable)?;

        sqlx::migrate!("./migrations").run(&db).await.map_err(|e| {
            tracing::error!(error = %e, "Credential schema migration failed");
            StoreError::Unavailable(format!("migration failed: {}", e))
        })?;

        tracing::info!(
            max_connections = config.max_connections,
            "Credential store ready"
        );

        Ok(Self { db })
    }

    fn record_pool_metrics(&self) {
        metrics::gauge!("credential_store_connections").set(self.db.size() as f64);
        metrics::gauge!("credential_store_connections_idle").set(self.db.num_idle() as f64);
    }
}

fn unavailable(e: sqlx::Error) -> StoreError {
    tracing::error!(error = %e, "Credential store query failed");
    StoreError::Unavailable(e.to_string())
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    /// 根据用户名查找凭据
    async fn find_credential(&self, username: &str) -> Result<Option<Credential>, StoreError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT user_id, username, password_hash, role, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await
        .map_err(unavailable)?;

        row.map(|row| {
            let user_id = row.user_id;
            Credential::try_from(row).map_err(|e| {
                tracing::error!(user_id, error = %e, "Credential row has an unrecognized role");
                StoreError::Corrupt(e.to_string())
            })
        })
        .transpose()
    }

    /// 创建凭据，依赖 username 唯一约束拒绝重复用户名
    async fn insert_credential(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<i64, StoreError> {
        let result: Result<i64, sqlx::Error> = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING user_id
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(user_id) => Ok(user_id),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::DuplicateUsername(username.to_string()))
            }
            Err(e) => Err(unavailable(e)),
        }
    }

    /// 探测 users 表本身，而不只是连接
    async fn health_check(&self) -> HealthStatus {
        self.record_pool_metrics();

        match sqlx::query("SELECT 1 FROM users LIMIT 1")
            .fetch_optional(&self.db)
            .await
        {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => {
                tracing::warn!(error = %e, "Credential store health check failed");
                HealthStatus::Unhealthy(e.to_string())
            }
        }
    }
}
