//! 测试公共模块
//! 提供测试辅助函数和测试工具

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use hms_auth::{
    auth::PasswordHasher,
    config::SecurityConfig,
    middleware::AppState,
    models::user::{Credential, Role},
    repository::{CredentialStore, HealthStatus, MemoryCredentialStore, StoreError},
    routes,
};
use http_body_util::BodyExt;
use std::sync::Arc;

/// 测试用安全配置：低成本 Argon2 参数，内置管理员关闭
pub fn test_security_config() -> SecurityConfig {
    SecurityConfig {
        password_min_length: 8,
        admin_bypass_enabled: false,
        session_ttl_secs: 3600,
        argon2_memory_kib: 1024,
        argon2_iterations: 1,
        argon2_parallelism: 1,
    }
}

/// 启用内置 Admin/Admin 的测试配置
pub fn test_security_config_with_bypass() -> SecurityConfig {
    SecurityConfig {
        admin_bypass_enabled: true,
        ..test_security_config()
    }
}

pub fn test_hasher() -> PasswordHasher {
    PasswordHasher::from_config(&test_security_config()).expect("valid test params")
}

/// 使用内存凭据存储构建应用状态
pub fn create_test_app_state(
    store: Arc<MemoryCredentialStore>,
    security: SecurityConfig,
) -> Arc<AppState> {
    Arc::new(AppState::new(store, security).expect("Failed to build app state"))
}

pub fn create_test_app(store: Arc<MemoryCredentialStore>, security: SecurityConfig) -> Router {
    routes::create_router(create_test_app_state(store, security))
}

/// 直接写入一条凭据，返回 user_id
pub async fn create_test_user(
    store: &MemoryCredentialStore,
    username: &str,
    password: &str,
    role: Role,
) -> i64 {
    let hash = test_hasher().hash(password).expect("Failed to hash password");
    store
        .insert_credential(username, &hash, role)
        .await
        .expect("Failed to create test user")
}

/// 始终不可用的凭据存储
pub struct FailingStore;

#[async_trait]
impl CredentialStore for FailingStore {
    async fn find_credential(&self, _username: &str) -> Result<Option<Credential>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn insert_credential(
        &self,
        _username: &str,
        _password_hash: &str,
        _role: Role,
    ) -> Result<i64, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn health_check(&self) -> HealthStatus {
        HealthStatus::Unhealthy("connection refused".to_string())
    }
}

/// 存有角色值损坏记录的凭据存储
pub struct CorruptRoleStore;

#[async_trait]
impl CredentialStore for CorruptRoleStore {
    async fn find_credential(&self, username: &str) -> Result<Option<Credential>, StoreError> {
        Err(StoreError::Corrupt(format!(
            "unknown role 'superuser' for {}",
            username
        )))
    }

    async fn insert_credential(
        &self,
        _username: &str,
        _password_hash: &str,
        _role: Role,
    ) -> Result<i64, StoreError> {
        Ok(1)
    }

    async fn health_check(&self) -> HealthStatus {
        HealthStatus::Healthy
    }
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
