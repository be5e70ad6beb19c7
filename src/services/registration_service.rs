//! 注册服务：校验密码策略并创建凭据

use crate::{
    auth::password::PasswordHasher,
    config::SecurityConfig,
    error::RegistrationFailure,
    models::auth::RegisterRequest,
    repository::{CredentialStore, StoreError},
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use validator::Validate;

pub struct RegistrationService {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<PasswordHasher>,
    config: Arc<SecurityConfig>,
}

impl RegistrationService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<PasswordHasher>,
        config: Arc<SecurityConfig>,
    ) -> Self {
        Self {
            store,
            hasher,
            config,
        }
    }

    /// 注册新用户，返回存储分配的 user_id
    ///
    /// 所有校验都在写入之前完成；校验失败时不会创建任何凭据。
    pub async fn register(&self, req: RegisterRequest) -> Result<i64, RegistrationFailure> {
        let outcome = self.try_register(&req).await;

        match &outcome {
            Ok(user_id) => {
                tracing::info!(
                    username = %req.username,
                    user_id,
                    role = ?req.role,
                    "User registered"
                );
                record_register("success");
            }
            Err(failure) => {
                tracing::warn!(username = %req.username, reason = %failure, "Registration rejected");
                record_register(outcome_label(failure));
            }
        }

        outcome
    }

    async fn try_register(&self, req: &RegisterRequest) -> Result<i64, RegistrationFailure> {
        validate_username(req)?;

        PasswordHasher::validate_password_policy(
            req.password.expose_secret(),
            req.confirm_password.expose_secret(),
            self.config.password_min_length,
        )?;

        let hasher = self.hasher.clone();
        let password = req.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(password.expose_secret()))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing task failed");
                RegistrationFailure::HashingFailed
            })?
            .map_err(|_| RegistrationFailure::HashingFailed)?;

        self.store
            .insert_credential(&req.username, &password_hash, req.role.into())
            .await
            .map_err(|e| match e {
                StoreError::DuplicateUsername(_) => RegistrationFailure::DuplicateUsername,
                StoreError::Unavailable(_) | StoreError::Corrupt(_) => {
                    tracing::error!(error = %e, "Credential insert failed");
                    RegistrationFailure::StoreUnavailable
                }
            })
    }
}

/// 用户名：1-64 个字符，不含空白或控制字符
fn validate_username(req: &RegisterRequest) -> Result<(), RegistrationFailure> {
    req.validate()
        .map_err(|_| RegistrationFailure::InvalidUsername("Username must be 1 to 64 characters".to_string()))?;

    if req
        .username
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(RegistrationFailure::InvalidUsername(
            "Username must not contain spaces or control characters".to_string(),
        ));
    }

    Ok(())
}

fn outcome_label(failure: &RegistrationFailure) -> &'static str {
    match failure {
        RegistrationFailure::Mismatch => "mismatch",
        RegistrationFailure::TooShort { .. } => "too_short",
        RegistrationFailure::DuplicateUsername => "duplicate_username",
        RegistrationFailure::InvalidUsername(_) => "invalid_username",
        RegistrationFailure::StoreUnavailable => "store_unavailable",
        RegistrationFailure::HashingFailed => "hashing_failed",
    }
}

fn record_register(outcome: &'static str) {
    metrics::counter!("auth_register_total", "outcome" => outcome).increment(1);
}
