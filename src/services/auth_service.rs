//! 认证服务：校验用户名与密码，返回身份

use crate::{
    auth::{password::PasswordHasher, session::Identity},
    config::SecurityConfig,
    error::AuthFailure,
    models::auth::LoginRequest,
    repository::CredentialStore,
};
use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;

/// 内置管理员凭据（仅在 security.admin_bypass_enabled 时生效）
pub const ADMIN_BYPASS_USERNAME: &str = "Admin";
pub const ADMIN_BYPASS_PASSWORD: &str = "Admin";

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<PasswordHasher>,
    config: Arc<SecurityConfig>,
}

impl AuthService {
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

    /// 用户登录
    pub async fn login(&self, req: LoginRequest) -> Result<Identity, AuthFailure> {
        self.authenticate(&req.username, req.password.expose_secret())
            .await
    }

    /// 校验凭据
    ///
    /// 只读取凭据存储，不做任何写入。
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Identity, AuthFailure> {
        // 内置管理员优先于任何存储访问
        if self.is_admin_bypass(username, password) {
            tracing::warn!(%username, "Built-in admin credential accepted");
            record_login("bypass");
            return Ok(Identity::admin_bypass());
        }

        let credential = match self.store.find_credential(username).await {
            Ok(credential) => credential,
            Err(e) => {
                tracing::error!(%username, error = %e, "Credential lookup failed");
                record_login("store_unavailable");
                return Err(AuthFailure::StoreUnavailable);
            }
        };

        // 哈希计算是 CPU 密集型操作，放到阻塞线程池
        let hasher = self.hasher.clone();
        let password = Secret::new(password.to_owned());
        let verified = tokio::task::spawn_blocking(move || match credential {
            Some(credential) => {
                let matched = hasher.verify(password.expose_secret(), &credential.password_hash);
                if matched && hasher.needs_rehash(&credential.password_hash) {
                    tracing::info!(
                        user_id = credential.user_id,
                        "Stored password hash uses outdated parameters"
                    );
                }
                matched.then(|| Identity::new(credential.role, credential.user_id))
            }
            None => {
                // 未知用户也消耗一次哈希，避免通过耗时区分
                hasher.verify_dummy(password.expose_secret());
                None
            }
        })
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Password verification task failed");
            None
        });

        match verified {
            Some(identity) => {
                tracing::info!(
                    %username,
                    user_id = identity.user_id(),
                    role = %identity.role(),
                    "Login succeeded"
                );
                record_login("success");
                Ok(identity)
            }
            None => {
                tracing::warn!(%username, "Login failed: invalid credentials");
                record_login("invalid_credentials");
                Err(AuthFailure::InvalidCredentials)
            }
        }
    }

    fn is_admin_bypass(&self, username: &str, password: &str) -> bool {
        self.config.admin_bypass_enabled
            && username == ADMIN_BYPASS_USERNAME
            && password == ADMIN_BYPASS_PASSWORD
    }
}

fn record_login(outcome: &'static str) {
    metrics::counter!("auth_login_total", "outcome" => outcome).increment(1);
}
