//! 认证与注册服务测试

use hms_auth::{
    auth::Session,
    config::SecurityConfig,
    error::{AuthFailure, RegistrationFailure},
    models::{
        auth::{LoginRequest, RegisterRequest},
        user::{RegistrationRole, Role},
    },
    repository::{CredentialStore, MemoryCredentialStore},
    services::{AuthService, RegistrationService},
};
use secrecy::Secret;
use std::sync::Arc;

mod common;
use common::{
    create_test_user, test_hasher, test_security_config, test_security_config_with_bypass,
    CorruptRoleStore, FailingStore,
};

fn services(
    store: Arc<dyn CredentialStore>,
    config: SecurityConfig,
) -> (AuthService, RegistrationService) {
    let hasher = Arc::new(test_hasher());
    let config = Arc::new(config);
    (
        AuthService::new(store.clone(), hasher.clone(), config.clone()),
        RegistrationService::new(store, hasher, config),
    )
}

fn register_request(username: &str, password: &str, confirm: &str, role: RegistrationRole) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        password: Secret::new(password.to_string()),
        confirm_password: Secret::new(confirm.to_string()),
        role,
    }
}

#[tokio::test]
async fn test_authenticate_success() {
    let store = Arc::new(MemoryCredentialStore::new());
    let user_id = create_test_user(&store, "alice", "Secret#2024", Role::Patient).await;
    let (auth, _) = services(store, test_security_config());

    let identity = auth.authenticate("alice", "Secret#2024").await.unwrap();
    assert_eq!(identity.role(), Role::Patient);
    assert_eq!(identity.user_id(), user_id);
    assert!(!identity.is_bypass());
}

#[tokio::test]
async fn test_unknown_user_and_wrong_password_are_indistinguishable() {
    let store = Arc::new(MemoryCredentialStore::new());
    create_test_user(&store, "alice", "Secret#2024", Role::Patient).await;
    let (auth, _) = services(store, test_security_config());

    let wrong_password = auth.authenticate("alice", "wrong-password").await.unwrap_err();
    let unknown_user = auth.authenticate("mallory", "Secret#2024").await.unwrap_err();

    assert_eq!(wrong_password, AuthFailure::InvalidCredentials);
    assert_eq!(wrong_password, unknown_user);
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
}

#[tokio::test]
async fn test_username_lookup_is_case_sensitive() {
    let store = Arc::new(MemoryCredentialStore::new());
    create_test_user(&store, "alice", "Secret#2024", Role::Doctor).await;
    let (auth, _) = services(store, test_security_config());

    assert_eq!(
        auth.authenticate("Alice", "Secret#2024").await.unwrap_err(),
        AuthFailure::InvalidCredentials
    );
}

#[tokio::test]
async fn test_admin_bypass_on_empty_store() {
    let store = Arc::new(MemoryCredentialStore::new());
    let (auth, _) = services(store, test_security_config_with_bypass());

    let identity = auth.authenticate("Admin", "Admin").await.unwrap();
    assert_eq!(identity.role(), Role::Admin);
    assert_eq!(identity.user_id(), 0);
    assert!(identity.is_bypass());
}

#[tokio::test]
async fn test_admin_bypass_does_not_touch_store() {
    let (auth, _) = services(Arc::new(FailingStore), test_security_config_with_bypass());

    let identity = auth.authenticate("Admin", "Admin").await.unwrap();
    assert_eq!(identity.role(), Role::Admin);

    // 其他用户仍然需要存储
    assert_eq!(
        auth.authenticate("alice", "Secret#2024").await.unwrap_err(),
        AuthFailure::StoreUnavailable
    );
}

#[tokio::test]
async fn test_admin_bypass_is_exact_match() {
    let (auth, _) = services(
        Arc::new(MemoryCredentialStore::new()),
        test_security_config_with_bypass(),
    );

    for (username, password) in [("admin", "Admin"), ("Admin", "admin"), ("Admin ", "Admin")] {
        assert_eq!(
            auth.authenticate(username, password).await.unwrap_err(),
            AuthFailure::InvalidCredentials,
            "{:?}/{:?} must not match the built-in admin",
            username,
            password
        );
    }
}

#[tokio::test]
async fn test_admin_bypass_disabled_by_default() {
    let (auth, _) = services(Arc::new(MemoryCredentialStore::new()), test_security_config());

    assert_eq!(
        auth.authenticate("Admin", "Admin").await.unwrap_err(),
        AuthFailure::InvalidCredentials
    );
}

#[tokio::test]
async fn test_login_request_uses_authenticate() {
    let store = Arc::new(MemoryCredentialStore::new());
    create_test_user(&store, "drwho", "Tardis#1963", Role::Doctor).await;
    let (auth, _) = services(store, test_security_config());

    let identity = auth
        .login(LoginRequest {
            username: "drwho".to_string(),
            password: Secret::new("Tardis#1963".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(identity.role(), Role::Doctor);
}

#[tokio::test]
async fn test_store_unavailable() {
    let (auth, registration) = services(Arc::new(FailingStore), test_security_config());

    assert_eq!(
        auth.authenticate("alice", "Secret#2024").await.unwrap_err(),
        AuthFailure::StoreUnavailable
    );
    assert_eq!(
        registration
            .register(register_request("alice", "Secret#2024", "Secret#2024", RegistrationRole::Patient))
            .await
            .unwrap_err(),
        RegistrationFailure::StoreUnavailable
    );
}

#[tokio::test]
async fn test_corrupt_role_fails_closed() {
    let (auth, _) = services(Arc::new(CorruptRoleStore), test_security_config());

    assert_eq!(
        auth.authenticate("alice", "Secret#2024").await.unwrap_err(),
        AuthFailure::StoreUnavailable
    );
}

#[tokio::test]
async fn test_register_then_authenticate() {
    let store = Arc::new(MemoryCredentialStore::new());
    let (auth, registration) = services(store.clone(), test_security_config());

    let user_id = registration
        .register(register_request("drjane", "Stetho#55", "Stetho#55", RegistrationRole::Doctor))
        .await
        .unwrap();

    let identity = auth.authenticate("drjane", "Stetho#55").await.unwrap();
    assert_eq!(identity.role(), Role::Doctor);
    assert_eq!(identity.user_id(), user_id);

    // 存储的是哈希而不是明文
    let credential = store.find_credential("drjane").await.unwrap().unwrap();
    assert_ne!(credential.password_hash, "Stetho#55");
    assert!(credential.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn test_register_too_short_creates_nothing() {
    let store = Arc::new(MemoryCredentialStore::new());
    let (_, registration) = services(store.clone(), test_security_config());

    let err = registration
        .register(register_request("bob", "short77", "short77", RegistrationRole::Patient))
        .await
        .unwrap_err();

    assert_eq!(err, RegistrationFailure::TooShort { min_length: 8 });
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_register_mismatch_then_valid_then_duplicate() {
    let store = Arc::new(MemoryCredentialStore::new());
    let (_, registration) = services(store.clone(), test_security_config());

    let err = registration
        .register(register_request("bob", "abcdefgh", "abcdefgx", RegistrationRole::Patient))
        .await
        .unwrap_err();
    assert_eq!(err, RegistrationFailure::Mismatch);
    assert!(store.is_empty());

    registration
        .register(register_request("bob", "abcdefgh", "abcdefgh", RegistrationRole::Patient))
        .await
        .unwrap();
    assert_eq!(store.len(), 1);

    let err = registration
        .register(register_request("bob", "zyxwvuts", "zyxwvuts", RegistrationRole::Doctor))
        .await
        .unwrap_err();
    assert_eq!(err, RegistrationFailure::DuplicateUsername);
    assert_eq!(store.len(), 1);

    // 原有凭据保持不变
    let credential = store.find_credential("bob").await.unwrap().unwrap();
    assert_eq!(credential.role, Role::Patient);
}

#[tokio::test]
async fn test_register_mismatch_reported_before_length() {
    let (_, registration) = services(Arc::new(MemoryCredentialStore::new()), test_security_config());

    let err = registration
        .register(register_request("bob", "abc", "abd", RegistrationRole::Patient))
        .await
        .unwrap_err();
    assert_eq!(err, RegistrationFailure::Mismatch);
}

#[tokio::test]
async fn test_register_rejects_invalid_usernames() {
    let store = Arc::new(MemoryCredentialStore::new());
    let (_, registration) = services(store.clone(), test_security_config());

    let too_long = "x".repeat(65);
    for username in ["", "two words", "tab\tname", too_long.as_str()] {
        let err = registration
            .register(register_request(username, "abcdefgh", "abcdefgh", RegistrationRole::Patient))
            .await
            .unwrap_err();
        assert!(
            matches!(err, RegistrationFailure::InvalidUsername(_)),
            "{:?} should be rejected, got {:?}",
            username,
            err
        );
    }
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_register_respects_configured_min_length() {
    let config = SecurityConfig {
        password_min_length: 12,
        ..test_security_config()
    };
    let (_, registration) = services(Arc::new(MemoryCredentialStore::new()), config);

    let err = registration
        .register(register_request("carol", "elevenchars", "elevenchars", RegistrationRole::Doctor))
        .await
        .unwrap_err();
    assert_eq!(err, RegistrationFailure::TooShort { min_length: 12 });
}

#[tokio::test]
async fn test_session_follows_login_and_logout() {
    let store = Arc::new(MemoryCredentialStore::new());
    create_test_user(&store, "drwho", "Tardis#1963", Role::Doctor).await;
    let (auth, _) = services(store, test_security_config());

    let mut session = Session::new();
    assert!(session.require(Role::Doctor).is_err());

    let identity = auth.authenticate("drwho", "Tardis#1963").await.unwrap();
    session.establish(identity).unwrap();
    assert!(session.establish(identity).is_err());
    assert_eq!(session.role(), Some(Role::Doctor));
    assert!(session.require(Role::Doctor).is_ok());
    assert!(session.require(Role::Admin).is_err());

    session.logout();
    assert!(!session.is_logged_in());
    assert!(session.require(Role::Doctor).is_err());
}
