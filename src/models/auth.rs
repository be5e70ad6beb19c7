//! Authentication-related models

use secrecy::Secret;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::user::{RegistrationRole, Role};
use crate::auth::session::Surface;

/// Login request
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: Secret<String>,
}

/// Registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64, message = "Username must be 1 to 64 characters"))]
    pub username: String,
    pub password: Secret<String>,
    pub confirm_password: Secret<String>,
    pub role: RegistrationRole,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    pub user_id: i64,
    pub surface: Surface,
    pub expires_in: u64,
}

/// Registration response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub message: String,
}

/// Current session summary
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub role: Role,
    pub user_id: i64,
    pub surface: Surface,
}
