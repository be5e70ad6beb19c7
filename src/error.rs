//! 统一错误模型
//! 定义认证、注册与应用错误类型，以及错误响应格式

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 登录失败原因
///
/// 对外不区分“用户不存在”与“密码错误”，两者都是 `InvalidCredentials`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Credential store unavailable")]
    StoreUnavailable,
}

/// 注册失败原因（均可由用户修正，除存储故障外）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationFailure {
    #[error("Passwords do not match")]
    Mismatch,

    #[error("Password must be at least {min_length} characters long")]
    TooShort { min_length: usize },

    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Credential store unavailable")]
    StoreUnavailable,

    #[error("Password hashing failed")]
    HashingFailed,
}

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthFailure),

    #[error(transparent)]
    Registration(#[from] RegistrationFailure),

    #[error("Configuration error: {0}")]
    Config(String),

    /// 没有已登录的会话
    #[error("Authentication required")]
    Unauthorized,

    /// 已登录，但角色无权访问该界面
    #[error("Access denied")]
    Forbidden,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(AuthFailure::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            AppError::Auth(AuthFailure::StoreUnavailable) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Registration(failure) => match failure {
                RegistrationFailure::Mismatch
                | RegistrationFailure::TooShort { .. }
                | RegistrationFailure::InvalidUsername(_) => StatusCode::BAD_REQUEST,
                RegistrationFailure::DuplicateUsername => StatusCode::CONFLICT,
                RegistrationFailure::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                RegistrationFailure::HashingFailed => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            AppError::Auth(AuthFailure::InvalidCredentials) => "Invalid credentials".to_string(),
            AppError::Auth(AuthFailure::StoreUnavailable)
            | AppError::Registration(RegistrationFailure::StoreUnavailable) => {
                "Service temporarily unavailable, please try again".to_string()
            }
            AppError::Registration(RegistrationFailure::HashingFailed) => {
                "Registration failed, please try again".to_string()
            }
            AppError::Registration(failure) => failure.to_string(),
            AppError::Unauthorized => "Please login first".to_string(),
            AppError::Forbidden => "Access denied".to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Config(_) => "Configuration error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }
}

/// 错误响应 DTO
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
    pub request_id: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: self.code(),
                message: self.user_message(),
                request_id,
            },
        };

        // 5xx 记为 error，用户可修正的错误记为 warn
        if status.is_server_error() {
            tracing::error!(
                code = self.code(),
                message = %self,
                request_id = %error_response.error.request_id,
                "Application error"
            );
        } else {
            tracing::warn!(
                code = self.code(),
                message = %self,
                request_id = %error_response.error.request_id,
                "Request rejected"
            );
        }

        (status, Json(error_response)).into_response()
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
