//! 认证相关的 HTTP 处理器

use crate::{
    auth::SessionContext, error::AppError, middleware::AppState, models::auth::*,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 登录
///
/// 成功后签发新的会话令牌；同一客户端之前的令牌不受影响，直到登出或过期。
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let identity = state.auth_service.login(req).await?;
    let token = state.sessions.open(identity);

    tracing::info!(
        user_id = identity.user_id(),
        role = %identity.role(),
        bypass = identity.is_bypass(),
        "Session opened"
    );

    Ok(Json(LoginResponse {
        token: token.to_string(),
        role: identity.role(),
        user_id: identity.user_id(),
        surface: identity.surface(),
        expires_in: state.sessions.ttl_secs(),
    }))
}

/// 注册医生或患者账号
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    // 角色只能是 doctor 或 patient，其他取值在反序列化阶段即被拒绝
    let Json(req) = payload?;
    let user_id = state.registration_service.register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id,
            message: "Registration successful! Please login.".to_string(),
        }),
    ))
}

/// 登出
pub async fn logout(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
) -> Result<impl IntoResponse, AppError> {
    let token = ctx.require_token()?;
    state.sessions.close(&token);

    tracing::info!(user_id = ctx.session.user_id(), "User logged out");

    Ok(Json(json!({ "message": "Logged out" })))
}

/// 当前会话
pub async fn me(ctx: SessionContext) -> Result<impl IntoResponse, AppError> {
    let identity = ctx.session.identity().ok_or(AppError::Unauthorized)?;

    Ok(Json(SessionResponse {
        role: identity.role(),
        user_id: identity.user_id(),
        surface: identity.surface(),
    }))
}
