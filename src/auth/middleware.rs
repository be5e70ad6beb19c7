//! 会话令牌提取

use crate::{auth::session::Session, error::AppError, middleware::AppState};
use axum::{extract::FromRequestParts, http::HeaderMap};
use std::{convert::Infallible, sync::Arc};
use uuid::Uuid;

/// 备用请求头（非 Bearer 客户端使用）
pub const SESSION_HEADER: &str = "x-session-token";

/// 请求级会话上下文
///
/// 只包含调用方自己的会话；令牌缺失、无效或已过期时为 `Anonymous`。
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub token: Option<Uuid>,
    pub session: Session,
}

impl SessionContext {
    /// 要求已登录，返回令牌
    pub fn require_token(&self) -> Result<Uuid, AppError> {
        match (self.token, self.session.is_logged_in()) {
            (Some(token), true) => Ok(token),
            _ => Err(AppError::Unauthorized),
        }
    }
}

impl FromRequestParts<Arc<AppState>> for SessionContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers);
        let session = token
            .map(|token| state.sessions.resolve(&token))
            .unwrap_or_default();

        Ok(SessionContext { token, session })
    }
}

/// 从 Authorization 头或 x-session-token 头提取会话令牌
pub fn extract_token(headers: &HeaderMap) -> Option<Uuid> {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "));

    let raw = bearer.or_else(|| headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()))?;

    Uuid::parse_str(raw.trim()).ok()
}
