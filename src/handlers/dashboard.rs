//! 控制台处理器
//! 按角色挂载管理员、医生、患者控制台

use crate::{
    auth::SessionContext,
    error::AppError,
    models::{dashboard::Dashboard, user::Role},
};
use axum::{response::IntoResponse, Json};

/// 当前会话对应的控制台
pub async fn dashboard(ctx: SessionContext) -> Result<impl IntoResponse, AppError> {
    let surface = ctx.session.surface()?;
    Ok(Json(Dashboard::for_surface(surface)))
}

pub async fn admin_console(ctx: SessionContext) -> Result<impl IntoResponse, AppError> {
    console(&ctx, Role::Admin)
}

pub async fn doctor_console(ctx: SessionContext) -> Result<impl IntoResponse, AppError> {
    console(&ctx, Role::Doctor)
}

pub async fn patient_console(ctx: SessionContext) -> Result<impl IntoResponse, AppError> {
    console(&ctx, Role::Patient)
}

fn console(ctx: &SessionContext, role: Role) -> Result<Json<Dashboard>, AppError> {
    let identity = ctx.session.require(role)?;
    Ok(Json(Dashboard::for_surface(identity.surface())))
}
