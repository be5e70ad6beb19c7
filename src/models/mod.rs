//! 数据模型模块
//! 凭据、认证请求与控制台布局

pub mod auth;
pub mod dashboard;
pub mod user;
