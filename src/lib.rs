//! 医院管理系统认证核心
//! 密码哈希、登录、注册与按角色的会话门禁

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;
