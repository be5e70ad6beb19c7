//! HTTP 处理器

pub mod auth;
pub mod dashboard;
pub mod health;
