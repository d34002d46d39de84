//! HTTP 处理器

pub mod access;
pub mod auth;
pub mod health;
pub mod panel;
