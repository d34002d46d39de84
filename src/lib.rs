//! 后台访问网关
//! 按岗位限制后台面板的访问，并提供登录、会话与导航数据

pub mod access;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod session;
pub mod telemetry;
