//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::{handlers, middleware::AppState};

/// 请求体上限（登录请求只有少量 JSON）
const MAX_BODY_BYTES: usize = 64 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 认证路由
    let auth_routes = Router::new()
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route("/api/v1/auth/logout", post(handlers::auth::logout))
        .route("/api/v1/auth/me", get(handlers::auth::me))
        .route("/api/v1/roles", get(handlers::auth::list_roles));

    // 访问控制查询
    let access_routes = Router::new()
        .route("/api/v1/navigation", get(handlers::access::navigation))
        .route("/api/v1/access/check", get(handlers::access::check));

    // 页面导航（全部经过路由守卫）
    let panel_routes = Router::new()
        .route("/", get(handlers::panel::home))
        .route("/{role}", get(handlers::panel::role_index))
        .route("/{role}/{resource}", get(handlers::panel::show_panel))
        .route(
            "/{role}/{resource}/{*rest}",
            get(handlers::panel::show_panel_subroute),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::route_guard_middleware,
        ));

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(access_routes)
        .merge(panel_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::auth::middleware::session_middleware,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(
            crate::middleware::request_tracking_middleware,
        ))
        .with_state(state)
}
