//! 认证相关的 HTTP 处理器

use crate::{
    access::Role,
    auth::middleware::{clear_session_cookie, session_cookie},
    error::AppError,
    middleware::{AppState, ClientIp},
    models::auth::*,
    session::Session,
};
use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    ClientIp(client_ip): ClientIp,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !state.rate_limiter.check(&client_ip) {
        tracing::warn!(client_ip = %client_ip, "Login rate limit exceeded");
        return Err(AppError::RateLimitExceeded);
    }

    let response = state.auth_service.login(req).await?;

    let mut headers = HeaderMap::new();
    if let Some(cookie) = session_cookie(
        &state.config.session.cookie_name,
        &response.access_token,
        response.expires_in,
    ) {
        headers.insert(header::SET_COOKIE, cookie);
    }

    Ok((headers, Json(response)))
}

/// 登出
pub async fn logout(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    state.auth_service.logout(&session).await?;

    let mut headers = HeaderMap::new();
    if let Some(cookie) = clear_session_cookie(&state.config.session.cookie_name) {
        headers.insert(header::SET_COOKIE, cookie);
    }

    Ok((headers, Json(json!({"message": "Logged out"}))))
}

/// 获取当前会话信息
pub async fn me(session: Session) -> Json<MeResponse> {
    Json(MeResponse {
        session_id: session.session_id,
        user_id: session.user_id,
        role_status: session.role_claim().kind(),
        username: session.username,
        role: session.role,
        location_id: session.location_id,
        expires_at: session.expires_at,
    })
}

/// 岗位列表（登录页的岗位选择）
pub async fn list_roles(State(state): State<Arc<AppState>>) -> Json<Vec<RoleOption>> {
    let roles = Role::ALL
        .iter()
        .map(|role| RoleOption {
            role: *role,
            display_name: role.display_name(),
            selectable: role.is_selectable(),
            landing_path: state.resolver.default_landing_path(*role).ok(),
        })
        .collect();

    Json(roles)
}
