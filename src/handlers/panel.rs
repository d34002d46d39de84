//! 面板路由处理器
//!
//! 守卫中间件已经完成判定，这里只描述面板本身。数据接口需要自行鉴权，
//! 不能依赖页面守卫。

use crate::{
    access::{Resource, Role},
    auth::middleware::CurrentSession,
    error::AppError,
    middleware::AppState,
    models::auth::{HomeResponse, PanelResponse},
    session::Session,
};
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

/// `/`
///
/// 已识别岗位的会话会被守卫重定向到落地页，到达这里的只有匿名访问和未识别岗位。
pub async fn home(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Json<HomeResponse> {
    let landing_path = session
        .as_ref()
        .and_then(|s| s.role_claim().role())
        .and_then(|role| state.resolver.default_landing_path(role).ok());

    Json(HomeResponse {
        landing_path,
        navigation: state.navigation.render(session.as_ref(), "/"),
    })
}

/// `/{role}`
pub async fn role_index(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Path(role): Path<String>,
) -> Result<Json<HomeResponse>, AppError> {
    let role = Role::parse(&role).ok_or_else(|| AppError::not_found("panel"))?;
    let path = format!("/{}", role);

    Ok(Json(HomeResponse {
        landing_path: state.resolver.default_landing_path(role).ok(),
        navigation: state.navigation.render(session.as_ref(), &path),
    }))
}

/// `/{role}/{resource}`
pub async fn show_panel(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Path((role, resource)): Path<(String, String)>,
) -> Result<Json<PanelResponse>, AppError> {
    describe(&state, session.as_ref(), &role, &resource)
}

/// `/{role}/{resource}/...` 子页面
pub async fn show_panel_subroute(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Path((role, resource, _rest)): Path<(String, String, String)>,
) -> Result<Json<PanelResponse>, AppError> {
    describe(&state, session.as_ref(), &role, &resource)
}

fn describe(
    state: &AppState,
    session: Option<&Session>,
    role: &str,
    resource: &str,
) -> Result<Json<PanelResponse>, AppError> {
    let role = Role::parse(role).ok_or_else(|| AppError::not_found("panel"))?;
    let resource =
        Resource::from_slug(resource).ok_or_else(|| AppError::not_found("panel"))?;

    let path = resource.canonical_path(role);
    Ok(Json(PanelResponse {
        role,
        resource,
        label: resource.label(),
        navigation: state.navigation.render(session, &path),
        path,
    }))
}
