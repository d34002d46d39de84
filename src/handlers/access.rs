//! 访问控制查询处理器
//! 导航渲染与守卫判定共用同一个权限映射

use crate::{
    auth::middleware::CurrentSession,
    middleware::AppState,
    models::auth::{AccessCheckResponse, NavigationResponse, PathQuery},
};
use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

/// 当前会话的导航项
pub async fn navigation(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<PathQuery>,
) -> Json<NavigationResponse> {
    Json(NavigationResponse {
        entries: state.navigation.render(session.as_ref(), &query.path),
    })
}

/// 预检一次导航：首次判定以及跟随重定向后的最终结果
pub async fn check(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<PathQuery>,
) -> Json<AccessCheckResponse> {
    let decision = state.guard.evaluate(session.as_ref(), &query.path);
    let run = state.guard.navigate(session.as_ref(), &query.path);
    let role_status = session
        .as_ref()
        .map(|s| s.role_claim().kind())
        .unwrap_or("absent");

    Json(AccessCheckResponse {
        path: query.path,
        role_status,
        decision,
        final_path: run.path,
        states: run.states,
    })
}
