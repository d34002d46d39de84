//! 会话认证中间件
//!
//! 令牌只携带会话 ID，每个请求都会回到会话存储重新读取会话。

use crate::{error::AppError, middleware::AppState, session::Session};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// 当前请求的会话（附加到请求扩展）
///
/// 匿名请求为 `None`。
#[derive(Debug, Clone, Default)]
pub struct CurrentSession(pub Option<Session>);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .unwrap_or_default())
    }
}

// 需要登录的 handler 直接提取 Session
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentSession>()
            .and_then(|current| current.0.clone())
            .ok_or(AppError::Unauthorized)
    }
}

/// 提取令牌：优先 Authorization 头，其次会话 Cookie
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// 会话中间件
///
/// 令牌缺失、无效，或会话已失效时按匿名处理，不在这里拒绝请求。
pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let session = resolve_session(&state, req.headers()).await;
    req.extensions_mut().insert(CurrentSession(session));

    next.run(req).await
}

async fn resolve_session(state: &AppState, headers: &HeaderMap) -> Option<Session> {
    let token = extract_token(headers, &state.config.session.cookie_name)?;
    let claims = state.jwt_service.validate(&token).ok()?;
    let session_id = claims.session_id().ok()?;

    let session = state.sessions.read(&session_id).await?;

    // 令牌与会话必须属于同一用户
    if session.user_id.to_string() != claims.sub {
        tracing::warn!(session_id = %session_id, "Token subject does not match session owner");
        return None;
    }

    Some(session)
}

/// 设置会话 Cookie
pub fn session_cookie(name: &str, token: &str, max_age_secs: u64) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, token, max_age_secs
    ))
    .ok()
}

/// 清除会话 Cookie
pub fn clear_session_cookie(name: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        name
    ))
    .ok()
}
