//! HTTP 中间件
//! 请求追踪、登录限流、路由守卫

use crate::{
    access::{AccessResolver, GuardDecision, NavigationRenderer, RouteGuard},
    auth::{jwt::JwtService, middleware::CurrentSession},
    config::AppConfig,
    error::AppError,
    repository::UserStore,
    services::AuthService,
    session::{SessionAccessor, SessionStore},
};
use axum::{
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

/// 应用状态
///
/// 导航渲染器与路由守卫共享同一个 AccessResolver，权限映射只有一份。
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: sqlx::PgPool,
    pub jwt_service: Arc<JwtService>,
    pub sessions: SessionAccessor,
    pub auth_service: Arc<AuthService>,
    pub resolver: AccessResolver,
    pub guard: Arc<RouteGuard>,
    pub navigation: Arc<NavigationRenderer>,
    /// 登录限流器
    pub rate_limiter: Arc<IpRateLimiter>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: sqlx::PgPool,
        users: Arc<dyn UserStore>,
        session_store: Arc<dyn SessionStore>,
        resolver: AccessResolver,
    ) -> Result<Self, AppError> {
        let jwt_service = Arc::new(JwtService::from_config(&config)?);
        let sessions = SessionAccessor::new(session_store);
        let auth_service = Arc::new(AuthService::new(
            users,
            sessions.clone(),
            jwt_service.clone(),
            resolver.clone(),
        ));
        let guard = Arc::new(RouteGuard::new(
            resolver.clone(),
            config.access.on_unknown_role,
        ));
        let navigation = Arc::new(NavigationRenderer::new(resolver.clone()));
        let rate_limiter = Arc::new(IpRateLimiter::new(
            config.security.login_max_requests as usize,
            Duration::from_secs(config.security.login_window_secs),
        ));

        Ok(Self {
            config,
            db,
            jwt_service,
            sessions,
            auth_service,
            resolver,
            guard,
            navigation,
            rate_limiter,
        })
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let uri = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    async move {
        let start = Instant::now();

        let mut response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        let status_class = match status {
            200..=299 => "2xx",
            300..=399 => "3xx",
            400..=499 => "4xx",
            _ => "5xx",
        };
        metrics::counter!("http_requests_total", "status" => status_class).increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            method = %method,
            uri = %uri,
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        // 在响应头中添加 trace_id
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty() && s.len() <= 128)
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

// ==================== 路由守卫 ====================

/// 路由守卫中间件
/// 每次导航都重新判定，不保留任何状态
pub async fn route_guard_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = req
        .extensions()
        .get::<CurrentSession>()
        .and_then(|current| current.0.clone());
    let path = req.uri().path().to_string();

    let decision = state.guard.evaluate(session.as_ref(), &path);
    metrics::counter!("route_guard_decisions_total", "decision" => decision.label()).increment(1);

    match decision {
        GuardDecision::Authorized => Ok(next.run(req).await),
        GuardDecision::Redirect { location } => Ok(Redirect::temporary(&location).into_response()),
        GuardDecision::Denied { reason } => {
            tracing::warn!(path = %path, reason = ?reason, "Navigation denied");
            Err(AppError::Forbidden)
        }
    }
}

// ==================== 登录限流 ====================

/// IP 级别的速率限制器
/// 使用滑动窗口算法实现
pub struct IpRateLimiter {
    /// 每个 IP 地址的请求时间戳队列
    windows: DashMap<IpAddr, Arc<Mutex<VecDeque<Instant>>>>,
    max_requests: usize,
    window: Duration,
}

/// 超过该数量的跟踪 IP 时清理空闲记录
const MAX_TRACKED_IPS: usize = 10_000;

impl IpRateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    /// 检查是否允许请求，允许时记录本次请求
    pub fn check(&self, ip: &IpAddr) -> bool {
        if self.windows.len() > MAX_TRACKED_IPS {
            self.cleanup_idle();
        }

        let window = self
            .windows
            .entry(*ip)
            .or_insert_with(|| Arc::new(Mutex::new(VecDeque::new())))
            .clone();

        let mut requests = window.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();

        // 清理过期的请求记录
        while let Some(&front) = requests.front() {
            if now.duration_since(front) < self.window {
                break;
            }
            requests.pop_front();
        }

        if requests.len() < self.max_requests {
            requests.push_back(now);
            true
        } else {
            false
        }
    }

    /// 清理窗口内没有请求的 IP
    fn cleanup_idle(&self) {
        let now = Instant::now();
        self.windows.retain(|_, window| {
            let requests = window.lock().unwrap_or_else(|e| e.into_inner());
            requests
                .back()
                .is_some_and(|last| now.duration_since(*last) < self.window)
        });
    }

    pub fn tracked_ips(&self) -> usize {
        self.windows.len()
    }
}

// ==================== 客户端 IP 提取器 ====================

/// Axum 提取器：从请求中获取客户端 IP
pub struct ClientIp(pub IpAddr);

impl FromRequestParts<Arc<AppState>> for ClientIp {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if state.config.security.trust_proxy {
            if let Some(ip) = ip_from_proxy_headers(&parts.headers) {
                return Ok(ClientIp(ip));
            }
        }

        if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            return Ok(ClientIp(addr.ip()));
        }

        // 无法获取真实 IP（例如测试环境），返回本地回环地址
        Ok(ClientIp(IpAddr::V4(Ipv4Addr::LOCALHOST)))
    }
}

/// 从代理头获取客户端 IP
fn ip_from_proxy_headers(headers: &HeaderMap) -> Option<IpAddr> {
    // X-Forwarded-For 可能包含多个 IP，取第一个
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok());

    forwarded.or_else(|| {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    })
}
