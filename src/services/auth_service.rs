//! 认证服务：登录、登出

use crate::{
    access::{AccessResolver, RoleClaim},
    auth::{jwt::JwtService, password::PasswordHasher},
    error::AppError,
    models::{auth::*, user::*},
    repository::UserStore,
    session::{Session, SessionAccessor},
};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use validator::Validate;

/// 未能确定落地页时的默认路径
pub const FALLBACK_LANDING_PATH: &str = "/";

/// 用户不存在时参与校验的占位密码
const DUMMY_PASSWORD: &str = "backoffice-gate-dummy-password";

pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: SessionAccessor,
    jwt_service: Arc<JwtService>,
    resolver: AccessResolver,
    hasher: PasswordHasher,
    /// 用户不存在时也做一次完整的 Argon2 校验，登录耗时不暴露用户名是否存在
    dummy_hash: OnceCell<String>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: SessionAccessor,
        jwt_service: Arc<JwtService>,
        resolver: AccessResolver,
    ) -> Self {
        Self {
            users,
            sessions,
            jwt_service,
            resolver,
            hasher: PasswordHasher::new(),
            dummy_hash: OnceCell::new(),
        }
    }

    /// 用户登录
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        req.validate()?;

        // 获取用户
        let user: User = match self.users.find_by_username(&req.username).await? {
            Some(user) => user,
            None => {
                let _ = self.hasher.verify(&req.password, self.dummy_hash());
                tracing::warn!(username = %req.username, "Login failed: unknown user");
                return Err(AppError::Unauthorized);
            }
        };

        // 验证密码
        if let Err(e) = self.hasher.verify(&req.password, &user.password_hash) {
            tracing::warn!(username = %user.username, "Login failed: wrong password");
            return Err(e);
        }

        // 创建会话（唯一一次写入）
        let session = Session::new(
            user.user_id,
            &user.username,
            &user.role,
            user.location_id.clone(),
            self.jwt_service.token_exp_secs(),
        );
        self.sessions.init(&session).await?;

        let access_token = self.jwt_service.issue(&session)?;
        let landing_path = self.landing_path(&session.role);

        tracing::info!(
            username = %user.username,
            role = %user.role,
            landing_path = %landing_path,
            "Login succeeded"
        );

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer",
            expires_in: self.jwt_service.token_exp_secs(),
            landing_path,
            user: UserResponse::from(user),
        })
    }

    /// 用户登出（销毁会话）
    pub async fn logout(&self, session: &Session) -> Result<bool, AppError> {
        let removed = self.sessions.teardown(&session.session_id).await?;

        tracing::info!(username = %session.username, "Logout");
        Ok(removed)
    }

    fn dummy_hash(&self) -> &str {
        self.dummy_hash.get_or_init(|| {
            self.hasher.hash(DUMMY_PASSWORD).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to prepare dummy password hash");
                String::new()
            })
        })
    }

    /// 登录后的落地页
    pub fn landing_path(&self, role: &str) -> String {
        match RoleClaim::classify(Some(role)) {
            RoleClaim::Known(role) => match self.resolver.default_landing_path(role) {
                Ok(path) => path,
                Err(e) => {
                    tracing::error!(role = %role, error = %e, "No landing page for role");
                    FALLBACK_LANDING_PATH.to_string()
                }
            },
            RoleClaim::Unknown(value) => {
                tracing::warn!(role = %value, "Unrecognized role at login");
                FALLBACK_LANDING_PATH.to_string()
            }
            RoleClaim::Absent => FALLBACK_LANDING_PATH.to_string(),
        }
    }
}
