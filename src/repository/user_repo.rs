//! User repository (数据库访问层)

use crate::{error::AppError, models::user::*};
use async_trait::async_trait;
use sqlx::PgPool;

/// 用户存储：登录时读取凭证与角色
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn create(&self, user: &NewUser) -> Result<User, AppError>;
}

pub struct UserRepository {
    db: PgPool,
}

impl UserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    /// 根据用户名查找用户
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, email, password_hash, role, location_id, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    /// 创建用户
    async fn create(&self, user: &NewUser) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, role, location_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING user_id, username, email, password_hash, role, location_id, created_at, updated_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(&user.location_id)
        .fetch_one(&self.db)
        .await?;

        Ok(user)
    }
}
