//! 配置系统
//! 从环境变量加载所有配置，使用 Secret 包装敏感信息

use crate::access::UnknownRolePolicy;
use config::{Config, ConfigError, Environment};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:3000"
    pub addr: String,
    /// 优雅关闭超时时间（秒）
    pub graceful_shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库连接 URL（使用 Secret 包装，防止日志泄露）
    pub url: Secret<String>,
    /// 最大连接数
    pub max_connections: u32,
    /// 最小连接数
    pub min_connections: u32,
    /// 获取连接超时时间（秒）
    pub acquire_timeout_secs: u64,
    /// 空闲连接超时时间（秒）
    pub idle_timeout_secs: u64,
    /// 连接最大生命周期（秒）
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// JWT 密钥（使用 Secret 包装，防止日志泄露）
    pub jwt_secret: Secret<String>,
    /// 是否信任 X-Forwarded-For 头
    pub trust_proxy: bool,
    /// 登录限流：窗口内最大请求数
    pub login_max_requests: u32,
    /// 登录限流窗口（秒）
    pub login_window_secs: u64,
}

/// 会话存储类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStoreKind {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// 会话存储: memory, postgres
    pub store: SessionStoreKind,
    /// 会话有效期（秒），同时也是令牌有效期
    pub ttl_secs: u64,
    /// 会话 Cookie 名称
    pub cookie_name: String,
    /// 过期会话清理间隔（秒）
    pub purge_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessConfig {
    /// 未知角色的处理策略: allow（放行）或 deny（拒绝）
    pub on_unknown_role: UnknownRolePolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub session: SessionConfig,
    pub access: AccessConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        // 添加默认配置
        settings = settings
            .set_default("server.addr", "0.0.0.0:3000")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.idle_timeout_secs", 600)?
            .set_default("database.max_lifetime_secs", 1800)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("security.jwt_secret", "change-this-secret-in-production-min-32-chars!")?
            .set_default("security.trust_proxy", true)?
            .set_default("security.login_max_requests", 10)?
            .set_default("security.login_window_secs", 300)?
            // 会话默认配置
            .set_default("session.store", "memory")?
            .set_default("session.ttl_secs", 28800)?
            .set_default("session.cookie_name", "backoffice_session")?
            .set_default("session.purge_interval_secs", 600)?
            // 访问控制默认配置
            .set_default("access.on_unknown_role", "allow")?;

        // 从环境变量加载配置（前缀为 BACKOFFICE_）
        settings = settings.add_source(
            Environment::with_prefix("BACKOFFICE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        // 验证配置
        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 验证端口范围
        if let Some(port_str) = self.server.addr.split(':').next_back() {
            if let Ok(port) = port_str.parse::<u16>() {
                if port != 0 && port < 1024 {
                    return Err(ConfigError::Message("Server port should be >= 1024".to_string()));
                }
            }
        }

        // 验证日志级别
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        // 验证日志格式
        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        // 验证数据库连接池配置
        if self.database.max_connections < self.database.min_connections {
            return Err(ConfigError::Message(
                "max_connections must be >= min_connections".to_string(),
            ));
        }

        // 验证 JWT 密钥长度（至少 32 字符）
        if self.security.jwt_secret.expose_secret().len() < 32 {
            return Err(ConfigError::Message(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }

        // 验证会话有效期
        if self.session.ttl_secs < 60 || self.session.ttl_secs > 604800 {
            return Err(ConfigError::Message(
                "session.ttl_secs must be between 60 and 604800 (1 minute to 7 days)".to_string(),
            ));
        }

        if self.session.cookie_name.is_empty()
            || !self
                .session
                .cookie_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ConfigError::Message(format!(
                "Invalid session cookie name: {}",
                self.session.cookie_name
            )));
        }

        if self.session.purge_interval_secs == 0 {
            return Err(ConfigError::Message(
                "session.purge_interval_secs must be greater than 0".to_string(),
            ));
        }

        if self.security.login_max_requests == 0 || self.security.login_window_secs == 0 {
            return Err(ConfigError::Message(
                "login rate limit must allow at least one request per window".to_string(),
            ));
        }

        Ok(())
    }
}

/// 单元测试使用的配置
#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            graceful_shutdown_timeout_secs: 5,
        },
        database: DatabaseConfig {
            url: Secret::new("postgresql://localhost/backoffice_test".to_string()),
            max_connections: 5,
            min_connections: 0,
            acquire_timeout_secs: 1,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            jwt_secret: Secret::new("test_secret_key_32_characters_long!".to_string()),
            trust_proxy: true,
            login_max_requests: 10,
            login_window_secs: 300,
        },
        session: SessionConfig {
            store: SessionStoreKind::Memory,
            ttl_secs: 3600,
            cookie_name: "backoffice_session".to_string(),
            purge_interval_secs: 600,
        },
        access: AccessConfig {
            on_unknown_role: UnknownRolePolicy::Allow,
        },
    }
}
