//! 配置系统
//! 从环境变量加载所有配置，使用 Secret 包装敏感信息

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
    /// 密码最小长度（按字符计）
    pub password_min_length: usize,
    /// 是否启用内置 Admin/Admin 登录（默认关闭）
    pub admin_bypass_enabled: bool,
    /// 会话有效期（秒）
    pub session_ttl_secs: u64,
    /// Argon2 内存成本（KiB）
    pub argon2_memory_kib: u32,
    /// Argon2 迭代次数
    pub argon2_iterations: u32,
    /// Argon2 并行度
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            password_min_length: 8,
            admin_bypass_enabled: false,
            session_ttl_secs: 28_800,
            argon2_memory_kib: 19_456,
            argon2_iterations: 2,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = SecurityConfig::default();
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
            .set_default("security.password_min_length", defaults.password_min_length as i64)?
            .set_default("security.admin_bypass_enabled", defaults.admin_bypass_enabled)?
            .set_default("security.session_ttl_secs", defaults.session_ttl_secs as i64)?
            .set_default("security.argon2_memory_kib", defaults.argon2_memory_kib as i64)?
            .set_default("security.argon2_iterations", defaults.argon2_iterations as i64)?
            .set_default("security.argon2_parallelism", defaults.argon2_parallelism as i64)?;

        // 从环境变量加载配置（前缀为 HMS_）
        settings = settings.add_source(
            Environment::with_prefix("HMS")
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

        if self.database.url.expose_secret().trim().is_empty() {
            return Err(ConfigError::Message("database.url must not be empty".to_string()));
        }

        self.security.validate()
    }
}

impl SecurityConfig {
    /// 验证安全策略
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 注册密码长度下限不能低于 8
        if self.password_min_length < 8 || self.password_min_length > 128 {
            return Err(ConfigError::Message(
                "password_min_length must be between 8 and 128".to_string(),
            ));
        }

        if self.session_ttl_secs < 60 || self.session_ttl_secs > 604_800 {
            return Err(ConfigError::Message(
                "session_ttl_secs must be between 60 and 604800 (1 minute to 7 days)".to_string(),
            ));
        }

        if self.argon2_parallelism == 0 || self.argon2_parallelism > 16 {
            return Err(ConfigError::Message(
                "argon2_parallelism must be between 1 and 16".to_string(),
            ));
        }

        if self.argon2_iterations == 0 {
            return Err(ConfigError::Message("argon2_iterations must be >= 1".to_string()));
        }

        // Argon2 要求 m >= 8 * p
        if self.argon2_memory_kib < 8 * self.argon2_parallelism {
            return Err(ConfigError::Message(
                "argon2_memory_kib must be at least 8 * argon2_parallelism".to_string(),
            ));
        }

        Ok(())
    }
}
