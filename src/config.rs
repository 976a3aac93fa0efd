/*
 * Responsibility
 * - 環境変数や設定の読み込み (ADDRESS, JWT_SECRET, DB_*, LOG_*, CORS 許可など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use chrono::Duration;
use sqlx::postgres::PgConnectOptions;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::services::auth::jwt::{DEFAULT_ISSUER, DEFAULT_TTL_SECONDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub username: String,
    pub password: String,
    pub max_connections: u32,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("username", &self.username)
            .field("max_connections", &self.max_connections)
            .finish_non_exhaustive()
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.name)
            .username(&self.username)
            .password(&self.password)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `local` → human readable output, anything else → JSON lines.
    pub env: String,
    pub level: LevelFilter,
}

impl LogConfig {
    pub fn is_local(&self) -> bool {
        self.env.eq_ignore_ascii_case("local")
    }
}

/// Accepts logrus-style numeric levels (0 = panic .. 6 = trace) or level names.
fn parse_log_level(raw: &str) -> Option<LevelFilter> {
    match raw.trim() {
        // panic / fatal / error all collapse to ERROR
        "0" | "1" | "2" => Some(LevelFilter::ERROR),
        "3" => Some(LevelFilter::WARN),
        "4" => Some(LevelFilter::INFO),
        "5" => Some(LevelFilter::DEBUG),
        "6" => Some(LevelFilter::TRACE),
        name => LevelFilter::from_str(name).ok(),
    }
}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_ttl: Duration,

    pub database: DatabaseConfig,
    pub log: LogConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the signing secret
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_ttl", &self.jwt_ttl)
            .field("database", &self.database)
            .field("log", &self.log)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr: SocketAddr =
            parsed_or(&lookup, "ADDRESS", SocketAddr::from(([0, 0, 0, 0], 4000)))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let jwt_secret = required(&lookup, "JWT_SECRET")?;
        let jwt_issuer = lookup("JWT_ISSUER")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_ISSUER.to_string());

        let ttl_seconds: i64 = parsed_or(&lookup, "JWT_TTL_SECONDS", DEFAULT_TTL_SECONDS)?;
        if ttl_seconds <= 0 {
            return Err(ConfigError::Invalid("JWT_TTL_SECONDS"));
        }
        let jwt_ttl =
            Duration::try_seconds(ttl_seconds).ok_or(ConfigError::Invalid("JWT_TTL_SECONDS"))?;

        let database = DatabaseConfig {
            host: required(&lookup, "DB_HOST")?,
            port: required(&lookup, "DB_PORT")?
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("DB_PORT"))?,
            name: required(&lookup, "DB_NAME")?,
            username: required(&lookup, "DB_USERNAME")?,
            password: required(&lookup, "DB_PASSWORD")?,
            max_connections: parsed_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
        };

        let log = LogConfig {
            env: lookup("LOG_ENV").unwrap_or_else(|| "local".to_string()),
            level: match lookup("LOG_LEVEL") {
                Some(raw) => parse_log_level(&raw).ok_or(ConfigError::Invalid("LOG_LEVEL"))?,
                None => LevelFilter::INFO,
            },
        };

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            jwt_secret,
            jwt_issuer,
            jwt_ttl,
            database,
            log,
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parsed_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}
