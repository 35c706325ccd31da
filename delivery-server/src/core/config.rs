use std::path::PathBuf;

use chrono_tz::Tz;

use crate::auth::JwtConfig;
use crate::auth::jwt::MIN_SECRET_LEN;
use crate::core::ServerError;
use crate::message::bus::DEFAULT_CHANNEL_CAPACITY;

const DEV_JWT_SECRET: &str = "delivery-dev-secret-change-me-in-production";

/// Server configuration
///
/// # Environment
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | database and log root |
/// | HTTP_PORT | 3000 | HTTP / WebSocket port |
/// | ENVIRONMENT | development | development, staging or production |
/// | BUSINESS_TIMEZONE | America/Sao_Paulo | calendar day for order numbers |
/// | EVENT_CHANNEL_CAPACITY | 1024 | live event buffer per subscriber |
/// | CATALOG_SEED_PATH | unset | products loaded into an empty catalog |
/// | JWT_SECRET | dev secret | HS256 secret for staff tokens |
/// | JWT_ISSUER | delivery-auth | expected `iss` |
/// | JWT_AUDIENCE | delivery-staff | expected `aud` |
/// | LOG_LEVEL | info | default filter when RUST_LOG is unset |
/// | LOG_JSON | false | JSON log lines |
/// | LOG_DIR | unset | daily rolling log files |
/// | REQUEST_TIMEOUT_MS | 30000 | HTTP request timeout |
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    pub environment: String,
    /// IANA name, parsed by [`Config::timezone`]
    pub business_timezone: String,
    pub event_channel_capacity: usize,
    pub catalog_seed_path: Option<String>,
    pub jwt: JwtConfig,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    pub request_timeout_ms: u64,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: env_or("WORK_DIR", "./data"),
            http_port: env_parse("HTTP_PORT", 3000),
            environment: env_or("ENVIRONMENT", "development"),
            business_timezone: env_or("BUSINESS_TIMEZONE", "America/Sao_Paulo"),
            event_channel_capacity: env_parse("EVENT_CHANNEL_CAPACITY", DEFAULT_CHANNEL_CAPACITY),
            catalog_seed_path: env_opt("CATALOG_SEED_PATH"),
            jwt: JwtConfig {
                secret: env_or("JWT_SECRET", DEV_JWT_SECRET),
                expiration_minutes: env_parse("JWT_EXPIRATION_MINUTES", 720),
                issuer: env_or("JWT_ISSUER", "delivery-auth"),
                audience: env_or("JWT_AUDIENCE", "delivery-staff"),
            },
            log_level: env_or("LOG_LEVEL", "info"),
            log_json: env_parse("LOG_JSON", false),
            log_dir: env_opt("LOG_DIR"),
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS", 30_000),
        }
    }

    /// Defaults rooted at `work_dir`, for tests
    pub fn with_work_dir(work_dir: impl Into<String>) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port: 0,
            environment: "development".into(),
            business_timezone: "America/Sao_Paulo".into(),
            event_channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            catalog_seed_path: None,
            jwt: JwtConfig::default(),
            log_level: "info".into(),
            log_json: false,
            log_dir: None,
            request_timeout_ms: 30_000,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn timezone(&self) -> Result<Tz, ServerError> {
        self.business_timezone.parse::<Tz>().map_err(|_| {
            ServerError::Config(format!(
                "BUSINESS_TIMEZONE '{}' is not an IANA time zone",
                self.business_timezone
            ))
        })
    }

    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_dir().join("orders.redb")
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<(), ServerError> {
        self.timezone()?;

        if self.event_channel_capacity == 0 {
            return Err(ServerError::Config(
                "EVENT_CHANNEL_CAPACITY must be greater than 0".into(),
            ));
        }

        if self.jwt.secret == DEV_JWT_SECRET {
            if self.is_production() {
                return Err(ServerError::Config(
                    "JWT_SECRET must be set in production".into(),
                ));
            }
            tracing::warn!("JWT_SECRET not set, using the development secret");
        } else if self.jwt.secret.len() < MIN_SECRET_LEN && self.is_production() {
            return Err(ServerError::Config(format!(
                "JWT_SECRET must be at least {MIN_SECRET_LEN} characters long"
            )));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::with_work_dir("/tmp/delivery");
        assert!(config.validate().is_ok());
        assert_eq!(config.timezone().unwrap(), chrono_tz::America::Sao_Paulo);
        assert_eq!(
            config.database_path(),
            PathBuf::from("/tmp/delivery/database/orders.redb")
        );
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        let mut config = Config::with_work_dir("/tmp/delivery");
        config.business_timezone = "Mars/Olympus".into();
        assert!(matches!(config.validate(), Err(ServerError::Config(_))));
    }

    #[test]
    fn test_production_requires_real_secret() {
        let mut config = Config::with_work_dir("/tmp/delivery");
        config.environment = "production".into();
        assert!(config.validate().is_err());

        config.jwt.secret = "short".into();
        assert!(config.validate().is_err());

        config.jwt.secret = "x".repeat(MIN_SECRET_LEN);
        assert!(config.validate().is_ok());
    }
}
