//! Process configuration read from the environment.

use rolegate_auth::DEFAULT_FAN_OUT_THRESHOLD;
use rolegate_observability::LogFormat;

pub const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// `None` runs against the in-memory demo directory.
    pub database_url: Option<String>,
    pub fan_out_threshold: usize,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map instead of the
    /// process environment).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("ROLEGATE_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = match lookup("ROLEGATE_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                var: "ROLEGATE_PORT",
                expected: "a port number",
                value: raw,
            })?,
            None => 8080,
        };

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string());

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let fan_out_threshold = match lookup("ROLEGATE_FAN_OUT_THRESHOLD") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| ConfigError::Invalid {
                var: "ROLEGATE_FAN_OUT_THRESHOLD",
                expected: "a non-negative integer",
                value: raw,
            })?,
            None => DEFAULT_FAN_OUT_THRESHOLD,
        };

        let log_format = match lookup("ROLEGATE_LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().map_err(|_| ConfigError::Invalid {
                var: "ROLEGATE_LOG_FORMAT",
                expected: "`json` or `pretty`",
                value: raw,
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            host,
            port,
            jwt_secret,
            database_url,
            fan_out_threshold,
            log_format,
        })
    }

    /// True when no `JWT_SECRET` was provided.
    pub fn uses_dev_jwt_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
