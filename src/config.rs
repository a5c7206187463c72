use chrono::Duration;
use thiserror::Error;

/// Lifetime of every issued token.
pub const TOKEN_TTL_HOURS: i64 = 24;

const DEFAULT_PORT: &str = "3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

pub struct Config {
    /// Postgres connection string. When absent the server keeps its data in memory.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub listen_addr: String,
    /// Comma-separated allowed CORS origins. If empty or "*", allows all origins (dev mode).
    pub cors_origins: String,
    pub auth: AuthConfig,
}

/// Token signing material. Loaded once at startup and read-only afterwards.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl: Duration::hours(TOKEN_TTL_HOURS),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            var(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let jwt_secret = non_empty("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let listen_addr = non_empty("LISTEN_ADDR").unwrap_or_else(|| {
            format!(
                "0.0.0.0:{}",
                non_empty("PORT").unwrap_or_else(|| DEFAULT_PORT.to_string())
            )
        });

        let db_max_connections = match non_empty("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid {
                    key: "DB_MAX_CONNECTIONS",
                    value: raw,
                })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            db_max_connections,
            listen_addr,
            cors_origins: non_empty("CORS_ORIGINS").unwrap_or_else(|| "*".to_string()),
            auth: AuthConfig::new(jwt_secret),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn jwt_secret_is_required() {
        assert_eq!(load(&[]).err(), Some(ConfigError::Missing("JWT_SECRET")));
        assert_eq!(
            load(&[("JWT_SECRET", "   ")]).err(),
            Some(ConfigError::Missing("JWT_SECRET"))
        );
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:3000");
        assert_eq!(config.cors_origins, "*");
        assert_eq!(config.db_max_connections, 10);
        assert!(config.database_url.is_none());
        assert_eq!(config.auth.token_ttl, Duration::hours(TOKEN_TTL_HOURS));
    }

    #[test]
    fn port_is_used_when_listen_addr_is_absent() {
        let config = load(&[("JWT_SECRET", "s"), ("PORT", "8080")]).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");

        let config = load(&[
            ("JWT_SECRET", "s"),
            ("PORT", "8080"),
            ("LISTEN_ADDR", "127.0.0.1:9000"),
        ])
        .unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
    }

    #[test]
    fn bad_pool_size_is_rejected() {
        let err = load(&[("JWT_SECRET", "s"), ("DB_MAX_CONNECTIONS", "zero")]).err();
        assert!(matches!(
            err,
            Some(ConfigError::Invalid { key: "DB_MAX_CONNECTIONS", .. })
        ));
    }

    #[test]
    fn debug_output_hides_secret() {
        let auth = AuthConfig::new("very-secret-value");
        assert!(!format!("{:?}", auth).contains("very-secret-value"));
    }
}
