use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub http_port: u16,
    pub database: DatabaseConfig,
    pub token: TokenConfig,
    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// DSN for the relational store; DB_DSN with DATABASE_URL fallback
    pub dsn: Option<String>,
    pub max_open_conns: u32,
    pub max_idle_conns: u32,
    pub conn_max_idle_ms: u64,
    pub conn_max_life_ms: u64,
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

impl AppConfig {
    /// Load configuration from the environment, applying defaults.
    /// In prod a database DSN and a token secret are mandatory.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("prod") | Ok("production") => Environment::Prod,
            Ok("staging") => Environment::Staging,
            _ => Environment::Dev,
        };

        let http_port = parse_var("HTTP_PORT", 8080)?;

        let dsn = env::var("DB_DSN")
            .ok()
            .or_else(|| env::var("DATABASE_URL").ok())
            .filter(|s| !s.is_empty());

        let database = DatabaseConfig {
            dsn,
            max_open_conns: parse_var("DB_MAX_OPEN_CONNS", 20)?,
            max_idle_conns: parse_var("DB_MAX_IDLE_CONNS", 10)?,
            conn_max_idle_ms: parse_var("DB_CONN_MAX_IDLE_MS", 60_000)?,
            conn_max_life_ms: parse_var("DB_CONN_MAX_LIFE_MS", 300_000)?,
        };

        // Issuer, audience and TTL may default in dev; prod must set them
        let ttl_minutes = match env::var("TOKEN_TTL_MINUTES") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "TOKEN_TTL_MINUTES",
                value: raw,
            })?,
            Err(_) if environment == Environment::Prod => {
                return Err(ConfigError::Missing("TOKEN_TTL_MINUTES"))
            }
            Err(_) => 60,
        };

        let token = TokenConfig {
            secret: env::var("TOKEN_SECRET").unwrap_or_default(),
            issuer: var_required_in_prod("TOKEN_ISSUER", "phyto-api", environment)?,
            audience: var_required_in_prod("TOKEN_AUDIENCE", "phyto-api", environment)?,
            ttl_minutes,
        };

        let log_level = match env::var("LOG_LEVEL").as_deref() {
            Ok(level @ ("debug" | "info" | "warn" | "error")) => level.to_string(),
            Ok(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_LEVEL",
                    value: other.to_string(),
                })
            }
            Err(_) => "info".to_string(),
        };

        let config = Self {
            environment,
            http_port,
            database,
            token,
            log_level,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.token.ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                name: "TOKEN_TTL_MINUTES",
                value: self.token.ttl_minutes.to_string(),
            });
        }
        if self.environment == Environment::Prod {
            if self.database.dsn.is_none() {
                return Err(ConfigError::Missing("DB_DSN"));
            }
            if self.token.secret.is_empty() {
                return Err(ConfigError::Missing("TOKEN_SECRET"));
            }
        }
        Ok(())
    }

    pub fn is_prod(&self) -> bool {
        self.environment == Environment::Prod
    }
}

fn parse_var<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

fn var_required_in_prod(
    name: &'static str,
    default: &str,
    environment: Environment,
) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ if environment == Environment::Prod => Err(ConfigError::Missing(name)),
        _ => Ok(default.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var tests mutate process state; keep them in one test to avoid races.
    #[test]
    fn defaults_and_prod_validation() {
        for key in [
            "APP_ENV",
            "HTTP_PORT",
            "DB_DSN",
            "DATABASE_URL",
            "LOG_LEVEL",
            "TOKEN_SECRET",
            "TOKEN_ISSUER",
            "TOKEN_AUDIENCE",
            "TOKEN_TTL_MINUTES",
        ] {
            std::env::remove_var(key);
        }

        let config = AppConfig::from_env().expect("dev config");
        assert_eq!(config.environment, Environment::Dev);
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.database.max_open_conns, 20);
        assert_eq!(config.database.max_idle_conns, 10);
        assert_eq!(config.database.conn_max_idle_ms, 60_000);
        assert_eq!(config.database.conn_max_life_ms, 300_000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.token.ttl_minutes, 60);

        // prod without a DSN must refuse to start
        std::env::set_var("APP_ENV", "prod");
        assert!(AppConfig::from_env().is_err());

        // secret alone is not enough: issuer, audience and TTL are also
        // required in prod and must not fall back to dev defaults
        std::env::set_var("DB_DSN", "postgres://localhost/phyto");
        std::env::set_var("TOKEN_SECRET", "secret");
        assert!(AppConfig::from_env().is_err());

        std::env::set_var("TOKEN_ISSUER", "phyto-api");
        std::env::set_var("TOKEN_AUDIENCE", "phyto-api");
        std::env::set_var("TOKEN_TTL_MINUTES", "60");
        assert!(AppConfig::from_env().is_ok());

        // a TTL that mints already-expired tokens is refused everywhere
        std::env::set_var("TOKEN_TTL_MINUTES", "0");
        assert!(AppConfig::from_env().is_err());

        for key in [
            "APP_ENV",
            "DB_DSN",
            "TOKEN_SECRET",
            "TOKEN_ISSUER",
            "TOKEN_AUDIENCE",
            "TOKEN_TTL_MINUTES",
        ] {
            std::env::remove_var(key);
        }
    }
}
