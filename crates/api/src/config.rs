//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `JWT_SECRET` - Token signing secret (min 32 bytes)
//!
//! ## Optional
//! - `TOKEN_TTL_SECS` - Token lifetime in seconds, at most one year (default: 259200, three days)
//! - `BIND_ADDR` - Listen address (default: 0.0.0.0:8080)
//! - `PASSWORD_HASH_MEMORY_KIB` / `PASSWORD_HASH_ITERATIONS` / `PASSWORD_HASH_PARALLELISM` -
//!   Argon2 work factor (default: argon2 defaults)
//! - `LOG_FORMAT` - `json` or `pretty` (default: json)
//! - `RUST_LOG` - Tracing filter (default: info)
//!
//! ## Optional (bootstrap admin, both or neither)
//! - `BOOTSTRAP_ADMIN_EMAIL`
//! - `BOOTSTRAP_ADMIN_PASSWORD`

use std::net::SocketAddr;
use std::str::FromStr;

use chrono::Duration;
use secrecy::SecretString;
use thiserror::Error;

use shopgate_auth::{HashingCost, SigningKey, token_ttl};
use shopgate_observability::{LogFormat, TracingConfig};

const DEFAULT_TOKEN_TTL_SECS: i64 = 3 * 24 * 60 * 60;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Admin credential seeded at startup.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub jwt_secret: SecretString,
    pub token_ttl: Duration,
    pub bind_addr: SocketAddr,
    pub hashing_cost: HashingCost,
    pub tracing: TracingConfig,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl ApiConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or any value is
    /// out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;
        SigningKey::new(jwt_secret.clone())
            .map_err(|e| ConfigError::InsecureSecret("JWT_SECRET".to_string(), e.to_string()))?;

        let ttl_secs: i64 = parse_or(&lookup, "TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)?;
        let ttl = token_ttl(ttl_secs)
            .map_err(|e| ConfigError::InvalidEnvVar("TOKEN_TTL_SECS".to_string(), e.to_string()))?;

        let bind_addr = match lookup("BIND_ADDR") {
            Some(raw) => parse_value("BIND_ADDR", &raw)?,
            None => parse_value("BIND_ADDR", DEFAULT_BIND_ADDR)?,
        };

        let defaults = HashingCost::default();
        let hashing_cost = HashingCost {
            memory_kib: parse_or(&lookup, "PASSWORD_HASH_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&lookup, "PASSWORD_HASH_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&lookup, "PASSWORD_HASH_PARALLELISM", defaults.parallelism)?,
        };

        let format = match lookup("LOG_FORMAT") {
            Some(raw) => LogFormat::from_str(&raw)
                .map_err(|e| ConfigError::InvalidEnvVar("LOG_FORMAT".to_string(), e.to_string()))?,
            None => LogFormat::default(),
        };

        let bootstrap_admin = match (
            lookup("BOOTSTRAP_ADMIN_EMAIL"),
            lookup("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                email,
                password: SecretString::from(password),
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::InvalidEnvVar(
                    "BOOTSTRAP_ADMIN_*".to_string(),
                    "Both BOOTSTRAP_ADMIN_EMAIL and BOOTSTRAP_ADMIN_PASSWORD must be set together"
                        .to_string(),
                ));
            }
        };

        Ok(Self {
            jwt_secret,
            token_ttl: ttl,
            bind_addr,
            hashing_cost,
            tracing: TracingConfig {
                format,
                ..TracingConfig::default()
            },
            bootstrap_admin,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
