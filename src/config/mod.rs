//! Configuration management for the car inventory server
//!
//! Configuration is loaded once at startup from environment variables (and an
//! optional `.env` file) into an explicit [`Config`] value that is handed to
//! every component that needs it.

use std::env;
use thiserror::Error;

/// Signing secret used when none is configured. Refused in production.
pub const DEVELOPMENT_JWT_SECRET: &str = "development-secret-change-in-production";

/// Upper bound for token and challenge lifetimes (one year)
pub const MAX_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid environment value: {0}")]
    InvalidValue(String),

    #[error("Invalid port number: {0}")]
    InvalidPort(String),
}

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Parse environment from string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid environment: '{}'. Expected: dev, staging, or prod",
                s
            ))),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

/// Where challenges, accounts and cars are persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL via a connection pool
    Postgres { database_url: String },
    /// Process-local maps; state is lost on restart
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Postgres { .. } => "postgres",
            StorageBackend::Memory => "memory",
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Current environment
    pub environment: Environment,

    /// Server port
    pub port: u16,

    /// Storage backend selection
    pub storage: StorageBackend,

    /// Maximum database connections
    pub db_max_connections: u32,

    /// Secret used to sign and verify bearer tokens
    pub jwt_secret: String,

    /// Bearer token lifetime in seconds (default: 3600)
    pub jwt_ttl_seconds: i64,

    /// Lifetime of an issued challenge in seconds (default: 300)
    pub challenge_ttl_seconds: i64,

    /// bcrypt work factor for password hashing
    pub bcrypt_cost: u32,

    /// Rate limit for authentication endpoints: requests per second per client
    pub rate_limit_auth_rps: u32,

    /// CORS allowed origins (comma separated)
    pub cors_allowed_origins: Option<String>,

    /// Log level (RUST_LOG)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .map(|s| Environment::parse(&s))
            .unwrap_or(Ok(Environment::Development))?;

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort("PORT must be a valid number".to_string()))?;

        let database_url = first_var(&["DATABASE_URL", "DB_CONNECTION"]);
        let storage = match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "postgres" | "postgresql" => StorageBackend::Postgres {
                database_url: database_url
                    .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?,
            },
            "memory" | "inmem" => StorageBackend::Memory,
            other => {
                return Err(ConfigError::InvalidValue(format!(
                    "Invalid STORAGE_BACKEND: '{}'. Expected: postgres or memory",
                    other
                )))
            }
        };

        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", 5u32)?;

        let jwt_secret = first_var(&["JWT_SECRET_KEY", "JWT_SECRET"])
            .unwrap_or_else(|| DEVELOPMENT_JWT_SECRET.to_string());
        if environment.is_production() && jwt_secret == DEVELOPMENT_JWT_SECRET {
            return Err(ConfigError::MissingEnvVar("JWT_SECRET_KEY".to_string()));
        }

        let jwt_ttl_seconds = check_ttl("JWT_TTL_SECONDS", parse_or("JWT_TTL_SECONDS", 3600i64)?)?;
        let challenge_ttl_seconds = check_ttl(
            "CHALLENGE_TTL_SECONDS",
            parse_or("CHALLENGE_TTL_SECONDS", 300i64)?,
        )?;
        let bcrypt_cost = parse_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidValue(format!(
                "BCRYPT_COST must be between 4 and 31, got {}",
                bcrypt_cost
            )));
        }

        let rate_limit_auth_rps = parse_or("RATE_LIMIT_AUTH_RPS", 10u32)?;
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS").ok();
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Config {
            environment,
            port,
            storage,
            db_max_connections,
            jwt_secret,
            jwt_ttl_seconds,
            challenge_ttl_seconds,
            bcrypt_cost,
            rate_limit_auth_rps,
            cors_allowed_origins,
            log_level,
        })
    }

    /// Configuration for tests and local experiments: in-memory storage and
    /// the cheapest bcrypt cost.
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Config {
            environment: Environment::Development,
            port: 0,
            storage: StorageBackend::Memory,
            db_max_connections: 1,
            jwt_secret: jwt_secret.into(),
            jwt_ttl_seconds: 3600,
            challenge_ttl_seconds: 300,
            bcrypt_cost: 4,
            rate_limit_auth_rps: 1000,
            cors_allowed_origins: None,
            log_level: "debug".to_string(),
        }
    }

    /// Database URL with the password masked, for logging
    pub fn database_url_masked(&self) -> Option<String> {
        let StorageBackend::Postgres { database_url } = &self.storage else {
            return None;
        };

        if let Some(at_pos) = database_url.find('@') {
            if let Some(colon_pos) = database_url[..at_pos].rfind(':') {
                let prefix = &database_url[..colon_pos + 1];
                let suffix = &database_url[at_pos..];
                return Some(format!("{}****{}", prefix, suffix));
            }
        }
        Some(database_url.clone())
    }
}

fn first_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| env::var(name).ok().filter(|v| !v.trim().is_empty()))
}

/// Parse `name` when set; an unset or blank variable yields `default`
fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    parse_value(name, env::var(name).ok(), default)
}

fn parse_value<T: std::str::FromStr>(
    name: &str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse::<T>().map_err(|_| {
            ConfigError::InvalidValue(format!("{} must be a number, got '{}'", name, value))
        }),
    }
}

/// Lifetimes must be positive and representable as a `chrono::Duration`
fn check_ttl(name: &str, seconds: i64) -> Result<i64, ConfigError> {
    if !(1..=MAX_TTL_SECONDS).contains(&seconds) {
        return Err(ConfigError::InvalidValue(format!(
            "{} must be between 1 and {}, got {}",
            name, MAX_TTL_SECONDS, seconds
        )));
    }
    Ok(seconds)
}
