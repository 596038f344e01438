//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use chrono::Duration;
use site_core::TypingDelay;
use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub allowed_origin: String,
    pub contact_email: String,
    pub session_ttl: Duration,
    pub typing_delay: TypingDelay,
    /// Chats with no activity for this long are closed by the sweeper.
    pub chat_idle_timeout: std::time::Duration,
    /// Seeded into `admin_users` at startup when both are set.
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let allowed_origin = std::env::var("ALLOWED_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());
        let contact_email = std::env::var("CONTACT_EMAIL")
            .unwrap_or_else(|_| "snehasama7@gmail.com".to_string());

        // --- Load Session and Chat Settings ---
        let session_ttl = Duration::hours(parse_number("SESSION_TTL_HOURS", 24)? as i64);
        let typing_delay = TypingDelay {
            base: std::time::Duration::from_millis(parse_number("CHAT_TYPING_DELAY_MS", 1000)?),
            jitter: std::time::Duration::from_millis(parse_number("CHAT_TYPING_JITTER_MS", 1000)?),
            option: std::time::Duration::from_millis(parse_number("CHAT_OPTION_DELAY_MS", 800)?),
        };
        let chat_idle_timeout =
            std::time::Duration::from_secs(parse_number("CHAT_IDLE_TIMEOUT_SECS", 1800)?);

        let admin_username = std::env::var("ADMIN_USERNAME").ok();
        let admin_password = std::env::var("ADMIN_PASSWORD").ok();

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            allowed_origin,
            contact_email,
            session_ttl,
            typing_delay,
            chat_idle_timeout,
            admin_username,
            admin_password,
        })
    }

    /// A configuration for in-process use (tests, tooling) that never touches
    /// the environment. Chat replies are immediate.
    pub fn local() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 3000)),
            database_url: String::new(),
            log_level: Level::INFO,
            allowed_origin: "http://localhost:5173".to_string(),
            contact_email: "snehasama7@gmail.com".to_string(),
            session_ttl: site_core::session::default_ttl(),
            typing_delay: TypingDelay::NONE,
            chat_idle_timeout: std::time::Duration::from_secs(1800),
            admin_username: None,
            admin_password: None,
        }
    }
}

fn parse_number(var: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue(var.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
