//! services/api/src/error.rs
//!
//! Defines the primary error type for the API service and the mapping from
//! port errors to HTTP responses.

use crate::config::ConfigError;
use axum::http::StatusCode;
use site_core::ports::PortError;
use tracing::error;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The error half of every handler's return type.
pub type HttpError = (StatusCode, String);

/// Maps a failed store call to a response. Unexpected failures are logged and
/// answered with a generic "try again" message.
pub fn port_error(action: &str, e: PortError) -> HttpError {
    match e {
        PortError::NotFound(what) => (StatusCode::NOT_FOUND, what),
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        PortError::Unexpected(_) => {
            error!("Failed to {}: {:?}", action, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to {}. Please try again.", action),
            )
        }
    }
}
