//! Application error types
//!
//! Errors surfaced outside an individual request: startup, wiring, shutdown.

use parley_core::DomainError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid token")]
    InvalidToken,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

/// Result type alias using `AppError`
pub type AppResult<T> = Result<T, AppError>;

impl From<crate::config::ConfigError> for AppError {
    fn from(e: crate::config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_converts() {
        let err: AppError = DomainError::NotServerOwner.into();
        assert!(matches!(err, AppError::Domain(_)));
    }
}
