//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{Snowflake, SnowflakeError};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Server not found: {0}")]
    ServerNotFound(Snowflake),

    #[error("Channel not found: {0}")]
    ChannelNotFound(Snowflake),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not a member of server {0}")]
    NotServerMember(Snowflake),

    #[error("Not the server owner")]
    NotServerOwner,

    #[error("Not the message author")]
    NotMessageAuthor,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Already friends with this user")]
    AlreadyFriends,

    #[error("User is blocked")]
    UserBlocked,

    // =========================================================================
    // Infrastructure Errors
    // =========================================================================
    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    IdGeneration(#[from] SnowflakeError),
}

impl DomainError {
    /// Check if this is a not-found error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::ServerNotFound(_)
                | Self::ChannelNotFound(_)
                | Self::MessageNotFound(_)
        )
    }

    /// Check if this is an authorization error
    #[must_use]
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::NotServerMember(_) | Self::NotServerOwner | Self::NotMessageAuthor
        )
    }

    /// Check if this is a validation error
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_) | Self::ContentTooLong { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(DomainError::UserNotFound(Snowflake::new(1)).is_not_found());
        assert!(DomainError::NotServerOwner.is_authorization());
        assert!(DomainError::ValidationError("bad".into()).is_validation());
        assert!(!DomainError::Storage("db down".into()).is_not_found());
    }

    #[test]
    fn test_snowflake_error_converts() {
        let err: DomainError = SnowflakeError::SequenceExhausted.into();
        assert!(matches!(err, DomainError::IdGeneration(_)));
    }
}
