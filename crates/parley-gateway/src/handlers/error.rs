//! Handler errors
//!
//! Every variant maps to a reject frame; handler failures never close the
//! connection. Internal detail (storage messages, ID generator state) stays
//! in the logs and out of the client-visible reason.

use crate::protocol::FrameError;
use parley_core::{DomainError, SnowflakeError};
use thiserror::Error;

/// Request handling errors
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("malformed {kind} payload: {source}")]
    Deserialize {
        kind: &'static str,
        #[source]
        source: FrameError,
    },

    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("not allowed")]
    Unauthorized,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    IdGeneration(#[from] SnowflakeError),

    #[error("reply encoding failed: {0}")]
    Encode(#[from] FrameError),
}

impl HandlerError {
    /// Client-safe reason for the reject frame
    #[must_use]
    pub fn reject_reason(&self) -> String {
        match self {
            Self::Deserialize { kind, .. } => format!("Malformed {kind} payload"),
            Self::Validation(_) => self.to_string(),
            Self::Unauthorized => "Not allowed".to_string(),
            Self::Domain(DomainError::Storage(_)) | Self::IdGeneration(_) | Self::Encode(_) => {
                "Internal error".to_string()
            }
            Self::Domain(DomainError::IdGeneration(_)) => "Internal error".to_string(),
            Self::Domain(err) => err.to_string(),
        }
    }

    /// Check whether this failure suggests a client probing beyond its rights
    #[must_use]
    pub fn is_suspicious(&self) -> bool {
        match self {
            Self::Unauthorized => true,
            Self::Domain(err) => err.is_authorization(),
            _ => false,
        }
    }
}
