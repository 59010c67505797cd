//! Auth port - consumed once at connection-upgrade time

use async_trait::async_trait;

use crate::value_objects::Snowflake;

/// Validates the credentials presented at WebSocket upgrade.
///
/// The gateway calls this exactly once per connection; frames are never
/// re-authenticated.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolve a session token to a user ID, or `None` if unauthenticated
    async fn validate_session(&self, token: &str) -> Option<Snowflake>;
}
