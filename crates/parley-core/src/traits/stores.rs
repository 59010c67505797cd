//! Store ports - narrow persistence capabilities consumed by the gateway
//!
//! One capability trait per persisted entity kind, selected statically by the
//! calling handler. The gateway treats every store failure as a
//! request-scoped error; nothing here may take down the connection layer.

use async_trait::async_trait;

use crate::entities::{ChannelSummary, ServerSummary, StoredMessage, UserProfile};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for store operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Message Store
// ============================================================================

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a new message under a pre-generated ID
    async fn insert_message(
        &self,
        id: Snowflake,
        channel_id: Snowflake,
        user_id: Snowflake,
        text: &str,
        attachments: &[String],
    ) -> RepoResult<()>;

    /// Delete a message if `requester` authored it.
    ///
    /// Returns the channel the message belonged to, or `Snowflake::new(0)`
    /// when the message does not exist or the requester is not its author.
    async fn delete_message(&self, id: Snowflake, requester: Snowflake) -> RepoResult<Snowflake>;

    /// Fetch the most recent messages of a channel, oldest first
    async fn message_history(
        &self,
        channel_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<StoredMessage>>;
}

// ============================================================================
// Server Store
// ============================================================================

#[async_trait]
pub trait ServerStore: Send + Sync {
    /// Create a server owned by `owner_id` under a pre-generated ID
    async fn insert_server(
        &self,
        id: Snowflake,
        owner_id: Snowflake,
        name: &str,
    ) -> RepoResult<()>;

    /// Delete a server and its channels/messages
    async fn delete_server(&self, id: Snowflake) -> RepoResult<()>;

    /// List all servers a user is a member of
    async fn server_list(&self, user_id: Snowflake) -> RepoResult<Vec<ServerSummary>>;

    /// Check whether a user is a member of a server
    async fn confirm_membership(&self, user_id: Snowflake, server_id: Snowflake)
        -> RepoResult<bool>;

    /// Get the owner of a server
    async fn server_owner(&self, server_id: Snowflake) -> RepoResult<Snowflake>;

    /// List the user IDs of all members of a server
    async fn member_list(&self, server_id: Snowflake) -> RepoResult<Vec<Snowflake>>;

    /// Persist an invite for a server under a pre-generated ID
    async fn insert_invite(
        &self,
        id: Snowflake,
        server_id: Snowflake,
        code: &str,
    ) -> RepoResult<()>;
}

// ============================================================================
// Channel Store
// ============================================================================

#[async_trait]
pub trait ChannelStore: Send + Sync {
    /// Create a channel in a server under a pre-generated ID
    async fn insert_channel(
        &self,
        id: Snowflake,
        server_id: Snowflake,
        name: &str,
    ) -> RepoResult<()>;

    /// List all channels of a server
    async fn channel_list(&self, server_id: Snowflake) -> RepoResult<Vec<ChannelSummary>>;

    /// Resolve the server a channel belongs to
    async fn server_of_channel(&self, channel_id: Snowflake) -> RepoResult<Snowflake>;
}

// ============================================================================
// Relationship Store
// ============================================================================

#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// Record a friendship between two users
    async fn insert_friendship(&self, user_id: Snowflake, friend_id: Snowflake) -> RepoResult<()>;

    /// Remove a friendship between two users
    async fn delete_friendship(&self, user_id: Snowflake, friend_id: Snowflake) -> RepoResult<()>;

    /// Record a block; also severs any existing friendship
    async fn insert_block(&self, user_id: Snowflake, blocked_id: Snowflake) -> RepoResult<()>;

    /// List a user's friends
    async fn friend_list(&self, user_id: Snowflake) -> RepoResult<Vec<UserProfile>>;
}

// ============================================================================
// User Store
// ============================================================================

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch a user's profile
    async fn profile(&self, user_id: Snowflake) -> RepoResult<UserProfile>;

    /// Update display name and/or status; `None` leaves the field unchanged
    async fn update_profile(
        &self,
        user_id: Snowflake,
        display_name: Option<&str>,
        status: Option<&str>,
    ) -> RepoResult<()>;
}
