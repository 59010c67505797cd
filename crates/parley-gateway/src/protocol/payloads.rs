//! Request and reply payload shapes
//!
//! Wire field names are PascalCase with `ID` suffixes, matching what clients
//! send. Mutating requests carry `Validate` rules; broadcast payloads reuse
//! the read-model entities from `parley-core` where the shapes coincide.

use parley_core::entities::{ChannelSummary, ServerSummary, StoredMessage, UserProfile};
use parley_core::Snowflake;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Uniform failure reply (type 0)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectPayload {
    #[serde(rename = "Reason")]
    pub reason: String,
}

impl RejectPayload {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Post a chat message (type 1)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChatMessageRequest {
    #[serde(rename = "ChannelID")]
    pub channel_id: Snowflake,

    #[serde(rename = "Message")]
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub message: String,

    #[serde(rename = "Attachments", default)]
    pub attachments: Vec<String>,
}

/// Fetch channel history (type 2)
#[derive(Debug, Clone, Deserialize)]
pub struct ChatHistoryRequest {
    #[serde(rename = "ChannelID")]
    pub channel_id: Snowflake,
}

/// History reply (type 2)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHistoryReply {
    #[serde(rename = "ChannelID")]
    pub channel_id: Snowflake,
    #[serde(rename = "Messages")]
    pub messages: Vec<StoredMessage>,
}

/// Delete an own message (type 3)
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteChatMessageRequest {
    #[serde(rename = "MessageID")]
    pub message_id: Snowflake,
}

/// Message-deleted broadcast (type 3)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteChatMessageBroadcast {
    #[serde(rename = "MessageID")]
    pub message_id: Snowflake,
    #[serde(rename = "ChannelID")]
    pub channel_id: Snowflake,
}

// ============================================================================
// Servers
// ============================================================================

/// Create a server (type 21)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddServerRequest {
    #[serde(rename = "Name")]
    #[validate(length(min = 1, max = 100, message = "Server name must be 1-100 characters"))]
    pub name: String,
}

/// List the requesting user's servers (type 22)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerListRequest {}

/// Server list reply (type 22)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerListReply {
    #[serde(rename = "Servers")]
    pub servers: Vec<ServerSummary>,
}

/// Delete an owned server (type 23)
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteServerRequest {
    #[serde(rename = "ServerID")]
    pub server_id: Snowflake,
}

/// Server-deleted broadcast (type 23)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteServerBroadcast {
    #[serde(rename = "ServerID")]
    pub server_id: Snowflake,
}

/// Create an invite (type 24)
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInviteRequest {
    #[serde(rename = "ServerID")]
    pub server_id: Snowflake,
}

/// Invite reply (type 24)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInviteReply {
    #[serde(rename = "InviteID")]
    pub invite_id: Snowflake,
    #[serde(rename = "ServerID")]
    pub server_id: Snowflake,
    #[serde(rename = "Code")]
    pub code: String,
}

/// List server members (type 25)
#[derive(Debug, Clone, Deserialize)]
pub struct ServerMemberListRequest {
    #[serde(rename = "ServerID")]
    pub server_id: Snowflake,
}

/// Member list reply (type 25)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerMemberListReply {
    #[serde(rename = "ServerID")]
    pub server_id: Snowflake,
    #[serde(rename = "Members")]
    pub members: Vec<Snowflake>,
}

// ============================================================================
// Channels
// ============================================================================

/// Create a channel (type 31)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddChannelRequest {
    #[serde(rename = "ServerID")]
    pub server_id: Snowflake,

    #[serde(rename = "Name")]
    #[validate(length(min = 1, max = 100, message = "Channel name must be 1-100 characters"))]
    pub name: String,
}

/// List channels of a server (type 32)
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelListRequest {
    #[serde(rename = "ServerID")]
    pub server_id: Snowflake,
}

/// Channel list reply (type 32)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelListReply {
    #[serde(rename = "ServerID")]
    pub server_id: Snowflake,
    #[serde(rename = "Channels")]
    pub channels: Vec<ChannelSummary>,
}

// ============================================================================
// Relationships
// ============================================================================

/// Add a friend (type 51)
#[derive(Debug, Clone, Deserialize)]
pub struct AddFriendRequest {
    #[serde(rename = "UserID")]
    pub user_id: Snowflake,
}

/// Block a user (type 52)
#[derive(Debug, Clone, Deserialize)]
pub struct BlockUserRequest {
    #[serde(rename = "UserID")]
    pub user_id: Snowflake,
}

/// Remove a friend (type 53)
#[derive(Debug, Clone, Deserialize)]
pub struct UnfriendRequest {
    #[serde(rename = "UserID")]
    pub user_id: Snowflake,
}

/// Relationship-changed broadcast (types 51/52/53)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipUpdate {
    #[serde(rename = "UserID")]
    pub user_id: Snowflake,
    #[serde(rename = "OtherID")]
    pub other_id: Snowflake,
}

// ============================================================================
// User data
// ============================================================================

/// Initial data request (type 61); the payload may be empty
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitialUserDataRequest {}

/// Initial data reply (type 61)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialUserDataReply {
    #[serde(rename = "User")]
    pub user: UserProfile,
    #[serde(rename = "Servers")]
    pub servers: Vec<ServerSummary>,
    #[serde(rename = "Friends")]
    pub friends: Vec<UserProfile>,
}

/// Update display name / status (type 62); broadcast payload is the fresh
/// `UserProfile`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUserDataRequest {
    #[serde(rename = "DisplayName", default)]
    #[validate(length(min = 1, max = 64, message = "Display name must be 1-64 characters"))]
    pub display_name: Option<String>,

    #[serde(rename = "Status", default)]
    #[validate(length(max = 128, message = "Status must be at most 128 characters"))]
    pub status: Option<String>,
}
