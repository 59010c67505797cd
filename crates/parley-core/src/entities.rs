//! Read-model entities returned by the store ports
//!
//! These are plain data rows; all invariants are enforced by the stores and
//! the gateway handlers, not here.

use crate::value_objects::Snowflake;
use serde::{Deserialize, Serialize};

/// A persisted chat message as returned by history queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    #[serde(rename = "MessageID")]
    pub id: Snowflake,
    #[serde(rename = "ChannelID")]
    pub channel_id: Snowflake,
    #[serde(rename = "UserID")]
    pub user_id: Snowflake,
    #[serde(rename = "Message")]
    pub text: String,
    #[serde(rename = "Attachments", default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
}

/// A channel row within a server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSummary {
    #[serde(rename = "ChannelID")]
    pub id: Snowflake,
    #[serde(rename = "ServerID")]
    pub server_id: Snowflake,
    #[serde(rename = "Name")]
    pub name: String,
}

/// A server row as listed for a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSummary {
    #[serde(rename = "ServerID")]
    pub id: Snowflake,
    #[serde(rename = "OwnerID")]
    pub owner_id: Snowflake,
    #[serde(rename = "Name")]
    pub name: String,
}

/// User profile data sent on initial load and on updates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "UserID")]
    pub id: Snowflake,
    #[serde(rename = "DisplayName")]
    pub display_name: String,
    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Generate a random alphanumeric invite code
pub fn generate_invite_code() -> String {
    use rand::Rng;

    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    const CODE_LEN: usize = 8;

    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}
