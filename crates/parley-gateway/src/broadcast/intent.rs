//! Broadcast intents and audience scopes

use crate::connection::Session;
use crate::protocol::TypeCode;
use parley_core::Snowflake;

/// Which sessions a broadcast should reach.
///
/// Matching runs against the session cursors as they are at delivery time;
/// a client that navigated away between enqueue and delivery simply misses
/// the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Everyone currently viewing this channel
    Channel(Snowflake),

    /// Everyone currently viewing this server
    Server(Snowflake),

    /// Every session belonging to any of these users
    Users(Vec<Snowflake>),

    /// Every connected session
    Global,
}

impl Scope {
    /// Check whether a session falls inside this scope
    #[must_use]
    pub fn matches(&self, session: &Session) -> bool {
        match self {
            Self::Channel(channel_id) => session.current_channel() == *channel_id,
            Self::Server(server_id) => session.current_server() == *server_id,
            Self::Users(user_ids) => user_ids.contains(&session.user_id()),
            Self::Global => true,
        }
    }
}

/// A fully-encoded frame plus the audience it is destined for
#[derive(Debug, Clone)]
pub struct BroadcastIntent {
    /// Type code of the encoded frame, for logging
    pub type_code: TypeCode,

    /// Frame bytes, encoded once and shared across all recipients
    pub frame: Vec<u8>,

    /// Audience selector
    pub scope: Scope,
}

impl BroadcastIntent {
    /// Intent addressed to viewers of a channel
    #[must_use]
    pub fn channel(type_code: TypeCode, frame: Vec<u8>, channel_id: Snowflake) -> Self {
        Self {
            type_code,
            frame,
            scope: Scope::Channel(channel_id),
        }
    }

    /// Intent addressed to viewers of a server
    #[must_use]
    pub fn server(type_code: TypeCode, frame: Vec<u8>, server_id: Snowflake) -> Self {
        Self {
            type_code,
            frame,
            scope: Scope::Server(server_id),
        }
    }

    /// Intent addressed to specific users, on all their devices
    #[must_use]
    pub fn users(type_code: TypeCode, frame: Vec<u8>, user_ids: Vec<Snowflake>) -> Self {
        Self {
            type_code,
            frame,
            scope: Scope::Users(user_ids),
        }
    }

    /// Intent addressed to every connected session
    #[must_use]
    pub fn global(type_code: TypeCode, frame: Vec<u8>) -> Self {
        Self {
            type_code,
            frame,
            scope: Scope::Global,
        }
    }
}
