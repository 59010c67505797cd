//! Request/reply type codes
//!
//! One byte per frame. Code 0 is reserved for the uniform reject reply; the
//! remaining codes form a dense subset grouped by feature area.

/// Frame type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeCode {
    /// Uniform failure reply `{"Reason": ...}` (server only)
    Reject = 0,

    // === Messages ===
    /// Post a chat message; echoed back as the broadcast
    ChatMessage = 1,
    /// Fetch recent history of a channel; marks it as the viewed channel
    ChatHistory = 2,
    /// Delete an own message
    DeleteChatMessage = 3,

    // === Servers ===
    /// Create a server
    AddServer = 21,
    /// List servers of the requesting user
    ServerList = 22,
    /// Delete an owned server
    DeleteServer = 23,
    /// Create an invite for a server
    ServerInvite = 24,
    /// List members of a server
    ServerMemberList = 25,

    // === Channels ===
    /// Create a channel in an owned server
    AddChannel = 31,
    /// List channels of a server; marks it as the viewed server
    ChannelList = 32,

    // === Relationships ===
    /// Add a friend
    AddFriend = 51,
    /// Block a user
    BlockUser = 52,
    /// Remove a friend
    Unfriend = 53,

    // === User data ===
    /// Initial profile/servers/friends snapshot
    InitialUserData = 61,
    /// Update display name or status
    UpdateUserData = 62,
}

impl TypeCode {
    /// Create a `TypeCode` from a raw byte
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Reject),
            1 => Some(Self::ChatMessage),
            2 => Some(Self::ChatHistory),
            3 => Some(Self::DeleteChatMessage),
            21 => Some(Self::AddServer),
            22 => Some(Self::ServerList),
            23 => Some(Self::DeleteServer),
            24 => Some(Self::ServerInvite),
            25 => Some(Self::ServerMemberList),
            31 => Some(Self::AddChannel),
            32 => Some(Self::ChannelList),
            51 => Some(Self::AddFriend),
            52 => Some(Self::BlockUser),
            53 => Some(Self::Unfriend),
            61 => Some(Self::InitialUserData),
            62 => Some(Self::UpdateUserData),
            _ => None,
        }
    }

    /// Get the raw byte value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Check if clients may send this code as a request
    #[must_use]
    pub const fn is_request(self) -> bool {
        !matches!(self, Self::Reject)
    }

    /// Get the name of this type code
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Reject => "Reject",
            Self::ChatMessage => "ChatMessage",
            Self::ChatHistory => "ChatHistory",
            Self::DeleteChatMessage => "DeleteChatMessage",
            Self::AddServer => "AddServer",
            Self::ServerList => "ServerList",
            Self::DeleteServer => "DeleteServer",
            Self::ServerInvite => "ServerInvite",
            Self::ServerMemberList => "ServerMemberList",
            Self::AddChannel => "AddChannel",
            Self::ChannelList => "ChannelList",
            Self::AddFriend => "AddFriend",
            Self::BlockUser => "BlockUser",
            Self::Unfriend => "Unfriend",
            Self::InitialUserData => "InitialUserData",
            Self::UpdateUserData => "UpdateUserData",
        }
    }
}

impl std::fmt::Display for TypeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u8())
    }
}
