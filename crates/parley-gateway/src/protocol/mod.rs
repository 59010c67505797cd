//! Wire protocol definitions
//!
//! Defines the binary frame format, request/reply type codes, and payload
//! shapes.

pub mod frame;
mod payloads;
mod type_codes;

pub use frame::{FrameError, HEADER_LEN, MAX_FRAME_LEN};
pub use payloads::{
    AddChannelRequest, AddFriendRequest, AddServerRequest, BlockUserRequest, ChannelListReply,
    ChannelListRequest, ChatHistoryReply, ChatHistoryRequest, ChatMessageRequest,
    DeleteChatMessageBroadcast, DeleteChatMessageRequest, DeleteServerRequest,
    DeleteServerBroadcast, InitialUserDataReply, InitialUserDataRequest, RejectPayload,
    RelationshipUpdate, ServerInviteReply, ServerInviteRequest, ServerListReply,
    ServerListRequest, ServerMemberListReply, ServerMemberListRequest, UnfriendRequest,
    UpdateUserDataRequest,
};
pub use type_codes::TypeCode;
