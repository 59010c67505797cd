//! Chat message handlers

use super::{parse, parse_validated, HandlerError, Outcome};
use crate::broadcast::BroadcastIntent;
use crate::connection::Session;
use crate::protocol::{
    frame, ChatHistoryReply, ChatHistoryRequest, ChatMessageRequest, DeleteChatMessageBroadcast,
    DeleteChatMessageRequest, TypeCode,
};
use crate::server::GatewayState;
use parley_core::entities::StoredMessage;
use parley_core::Snowflake;

/// Most recent messages returned per history request
const HISTORY_LIMIT: i64 = 50;

/// Post a message to a channel. The sender receives no direct reply; their
/// copy arrives through the channel broadcast like everyone else's.
pub(super) async fn chat_message(
    state: &GatewayState,
    session: &Session,
    payload: &[u8],
) -> Result<Outcome, HandlerError> {
    let req: ChatMessageRequest = parse_validated("ChatMessage", payload)?;

    let server_id = state
        .stores()
        .channels
        .server_of_channel(req.channel_id)
        .await?;
    if !state
        .stores()
        .servers
        .confirm_membership(session.user_id(), server_id)
        .await?
    {
        return Err(HandlerError::Unauthorized);
    }

    let id = state.ids().generate()?;
    state
        .stores()
        .messages
        .insert_message(
            id,
            req.channel_id,
            session.user_id(),
            &req.message,
            &req.attachments,
        )
        .await?;

    let stored = StoredMessage {
        id,
        channel_id: req.channel_id,
        user_id: session.user_id(),
        text: req.message,
        attachments: req.attachments,
    };
    let frame = frame::encode_json(TypeCode::ChatMessage.as_u8(), &stored)?;

    Ok(Outcome::broadcast(BroadcastIntent::channel(
        TypeCode::ChatMessage,
        frame,
        req.channel_id,
    )))
}

/// Fetch recent history and mark the channel as the one being viewed
pub(super) async fn chat_history(
    state: &GatewayState,
    session: &Session,
    payload: &[u8],
) -> Result<Outcome, HandlerError> {
    let req: ChatHistoryRequest = parse("ChatHistory", payload)?;

    let server_id = state
        .stores()
        .channels
        .server_of_channel(req.channel_id)
        .await?;
    if !state
        .stores()
        .servers
        .confirm_membership(session.user_id(), server_id)
        .await?
    {
        return Err(HandlerError::Unauthorized);
    }

    let messages = state
        .stores()
        .messages
        .message_history(req.channel_id, HISTORY_LIMIT)
        .await?;

    // Opening history is what counts as "viewing" for broadcast routing.
    state
        .registry()
        .set_current_channel(session.id(), req.channel_id);

    let reply = frame::encode_json(
        TypeCode::ChatHistory.as_u8(),
        &ChatHistoryReply {
            channel_id: req.channel_id,
            messages,
        },
    )?;
    Ok(Outcome::reply(reply))
}

/// Delete an own message and announce the removal to the channel
pub(super) async fn delete_chat_message(
    state: &GatewayState,
    session: &Session,
    payload: &[u8],
) -> Result<Outcome, HandlerError> {
    let req: DeleteChatMessageRequest = parse("DeleteChatMessage", payload)?;

    let channel_id = state
        .stores()
        .messages
        .delete_message(req.message_id, session.user_id())
        .await?;
    // The store signals "missing or not yours" with channel 0; both cases
    // look identical to the client on purpose.
    if channel_id == Snowflake::new(0) {
        return Err(HandlerError::Unauthorized);
    }

    let frame = frame::encode_json(
        TypeCode::DeleteChatMessage.as_u8(),
        &DeleteChatMessageBroadcast {
            message_id: req.message_id,
            channel_id,
        },
    )?;
    Ok(Outcome::broadcast(BroadcastIntent::channel(
        TypeCode::DeleteChatMessage,
        frame,
        channel_id,
    )))
}
