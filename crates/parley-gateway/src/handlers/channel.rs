//! Channel handlers

use super::{parse, parse_validated, HandlerError, Outcome};
use crate::broadcast::BroadcastIntent;
use crate::connection::{Session, NO_CHANNEL};
use crate::protocol::{frame, AddChannelRequest, ChannelListReply, ChannelListRequest, TypeCode};
use crate::server::GatewayState;
use parley_core::entities::ChannelSummary;
use parley_core::{DomainError, Snowflake};

/// Create a channel; owner-only, announced to everyone viewing the server
pub(super) async fn add_channel(
    state: &GatewayState,
    session: &Session,
    payload: &[u8],
) -> Result<Outcome, HandlerError> {
    let req: AddChannelRequest = parse_validated("AddChannel", payload)?;

    let owner = state.stores().servers.server_owner(req.server_id).await?;
    if owner == Snowflake::new(0) {
        return Err(DomainError::ServerNotFound(req.server_id).into());
    }
    if owner != session.user_id() {
        return Err(DomainError::NotServerOwner.into());
    }

    let id = state.ids().generate()?;
    state
        .stores()
        .channels
        .insert_channel(id, req.server_id, &req.name)
        .await?;

    let summary = ChannelSummary {
        id,
        server_id: req.server_id,
        name: req.name,
    };
    let frame = frame::encode_json(TypeCode::AddChannel.as_u8(), &summary)?;
    Ok(Outcome::broadcast(BroadcastIntent::server(
        TypeCode::AddChannel,
        frame,
        req.server_id,
    )))
}

/// List channels of a server; marks the server as the one being viewed and
/// resets the channel cursor until the client opens one
pub(super) async fn channel_list(
    state: &GatewayState,
    session: &Session,
    payload: &[u8],
) -> Result<Outcome, HandlerError> {
    let req: ChannelListRequest = parse("ChannelList", payload)?;

    if !state
        .stores()
        .servers
        .confirm_membership(session.user_id(), req.server_id)
        .await?
    {
        return Err(HandlerError::Unauthorized);
    }

    let channels = state.stores().channels.channel_list(req.server_id).await?;

    state
        .registry()
        .set_current_server(session.id(), req.server_id);
    state.registry().set_current_channel(session.id(), NO_CHANNEL);

    let reply = frame::encode_json(
        TypeCode::ChannelList.as_u8(),
        &ChannelListReply {
            server_id: req.server_id,
            channels,
        },
    )?;
    Ok(Outcome::reply(reply))
}
