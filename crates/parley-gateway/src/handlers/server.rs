//! Server management handlers

use super::{parse, parse_validated, HandlerError, Outcome};
use crate::broadcast::BroadcastIntent;
use crate::connection::Session;
use crate::protocol::{
    frame, AddServerRequest, DeleteServerBroadcast, DeleteServerRequest, ServerInviteReply,
    ServerInviteRequest, ServerListReply, ServerListRequest, ServerMemberListReply,
    ServerMemberListRequest, TypeCode,
};
use crate::server::GatewayState;
use parley_core::entities::{generate_invite_code, ServerSummary};
use parley_core::{DomainError, Snowflake};

/// Create a server owned by the requester
pub(super) async fn add_server(
    state: &GatewayState,
    session: &Session,
    payload: &[u8],
) -> Result<Outcome, HandlerError> {
    let req: AddServerRequest = parse_validated("AddServer", payload)?;

    let id = state.ids().generate()?;
    state
        .stores()
        .servers
        .insert_server(id, session.user_id(), &req.name)
        .await?;

    tracing::info!(server_id = %id, owner_id = %session.user_id(), "Server created");

    // Addressed to the user rather than the session so every device learns
    // about the new server.
    let summary = ServerSummary {
        id,
        owner_id: session.user_id(),
        name: req.name,
    };
    let frame = frame::encode_json(TypeCode::AddServer.as_u8(), &summary)?;
    Ok(Outcome::broadcast(BroadcastIntent::users(
        TypeCode::AddServer,
        frame,
        vec![session.user_id()],
    )))
}

/// List the requester's servers
pub(super) async fn server_list(
    state: &GatewayState,
    session: &Session,
    payload: &[u8],
) -> Result<Outcome, HandlerError> {
    let _req: ServerListRequest = parse("ServerList", payload)?;

    let servers = state.stores().servers.server_list(session.user_id()).await?;
    let reply = frame::encode_json(TypeCode::ServerList.as_u8(), &ServerListReply { servers })?;
    Ok(Outcome::reply(reply))
}

/// Delete an owned server; announced globally since membership rows vanish
/// with the server
pub(super) async fn delete_server(
    state: &GatewayState,
    session: &Session,
    payload: &[u8],
) -> Result<Outcome, HandlerError> {
    let req: DeleteServerRequest = parse("DeleteServer", payload)?;

    let owner = state.stores().servers.server_owner(req.server_id).await?;
    if owner == Snowflake::new(0) {
        return Err(DomainError::ServerNotFound(req.server_id).into());
    }
    if owner != session.user_id() {
        return Err(DomainError::NotServerOwner.into());
    }

    state.stores().servers.delete_server(req.server_id).await?;

    tracing::info!(server_id = %req.server_id, owner_id = %owner, "Server deleted");

    let frame = frame::encode_json(
        TypeCode::DeleteServer.as_u8(),
        &DeleteServerBroadcast {
            server_id: req.server_id,
        },
    )?;
    Ok(Outcome::broadcast(BroadcastIntent::global(
        TypeCode::DeleteServer,
        frame,
    )))
}

/// Mint an invite code for a server the requester belongs to
pub(super) async fn server_invite(
    state: &GatewayState,
    session: &Session,
    payload: &[u8],
) -> Result<Outcome, HandlerError> {
    let req: ServerInviteRequest = parse("ServerInvite", payload)?;

    if !state
        .stores()
        .servers
        .confirm_membership(session.user_id(), req.server_id)
        .await?
    {
        return Err(HandlerError::Unauthorized);
    }

    let id = state.ids().generate()?;
    let code = generate_invite_code();
    state
        .stores()
        .servers
        .insert_invite(id, req.server_id, &code)
        .await?;

    let reply = frame::encode_json(
        TypeCode::ServerInvite.as_u8(),
        &ServerInviteReply {
            invite_id: id,
            server_id: req.server_id,
            code,
        },
    )?;
    Ok(Outcome::reply(reply))
}

/// List members of a server the requester belongs to
pub(super) async fn server_member_list(
    state: &GatewayState,
    session: &Session,
    payload: &[u8],
) -> Result<Outcome, HandlerError> {
    let req: ServerMemberListRequest = parse("ServerMemberList", payload)?;

    if !state
        .stores()
        .servers
        .confirm_membership(session.user_id(), req.server_id)
        .await?
    {
        return Err(HandlerError::Unauthorized);
    }

    let members = state.stores().servers.member_list(req.server_id).await?;
    let reply = frame::encode_json(
        TypeCode::ServerMemberList.as_u8(),
        &ServerMemberListReply {
            server_id: req.server_id,
            members,
        },
    )?;
    Ok(Outcome::reply(reply))
}
