//! User data handlers

use super::{parse, parse_validated, HandlerError, Outcome};
use crate::broadcast::BroadcastIntent;
use crate::connection::Session;
use crate::protocol::{
    frame, InitialUserDataReply, InitialUserDataRequest, TypeCode, UpdateUserDataRequest,
};
use crate::server::GatewayState;
use parley_core::Snowflake;

/// Bundle profile, server list, and friend list for a freshly connected
/// client
pub(super) async fn initial_user_data(
    state: &GatewayState,
    session: &Session,
    payload: &[u8],
) -> Result<Outcome, HandlerError> {
    let _req: InitialUserDataRequest = parse("InitialUserData", payload)?;

    let user = state.stores().users.profile(session.user_id()).await?;
    let servers = state.stores().servers.server_list(session.user_id()).await?;
    let friends = state
        .stores()
        .relationships
        .friend_list(session.user_id())
        .await?;

    let reply = frame::encode_json(
        TypeCode::InitialUserData.as_u8(),
        &InitialUserDataReply {
            user,
            servers,
            friends,
        },
    )?;
    Ok(Outcome::reply(reply))
}

/// Update display name and/or status; the fresh profile goes out to the
/// user's friends and to the user's own devices
pub(super) async fn update_user_data(
    state: &GatewayState,
    session: &Session,
    payload: &[u8],
) -> Result<Outcome, HandlerError> {
    let req: UpdateUserDataRequest = parse_validated("UpdateUserData", payload)?;

    state
        .stores()
        .users
        .update_profile(
            session.user_id(),
            req.display_name.as_deref(),
            req.status.as_deref(),
        )
        .await?;

    let profile = state.stores().users.profile(session.user_id()).await?;
    let friends = state
        .stores()
        .relationships
        .friend_list(session.user_id())
        .await?;

    let mut audience: Vec<Snowflake> = friends.iter().map(|f| f.id).collect();
    audience.push(session.user_id());

    let frame = frame::encode_json(TypeCode::UpdateUserData.as_u8(), &profile)?;
    Ok(Outcome::broadcast(BroadcastIntent::users(
        TypeCode::UpdateUserData,
        frame,
        audience,
    )))
}
