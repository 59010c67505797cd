//! Friendship and block handlers

use super::{parse, HandlerError, Outcome};
use crate::broadcast::BroadcastIntent;
use crate::connection::Session;
use crate::protocol::{
    frame, AddFriendRequest, BlockUserRequest, RelationshipUpdate, TypeCode, UnfriendRequest,
};
use crate::server::GatewayState;
use parley_core::{DomainError, Snowflake};

fn reject_self_target(user: Snowflake, target: Snowflake) -> Result<(), HandlerError> {
    if user == target {
        return Err(DomainError::ValidationError(
            "Cannot target yourself".to_string(),
        )
        .into());
    }
    Ok(())
}

/// Record a friendship; both sides get the update on all their devices
pub(super) async fn add_friend(
    state: &GatewayState,
    session: &Session,
    payload: &[u8],
) -> Result<Outcome, HandlerError> {
    let req: AddFriendRequest = parse("AddFriend", payload)?;
    reject_self_target(session.user_id(), req.user_id)?;

    state
        .stores()
        .relationships
        .insert_friendship(session.user_id(), req.user_id)
        .await?;

    let update = RelationshipUpdate {
        user_id: session.user_id(),
        other_id: req.user_id,
    };
    let frame = frame::encode_json(TypeCode::AddFriend.as_u8(), &update)?;
    Ok(Outcome::broadcast(BroadcastIntent::users(
        TypeCode::AddFriend,
        frame,
        vec![session.user_id(), req.user_id],
    )))
}

/// Record a block. Only the blocker is notified; the blocked user is not
/// told they were blocked.
pub(super) async fn block_user(
    state: &GatewayState,
    session: &Session,
    payload: &[u8],
) -> Result<Outcome, HandlerError> {
    let req: BlockUserRequest = parse("BlockUser", payload)?;
    reject_self_target(session.user_id(), req.user_id)?;

    state
        .stores()
        .relationships
        .insert_block(session.user_id(), req.user_id)
        .await?;

    let update = RelationshipUpdate {
        user_id: session.user_id(),
        other_id: req.user_id,
    };
    let frame = frame::encode_json(TypeCode::BlockUser.as_u8(), &update)?;
    Ok(Outcome::broadcast(BroadcastIntent::users(
        TypeCode::BlockUser,
        frame,
        vec![session.user_id()],
    )))
}

/// Remove a friendship; both sides get the update
pub(super) async fn unfriend(
    state: &GatewayState,
    session: &Session,
    payload: &[u8],
) -> Result<Outcome, HandlerError> {
    let req: UnfriendRequest = parse("Unfriend", payload)?;
    reject_self_target(session.user_id(), req.user_id)?;

    state
        .stores()
        .relationships
        .delete_friendship(session.user_id(), req.user_id)
        .await?;

    let update = RelationshipUpdate {
        user_id: session.user_id(),
        other_id: req.user_id,
    };
    let frame = frame::encode_json(TypeCode::Unfriend.as_u8(), &update)?;
    Ok(Outcome::broadcast(BroadcastIntent::users(
        TypeCode::Unfriend,
        frame,
        vec![session.user_id(), req.user_id],
    )))
}
