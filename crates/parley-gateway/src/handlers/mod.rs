//! Request dispatch
//!
//! The read pump hands every decoded frame to [`RequestDispatcher::dispatch`],
//! which routes by type code and turns handler failures into reject frames.
//! The connection stays open no matter what a handler returns; only transport
//! errors close it.

mod channel;
mod error;
mod message;
mod relationship;
mod server;
mod user;

#[cfg(test)]
mod testing;

pub use error::HandlerError;

use crate::broadcast::BroadcastIntent;
use crate::connection::Session;
use crate::protocol::{frame, RejectPayload, TypeCode};
use crate::server::GatewayState;
use serde::de::DeserializeOwned;
use validator::Validate;

/// What a handled request produced: an optional direct reply for the
/// requesting session and an optional broadcast for everyone else.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Encoded frame queued onto the requester's own mailbox
    pub reply: Option<Vec<u8>>,

    /// Intent handed to the broadcast router
    pub intent: Option<BroadcastIntent>,
}

impl Outcome {
    /// A direct reply only
    #[must_use]
    pub fn reply(frame: Vec<u8>) -> Self {
        Self {
            reply: Some(frame),
            intent: None,
        }
    }

    /// A broadcast only; the requester hears back through the fan-out
    #[must_use]
    pub fn broadcast(intent: BroadcastIntent) -> Self {
        Self {
            reply: None,
            intent: Some(intent),
        }
    }
}

/// Routes decoded frames to their handlers
pub struct RequestDispatcher;

impl RequestDispatcher {
    /// Handle one inbound frame. Never fails; every error becomes a reject
    /// frame addressed to the requester.
    pub async fn dispatch(
        state: &GatewayState,
        session: &Session,
        raw_type: u8,
        payload: &[u8],
    ) -> Outcome {
        let Some(code) = TypeCode::from_u8(raw_type).filter(|c| c.is_request()) else {
            tracing::debug!(
                session_id = %session.id(),
                raw_type,
                "Frame with unknown or reserved type code"
            );
            return Outcome::reply(reject_frame("Unknown type code"));
        };

        let result = match code {
            TypeCode::ChatMessage => message::chat_message(state, session, payload).await,
            TypeCode::ChatHistory => message::chat_history(state, session, payload).await,
            TypeCode::DeleteChatMessage => {
                message::delete_chat_message(state, session, payload).await
            }
            TypeCode::AddServer => server::add_server(state, session, payload).await,
            TypeCode::ServerList => server::server_list(state, session, payload).await,
            TypeCode::DeleteServer => server::delete_server(state, session, payload).await,
            TypeCode::ServerInvite => server::server_invite(state, session, payload).await,
            TypeCode::ServerMemberList => {
                server::server_member_list(state, session, payload).await
            }
            TypeCode::AddChannel => channel::add_channel(state, session, payload).await,
            TypeCode::ChannelList => channel::channel_list(state, session, payload).await,
            TypeCode::AddFriend => relationship::add_friend(state, session, payload).await,
            TypeCode::BlockUser => relationship::block_user(state, session, payload).await,
            TypeCode::Unfriend => relationship::unfriend(state, session, payload).await,
            TypeCode::InitialUserData => user::initial_user_data(state, session, payload).await,
            TypeCode::UpdateUserData => user::update_user_data(state, session, payload).await,
            TypeCode::Reject => unreachable!("filtered by is_request"),
        };

        match result {
            Ok(outcome) => outcome,
            Err(err) => {
                if err.is_suspicious() {
                    tracing::warn!(
                        session_id = %session.id(),
                        user_id = %session.user_id(),
                        type_code = %code,
                        error = %err,
                        "Rejected unauthorized request"
                    );
                } else {
                    tracing::debug!(
                        session_id = %session.id(),
                        type_code = %code,
                        error = %err,
                        "Request rejected"
                    );
                }
                Outcome::reply(reject_frame(&err.reject_reason()))
            }
        }
    }
}

/// Encode a type-0 reject frame
pub(crate) fn reject_frame(reason: &str) -> Vec<u8> {
    frame::encode_json(TypeCode::Reject.as_u8(), &RejectPayload::new(reason))
        .unwrap_or_else(|_| frame::encode(TypeCode::Reject.as_u8(), b"{}"))
}

/// Decode a JSON payload into a typed request
fn parse<T: DeserializeOwned>(kind: &'static str, payload: &[u8]) -> Result<T, HandlerError> {
    frame::decode_json(payload).map_err(|source| HandlerError::Deserialize { kind, source })
}

/// Decode and validate a mutating request
fn parse_validated<T: DeserializeOwned + Validate>(
    kind: &'static str,
    payload: &[u8],
) -> Result<T, HandlerError> {
    let request: T = parse(kind, payload)?;
    request.validate()?;
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::testing::TestHarness;
    use super::*;
    use crate::broadcast::BroadcastRouter;
    use crate::protocol::frame::decode;
    use parley_core::Snowflake;
    use serde_json::json;

    fn user(n: i64) -> Snowflake {
        Snowflake::new(n)
    }

    #[tokio::test]
    async fn test_unknown_type_code_yields_reject_reply() {
        let harness = TestHarness::new();
        let (session, _rx) = harness.connect(user(1)).await;

        let outcome = RequestDispatcher::dispatch(&harness.state, &session, 99, b"{}").await;

        let reply = outcome.reply.expect("reject reply");
        let (code, payload) = decode(&reply).unwrap();
        assert_eq!(code, 0);
        let reject: serde_json::Value = serde_json::from_slice(payload).unwrap();
        assert_eq!(reject["Reason"], "Unknown type code");
        assert!(outcome.intent.is_none());
    }

    #[tokio::test]
    async fn test_malformed_payload_yields_reject_reply() {
        let harness = TestHarness::new();
        let (session, _rx) = harness.connect(user(1)).await;

        let outcome =
            RequestDispatcher::dispatch(&harness.state, &session, 1, b"{not json").await;

        let reply = outcome.reply.expect("reject reply");
        let (code, payload) = decode(&reply).unwrap();
        assert_eq!(code, 0);
        let reject: serde_json::Value = serde_json::from_slice(payload).unwrap();
        assert_eq!(reject["Reason"], "Malformed ChatMessage payload");
    }

    #[tokio::test]
    async fn test_chat_message_reaches_only_channel_viewers() {
        let harness = TestHarness::new();
        harness.seed_server(user(10), user(1), &[user(1), user(2), user(3)]);
        harness.seed_channel(user(7), user(10));

        let router =
            BroadcastRouter::new(harness.state.registry().clone(), harness.take_intent_rx())
                .spawn();

        let (sender, mut sender_rx) = harness.connect(user(1)).await;
        let (viewer, mut viewer_rx) = harness.connect(user(2)).await;
        let (elsewhere, mut elsewhere_rx) = harness.connect(user(3)).await;
        harness.view_channel(&sender, user(7));
        harness.view_channel(&viewer, user(7));
        harness.view_channel(&elsewhere, user(8));

        let payload = serde_json::to_vec(&json!({"ChannelID": "7", "Message": "hello"})).unwrap();
        let outcome = RequestDispatcher::dispatch(&harness.state, &sender, 1, &payload).await;

        // No direct reply; the sender hears back through the fan-out.
        assert!(outcome.reply.is_none());
        harness
            .state
            .intents()
            .send(outcome.intent.expect("broadcast intent"))
            .await
            .unwrap();

        let frame = viewer_rx.recv().await.unwrap();
        let (code, body) = decode(&frame).unwrap();
        assert_eq!(code, 1);
        let msg: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(msg["Message"], "hello");
        assert_eq!(msg["ChannelID"], "7");
        assert_eq!(msg["UserID"], "1");

        // The sender gets exactly one copy, via the broadcast.
        assert_eq!(sender_rx.recv().await.unwrap(), frame);
        assert!(sender_rx.try_recv().is_err());
        assert!(elsewhere_rx.try_recv().is_err());

        drop(harness);
        router.await.unwrap();
    }

    #[tokio::test]
    async fn test_chat_message_from_non_member_is_rejected() {
        let harness = TestHarness::new();
        harness.seed_server(user(10), user(1), &[user(1)]);
        harness.seed_channel(user(7), user(10));

        let (outsider, _rx) = harness.connect(user(9)).await;
        let payload = serde_json::to_vec(&json!({"ChannelID": "7", "Message": "hi"})).unwrap();
        let outcome = RequestDispatcher::dispatch(&harness.state, &outsider, 1, &payload).await;

        let frame = outcome.reply.expect("reject");
        let (code, body) = decode(&frame).unwrap();
        assert_eq!(code, 0);
        let reject: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(reject["Reason"], "Not allowed");
        assert!(outcome.intent.is_none());
    }

    #[tokio::test]
    async fn test_chat_history_marks_viewed_channel() {
        let harness = TestHarness::new();
        harness.seed_server(user(10), user(1), &[user(1)]);
        harness.seed_channel(user(7), user(10));

        let (session, _rx) = harness.connect(user(1)).await;
        let payload = serde_json::to_vec(&json!({"ChannelID": "7"})).unwrap();
        let outcome = RequestDispatcher::dispatch(&harness.state, &session, 2, &payload).await;

        let (code, _) = decode(&outcome.reply.expect("history reply")).unwrap();
        assert_eq!(code, 2);
        assert_eq!(session.current_channel(), user(7));
    }

    #[tokio::test]
    async fn test_channel_list_moves_server_cursor_and_clears_channel() {
        let harness = TestHarness::new();
        harness.seed_server(user(10), user(1), &[user(1)]);
        harness.seed_channel(user(7), user(10));

        let (session, _rx) = harness.connect(user(1)).await;
        harness.view_channel(&session, user(7));

        let payload = serde_json::to_vec(&json!({"ServerID": "10"})).unwrap();
        let outcome = RequestDispatcher::dispatch(&harness.state, &session, 32, &payload).await;

        let frame = outcome.reply.expect("channel list");
        let (code, body) = decode(&frame).unwrap();
        assert_eq!(code, 32);
        let reply: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(reply["Channels"][0]["ChannelID"], "7");

        assert_eq!(session.current_server(), user(10));
        assert_eq!(session.current_channel(), crate::connection::NO_CHANNEL);
    }

    #[tokio::test]
    async fn test_delete_server_requires_ownership() {
        let harness = TestHarness::new();
        harness.seed_server(user(10), user(1), &[user(1), user(2)]);

        let (member, _rx) = harness.connect(user(2)).await;
        let payload = serde_json::to_vec(&json!({"ServerID": "10"})).unwrap();
        let outcome = RequestDispatcher::dispatch(&harness.state, &member, 23, &payload).await;

        let (code, _) = decode(&outcome.reply.expect("reject")).unwrap();
        assert_eq!(code, 0);
        assert!(outcome.intent.is_none());

        // Owner succeeds and the deletion goes out globally.
        let (owner, _rx) = harness.connect(user(1)).await;
        let outcome = RequestDispatcher::dispatch(&harness.state, &owner, 23, &payload).await;
        assert!(outcome.reply.is_none());
        let intent = outcome.intent.expect("global broadcast");
        assert_eq!(intent.scope, crate::broadcast::Scope::Global);
    }

    #[tokio::test]
    async fn test_delete_foreign_message_is_rejected() {
        let harness = TestHarness::new();
        harness.seed_server(user(10), user(1), &[user(1), user(2)]);
        harness.seed_channel(user(7), user(10));
        harness.seed_message(user(100), user(7), user(1), "theirs");

        let (session, _rx) = harness.connect(user(2)).await;
        let payload = serde_json::to_vec(&json!({"MessageID": "100"})).unwrap();
        let outcome = RequestDispatcher::dispatch(&harness.state, &session, 3, &payload).await;

        let (code, _) = decode(&outcome.reply.expect("reject")).unwrap();
        assert_eq!(code, 0);

        // Author succeeds; deletion broadcast targets the channel.
        let (author, _rx) = harness.connect(user(1)).await;
        let outcome = RequestDispatcher::dispatch(&harness.state, &author, 3, &payload).await;
        let intent = outcome.intent.expect("channel broadcast");
        assert_eq!(intent.scope, crate::broadcast::Scope::Channel(user(7)));
    }

    #[tokio::test]
    async fn test_initial_user_data_reply_bundles_profile_servers_friends() {
        let harness = TestHarness::new();
        harness.seed_user(user(1), "alice");
        harness.seed_user(user(2), "bob");
        harness.seed_server(user(10), user(1), &[user(1)]);
        harness.seed_friendship(user(1), user(2));

        let (session, _rx) = harness.connect(user(1)).await;
        let outcome = RequestDispatcher::dispatch(&harness.state, &session, 61, b"").await;

        let frame = outcome.reply.expect("initial data");
        let (code, body) = decode(&frame).unwrap();
        assert_eq!(code, 61);
        let reply: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(reply["User"]["DisplayName"], "alice");
        assert_eq!(reply["Servers"][0]["ServerID"], "10");
        assert_eq!(reply["Friends"][0]["UserID"], "2");
    }

    #[tokio::test]
    async fn test_update_user_data_broadcasts_to_friends_and_self() {
        let harness = TestHarness::new();
        harness.seed_user(user(1), "alice");
        harness.seed_user(user(2), "bob");
        harness.seed_friendship(user(1), user(2));

        let (session, _rx) = harness.connect(user(1)).await;
        let payload = serde_json::to_vec(&json!({"DisplayName": "alicia"})).unwrap();
        let outcome = RequestDispatcher::dispatch(&harness.state, &session, 62, &payload).await;

        assert!(outcome.reply.is_none());
        let intent = outcome.intent.expect("profile broadcast");
        match intent.scope {
            crate::broadcast::Scope::Users(users) => {
                assert!(users.contains(&user(1)));
                assert!(users.contains(&user(2)));
            }
            other => panic!("expected user scope, got {other:?}"),
        }

        let (code, body) = decode(&intent.frame).unwrap();
        assert_eq!(code, 62);
        let profile: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(profile["DisplayName"], "alicia");
    }

    #[tokio::test]
    async fn test_add_friend_notifies_both_sides() {
        let harness = TestHarness::new();
        harness.seed_user(user(1), "alice");
        harness.seed_user(user(2), "bob");

        let (session, _rx) = harness.connect(user(1)).await;
        let payload = serde_json::to_vec(&json!({"UserID": "2"})).unwrap();
        let outcome = RequestDispatcher::dispatch(&harness.state, &session, 51, &payload).await;

        let intent = outcome.intent.expect("relationship broadcast");
        assert_eq!(
            intent.scope,
            crate::broadcast::Scope::Users(vec![user(1), user(2)])
        );
    }

    #[tokio::test]
    async fn test_server_invite_returns_code() {
        let harness = TestHarness::new();
        harness.seed_server(user(10), user(1), &[user(1)]);

        let (session, _rx) = harness.connect(user(1)).await;
        let payload = serde_json::to_vec(&json!({"ServerID": "10"})).unwrap();
        let outcome = RequestDispatcher::dispatch(&harness.state, &session, 24, &payload).await;

        let frame = outcome.reply.expect("invite reply");
        let (code, body) = decode(&frame).unwrap();
        assert_eq!(code, 24);
        let reply: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(reply["ServerID"], "10");
        assert_eq!(reply["Code"].as_str().unwrap().len(), 8);
    }
}
