//! In-memory test doubles for the store and auth ports

use crate::broadcast::BroadcastIntent;
use crate::connection::{Session, SessionRegistry};
use crate::server::{GatewayState, Stores};
use async_trait::async_trait;
use parking_lot::Mutex;
use parley_core::entities::{ChannelSummary, ServerSummary, StoredMessage, UserProfile};
use parley_core::traits::{
    Authenticator, ChannelStore, MessageStore, RelationshipStore, RepoResult, ServerStore,
    UserStore,
};
use parley_core::{DomainError, Snowflake, SnowflakeGenerator};
use parley_common::GatewayConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Default)]
struct MemoryState {
    messages: Vec<StoredMessage>,
    servers: Vec<ServerSummary>,
    members: HashMap<Snowflake, Vec<Snowflake>>,
    channels: Vec<ChannelSummary>,
    friendships: Vec<(Snowflake, Snowflake)>,
    blocks: Vec<(Snowflake, Snowflake)>,
    invites: Vec<(Snowflake, Snowflake, String)>,
    users: HashMap<Snowflake, UserProfile>,
}

/// Single in-memory backend implementing every store port
#[derive(Default)]
pub(crate) struct MemoryStore {
    state: Mutex<MemoryState>,
}

fn ordered(a: Snowflake, b: Snowflake) -> (Snowflake, Snowflake) {
    if a.into_inner() <= b.into_inner() {
        (a, b)
    } else {
        (b, a)
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn insert_message(
        &self,
        id: Snowflake,
        channel_id: Snowflake,
        user_id: Snowflake,
        text: &str,
        attachments: &[String],
    ) -> RepoResult<()> {
        self.state.lock().messages.push(StoredMessage {
            id,
            channel_id,
            user_id,
            text: text.to_string(),
            attachments: attachments.to_vec(),
        });
        Ok(())
    }

    async fn delete_message(&self, id: Snowflake, requester: Snowflake) -> RepoResult<Snowflake> {
        let mut state = self.state.lock();
        let Some(pos) = state
            .messages
            .iter()
            .position(|m| m.id == id && m.user_id == requester)
        else {
            return Ok(Snowflake::new(0));
        };
        Ok(state.messages.remove(pos).channel_id)
    }

    async fn message_history(
        &self,
        channel_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<StoredMessage>> {
        let state = self.state.lock();
        let mut matching: Vec<_> = state
            .messages
            .iter()
            .filter(|m| m.channel_id == channel_id)
            .cloned()
            .collect();
        let keep = usize::try_from(limit).unwrap_or(usize::MAX);
        if matching.len() > keep {
            matching.drain(..matching.len() - keep);
        }
        Ok(matching)
    }
}

#[async_trait]
impl ServerStore for MemoryStore {
    async fn insert_server(
        &self,
        id: Snowflake,
        owner_id: Snowflake,
        name: &str,
    ) -> RepoResult<()> {
        let mut state = self.state.lock();
        state.servers.push(ServerSummary {
            id,
            owner_id,
            name: name.to_string(),
        });
        state.members.insert(id, vec![owner_id]);
        Ok(())
    }

    async fn delete_server(&self, id: Snowflake) -> RepoResult<()> {
        let mut state = self.state.lock();
        state.servers.retain(|s| s.id != id);
        state.members.remove(&id);
        state.channels.retain(|c| c.server_id != id);
        Ok(())
    }

    async fn server_list(&self, user_id: Snowflake) -> RepoResult<Vec<ServerSummary>> {
        let state = self.state.lock();
        Ok(state
            .servers
            .iter()
            .filter(|s| {
                state
                    .members
                    .get(&s.id)
                    .is_some_and(|m| m.contains(&user_id))
            })
            .cloned()
            .collect())
    }

    async fn confirm_membership(
        &self,
        user_id: Snowflake,
        server_id: Snowflake,
    ) -> RepoResult<bool> {
        Ok(self
            .state
            .lock()
            .members
            .get(&server_id)
            .is_some_and(|m| m.contains(&user_id)))
    }

    async fn server_owner(&self, server_id: Snowflake) -> RepoResult<Snowflake> {
        Ok(self
            .state
            .lock()
            .servers
            .iter()
            .find(|s| s.id == server_id)
            .map_or(Snowflake::new(0), |s| s.owner_id))
    }

    async fn member_list(&self, server_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        Ok(self
            .state
            .lock()
            .members
            .get(&server_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_invite(
        &self,
        id: Snowflake,
        server_id: Snowflake,
        code: &str,
    ) -> RepoResult<()> {
        self.state
            .lock()
            .invites
            .push((id, server_id, code.to_string()));
        Ok(())
    }
}

#[async_trait]
impl ChannelStore for MemoryStore {
    async fn insert_channel(
        &self,
        id: Snowflake,
        server_id: Snowflake,
        name: &str,
    ) -> RepoResult<()> {
        self.state.lock().channels.push(ChannelSummary {
            id,
            server_id,
            name: name.to_string(),
        });
        Ok(())
    }

    async fn channel_list(&self, server_id: Snowflake) -> RepoResult<Vec<ChannelSummary>> {
        Ok(self
            .state
            .lock()
            .channels
            .iter()
            .filter(|c| c.server_id == server_id)
            .cloned()
            .collect())
    }

    async fn server_of_channel(&self, channel_id: Snowflake) -> RepoResult<Snowflake> {
        self.state
            .lock()
            .channels
            .iter()
            .find(|c| c.id == channel_id)
            .map(|c| c.server_id)
            .ok_or(DomainError::ChannelNotFound(channel_id))
    }
}

#[async_trait]
impl RelationshipStore for MemoryStore {
    async fn insert_friendship(
        &self,
        user_id: Snowflake,
        friend_id: Snowflake,
    ) -> RepoResult<()> {
        let pair = ordered(user_id, friend_id);
        let mut state = self.state.lock();
        if state.blocks.iter().any(|b| ordered(b.0, b.1) == pair) {
            return Err(DomainError::UserBlocked);
        }
        if state.friendships.contains(&pair) {
            return Err(DomainError::AlreadyFriends);
        }
        state.friendships.push(pair);
        Ok(())
    }

    async fn delete_friendship(
        &self,
        user_id: Snowflake,
        friend_id: Snowflake,
    ) -> RepoResult<()> {
        let pair = ordered(user_id, friend_id);
        self.state.lock().friendships.retain(|p| *p != pair);
        Ok(())
    }

    async fn insert_block(&self, user_id: Snowflake, blocked_id: Snowflake) -> RepoResult<()> {
        let pair = ordered(user_id, blocked_id);
        let mut state = self.state.lock();
        state.friendships.retain(|p| *p != pair);
        state.blocks.push((user_id, blocked_id));
        Ok(())
    }

    async fn friend_list(&self, user_id: Snowflake) -> RepoResult<Vec<UserProfile>> {
        let state = self.state.lock();
        Ok(state
            .friendships
            .iter()
            .filter_map(|&(a, b)| {
                if a == user_id {
                    Some(b)
                } else if b == user_id {
                    Some(a)
                } else {
                    None
                }
            })
            .map(|id| {
                state.users.get(&id).cloned().unwrap_or(UserProfile {
                    id,
                    display_name: format!("user-{id}"),
                    status: None,
                })
            })
            .collect())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn profile(&self, user_id: Snowflake) -> RepoResult<UserProfile> {
        self.state
            .lock()
            .users
            .get(&user_id)
            .cloned()
            .ok_or(DomainError::UserNotFound(user_id))
    }

    async fn update_profile(
        &self,
        user_id: Snowflake,
        display_name: Option<&str>,
        status: Option<&str>,
    ) -> RepoResult<()> {
        let mut state = self.state.lock();
        let profile = state
            .users
            .get_mut(&user_id)
            .ok_or(DomainError::UserNotFound(user_id))?;
        if let Some(name) = display_name {
            profile.display_name = name.to_string();
        }
        if let Some(status) = status {
            profile.status = Some(status.to_string());
        }
        Ok(())
    }
}

/// Authenticator treating any token that parses as an integer as that user
pub(crate) struct StubAuthenticator;

#[async_trait]
impl Authenticator for StubAuthenticator {
    async fn validate_session(&self, token: &str) -> Option<Snowflake> {
        token.parse::<i64>().ok().map(Snowflake::new)
    }
}

/// Fully wired gateway state over the in-memory backend
pub(crate) struct TestHarness {
    pub(crate) state: GatewayState,
    store: Arc<MemoryStore>,
    intent_rx: Mutex<Option<mpsc::Receiver<BroadcastIntent>>>,
}

impl TestHarness {
    pub(crate) fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let stores = Stores {
            messages: store.clone(),
            servers: store.clone(),
            channels: store.clone(),
            relationships: store.clone(),
            users: store.clone(),
        };
        let ids = Arc::new(SnowflakeGenerator::new(0).unwrap());
        let registry = SessionRegistry::new_shared(ids.clone());
        let (intent_tx, intent_rx) = mpsc::channel(16);
        let config = GatewayConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            keepalive_interval_ms: 45_000,
            read_timeout_ms: 90_000,
            write_timeout_ms: 10_000,
            mailbox_capacity: 16,
            intent_queue_capacity: 16,
        };

        Self {
            state: GatewayState::new(
                registry,
                stores,
                ids,
                Arc::new(StubAuthenticator),
                intent_tx,
                config,
            ),
            store,
            intent_rx: Mutex::new(Some(intent_rx)),
        }
    }

    pub(crate) fn take_intent_rx(&self) -> mpsc::Receiver<BroadcastIntent> {
        self.intent_rx
            .lock()
            .take()
            .expect("intent receiver already taken")
    }

    pub(crate) async fn connect(
        &self,
        user_id: Snowflake,
    ) -> (Arc<Session>, mpsc::Receiver<Vec<u8>>) {
        let (tx, rx) = mpsc::channel(16);
        let session = self.state.registry().add(user_id, tx).unwrap();
        (session, rx)
    }

    pub(crate) fn view_channel(&self, session: &Session, channel_id: Snowflake) {
        assert!(self
            .state
            .registry()
            .set_current_channel(session.id(), channel_id));
    }

    pub(crate) fn seed_user(&self, id: Snowflake, display_name: &str) {
        self.store.state.lock().users.insert(
            id,
            UserProfile {
                id,
                display_name: display_name.to_string(),
                status: None,
            },
        );
    }

    pub(crate) fn seed_server(&self, id: Snowflake, owner_id: Snowflake, members: &[Snowflake]) {
        let mut state = self.store.state.lock();
        state.servers.push(ServerSummary {
            id,
            owner_id,
            name: format!("server-{id}"),
        });
        state.members.insert(id, members.to_vec());
    }

    pub(crate) fn seed_channel(&self, id: Snowflake, server_id: Snowflake) {
        self.store.state.lock().channels.push(ChannelSummary {
            id,
            server_id,
            name: format!("channel-{id}"),
        });
    }

    pub(crate) fn seed_message(
        &self,
        id: Snowflake,
        channel_id: Snowflake,
        user_id: Snowflake,
        text: &str,
    ) {
        self.store.state.lock().messages.push(StoredMessage {
            id,
            channel_id,
            user_id,
            text: text.to_string(),
            attachments: vec![],
        });
    }

    pub(crate) fn seed_friendship(&self, a: Snowflake, b: Snowflake) {
        self.store.state.lock().friendships.push(ordered(a, b));
    }
}
