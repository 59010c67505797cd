//! Session registry
//!
//! The single owner of the live-session map. Every operation is safe under
//! concurrent access from connection pumps and the broadcast router; no
//! caller ever sees the underlying map. Critical sections stay short: all
//! delivery happens on snapshots taken out of the map.

use super::Session;
use dashmap::DashMap;
use parley_core::{Snowflake, SnowflakeError, SnowflakeGenerator};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Concurrent directory of live sessions
pub struct SessionRegistry {
    /// Active sessions by session ID
    sessions: DashMap<Snowflake, Arc<Session>>,

    /// Generator used for session IDs
    ids: Arc<SnowflakeGenerator>,
}

impl SessionRegistry {
    /// Create a new registry
    #[must_use]
    pub fn new(ids: Arc<SnowflakeGenerator>) -> Self {
        Self {
            sessions: DashMap::new(),
            ids,
        }
    }

    /// Create a new registry wrapped in Arc
    #[must_use]
    pub fn new_shared(ids: Arc<SnowflakeGenerator>) -> Arc<Self> {
        Arc::new(Self::new(ids))
    }

    /// Register a new session for a user, generating its session ID
    pub fn add(
        &self,
        user_id: Snowflake,
        mailbox: mpsc::Sender<Vec<u8>>,
    ) -> Result<Arc<Session>, SnowflakeError> {
        let session_id = self.ids.generate()?;
        let session = Session::new(session_id, user_id, mailbox);
        self.sessions.insert(session_id, session.clone());

        tracing::debug!(session_id = %session_id, user_id = %user_id, "Session added");

        Ok(session)
    }

    /// Remove a session; no-op if already absent.
    ///
    /// Returns whether an entry was actually removed, so callers racing on
    /// shutdown can tell who got there first.
    pub fn remove(&self, session_id: Snowflake) -> bool {
        let removed = self.sessions.remove(&session_id).is_some();
        if removed {
            tracing::debug!(session_id = %session_id, "Session removed");
        }
        removed
    }

    /// Get a session by ID
    pub fn get(&self, session_id: Snowflake) -> Option<Arc<Session>> {
        self.sessions.get(&session_id).map(|r| r.clone())
    }

    /// Update a session's viewed channel.
    ///
    /// Returns false if the session vanished concurrently (connection closed
    /// mid-request); that is not an error for the caller.
    pub fn set_current_channel(&self, session_id: Snowflake, channel_id: Snowflake) -> bool {
        match self.sessions.get(&session_id) {
            Some(session) => {
                session.set_current_channel(channel_id);
                true
            }
            None => {
                tracing::debug!(session_id = %session_id, "Cursor update for missing session");
                false
            }
        }
    }

    /// Update a session's viewed server
    pub fn set_current_server(&self, session_id: Snowflake, server_id: Snowflake) -> bool {
        match self.sessions.get(&session_id) {
            Some(session) => {
                session.set_current_server(server_id);
                true
            }
            None => {
                tracing::debug!(session_id = %session_id, "Cursor update for missing session");
                false
            }
        }
    }

    /// Check whether any live session belongs to the user
    pub fn is_user_online(&self, user_id: Snowflake) -> bool {
        self.sessions.iter().any(|s| s.user_id() == user_id)
    }

    /// Snapshot all sessions matching a predicate.
    ///
    /// References are copied out; delivery must happen on the returned
    /// snapshot so fan-out never holds registry locks.
    pub fn sessions_matching<F>(&self, predicate: F) -> Vec<Arc<Session>>
    where
        F: Fn(&Session) -> bool,
    {
        self.sessions
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Get the number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.sessions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SessionRegistry {
        SessionRegistry::new(Arc::new(SnowflakeGenerator::new(0).unwrap()))
    }

    fn mailbox() -> mpsc::Sender<Vec<u8>> {
        mpsc::channel(10).0
    }

    #[tokio::test]
    async fn test_add_remove() {
        let registry = registry();

        let session = registry.add(Snowflake::new(7), mailbox()).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get(session.id()).is_some());

        assert!(registry.remove(session.id()));
        assert_eq!(registry.len(), 0);

        // Second removal is a no-op
        assert!(!registry.remove(session.id()));
    }

    #[tokio::test]
    async fn test_cursor_updates_on_live_session() {
        let registry = registry();
        let session = registry.add(Snowflake::new(7), mailbox()).unwrap();

        assert!(registry.set_current_channel(session.id(), Snowflake::new(42)));
        assert!(registry.set_current_server(session.id(), Snowflake::new(9)));
        assert_eq!(session.current_channel(), Snowflake::new(42));
        assert_eq!(session.current_server(), Snowflake::new(9));
    }

    #[tokio::test]
    async fn test_cursor_update_on_vanished_session_reports_not_found() {
        let registry = registry();
        let session = registry.add(Snowflake::new(7), mailbox()).unwrap();
        registry.remove(session.id());

        assert!(!registry.set_current_channel(session.id(), Snowflake::new(42)));
        assert!(!registry.set_current_server(session.id(), Snowflake::new(9)));
    }

    #[tokio::test]
    async fn test_is_user_online_with_multiple_devices() {
        let registry = registry();
        let user = Snowflake::new(7);

        assert!(!registry.is_user_online(user));

        let s1 = registry.add(user, mailbox()).unwrap();
        let s2 = registry.add(user, mailbox()).unwrap();
        assert!(registry.is_user_online(user));

        registry.remove(s1.id());
        assert!(registry.is_user_online(user));

        registry.remove(s2.id());
        assert!(!registry.is_user_online(user));
    }

    #[tokio::test]
    async fn test_sessions_matching_snapshots() {
        let registry = registry();
        let a = registry.add(Snowflake::new(1), mailbox()).unwrap();
        let b = registry.add(Snowflake::new(2), mailbox()).unwrap();
        registry.add(Snowflake::new(3), mailbox()).unwrap();

        registry.set_current_channel(a.id(), Snowflake::new(7));
        registry.set_current_channel(b.id(), Snowflake::new(7));

        let matching = registry.sessions_matching(|s| s.current_channel() == Snowflake::new(7));
        assert_eq!(matching.len(), 2);
        assert!(matching.iter().all(|s| s.current_channel() == Snowflake::new(7)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_add_remove_is_consistent() {
        let registry = Arc::new(registry());
        let mut handles = Vec::new();

        // 8 tasks each add 50 sessions and remove half of them.
        for task in 0..8i64 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let mut kept = 0usize;
                for i in 0..50 {
                    let session = loop {
                        match registry.add(Snowflake::new(task), mpsc::channel(1).0) {
                            Ok(s) => break s,
                            // Generator can exhaust under burst load; retry
                            Err(_) => tokio::time::sleep(std::time::Duration::from_millis(1)).await,
                        }
                    };
                    if i % 2 == 0 {
                        assert!(registry.remove(session.id()));
                    } else {
                        kept += 1;
                    }
                }
                kept
            }));
        }

        let mut expected = 0;
        for handle in handles {
            expected += handle.await.unwrap();
        }

        assert_eq!(registry.len(), expected);
    }
}
