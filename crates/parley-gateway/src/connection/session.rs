//! Individual connection session
//!
//! One `Session` per live connection. The registry owns lifecycle; cursor
//! fields are only written through registry operations; the mailbox decouples
//! producers (direct replies, broadcast fan-out) from the single write pump.

use parley_core::Snowflake;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Default "viewing no channel" cursor value
pub const NO_CHANNEL: Snowflake = Snowflake::new(0);

/// The lobby server every fresh session starts in
pub const LOBBY_SERVER: Snowflake = Snowflake::new(1);

/// A single live connection
pub struct Session {
    /// Unique session ID, generated at connect time
    id: Snowflake,

    /// Authenticated user ID, fixed for the session's lifetime
    user_id: Snowflake,

    /// Channel the client is currently viewing (0 = none)
    current_channel: AtomicI64,

    /// Server the client is currently viewing
    current_server: AtomicI64,

    /// Bounded outbound mailbox feeding the write pump
    mailbox: mpsc::Sender<Vec<u8>>,

    /// Connection creation time
    created_at: Instant,
}

impl Session {
    /// Create a new session starting in the lobby with no channel selected
    pub fn new(id: Snowflake, user_id: Snowflake, mailbox: mpsc::Sender<Vec<u8>>) -> Arc<Self> {
        Arc::new(Self {
            id,
            user_id,
            current_channel: AtomicI64::new(NO_CHANNEL.into_inner()),
            current_server: AtomicI64::new(LOBBY_SERVER.into_inner()),
            mailbox,
            created_at: Instant::now(),
        })
    }

    /// Get the session ID
    pub fn id(&self) -> Snowflake {
        self.id
    }

    /// Get the user ID
    pub fn user_id(&self) -> Snowflake {
        self.user_id
    }

    /// Get the channel the client is currently viewing
    pub fn current_channel(&self) -> Snowflake {
        Snowflake::new(self.current_channel.load(Ordering::Acquire))
    }

    /// Get the server the client is currently viewing
    pub fn current_server(&self) -> Snowflake {
        Snowflake::new(self.current_server.load(Ordering::Acquire))
    }

    pub(crate) fn set_current_channel(&self, channel_id: Snowflake) {
        self.current_channel
            .store(channel_id.into_inner(), Ordering::Release);
    }

    pub(crate) fn set_current_server(&self, server_id: Snowflake) {
        self.current_server
            .store(server_id.into_inner(), Ordering::Release);
    }

    /// Queue an encoded frame, waiting for mailbox space
    pub async fn send(&self, frame: Vec<u8>) -> Result<(), mpsc::error::SendError<Vec<u8>>> {
        self.mailbox.send(frame).await
    }

    /// Queue an encoded frame without blocking (used by the router)
    pub fn try_send(&self, frame: Vec<u8>) -> Result<(), mpsc::error::TrySendError<Vec<u8>>> {
        self.mailbox.try_send(frame)
    }

    /// Check if the write pump has gone away
    pub fn is_closed(&self) -> bool {
        self.mailbox.is_closed()
    }

    /// Get connection age
    pub fn age(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("current_channel", &self.current_channel())
            .field("current_server", &self.current_server())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_defaults() {
        let (tx, _rx) = mpsc::channel(10);
        let session = Session::new(Snowflake::new(100), Snowflake::new(7), tx);

        assert_eq!(session.id(), Snowflake::new(100));
        assert_eq!(session.user_id(), Snowflake::new(7));
        assert_eq!(session.current_channel(), NO_CHANNEL);
        assert_eq!(session.current_server(), LOBBY_SERVER);
        assert!(!session.is_closed());
    }

    #[tokio::test]
    async fn test_cursor_updates() {
        let (tx, _rx) = mpsc::channel(10);
        let session = Session::new(Snowflake::new(100), Snowflake::new(7), tx);

        session.set_current_channel(Snowflake::new(42));
        session.set_current_server(Snowflake::new(9));

        assert_eq!(session.current_channel(), Snowflake::new(42));
        assert_eq!(session.current_server(), Snowflake::new(9));
    }

    #[tokio::test]
    async fn test_mailbox_order_is_fifo() {
        let (tx, mut rx) = mpsc::channel(10);
        let session = Session::new(Snowflake::new(100), Snowflake::new(7), tx);

        session.send(vec![1]).await.unwrap();
        session.send(vec![2]).await.unwrap();
        session.send(vec![3]).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), vec![1]);
        assert_eq!(rx.recv().await.unwrap(), vec![2]);
        assert_eq!(rx.recv().await.unwrap(), vec![3]);
    }

    #[tokio::test]
    async fn test_try_send_reports_full_mailbox() {
        let (tx, _rx) = mpsc::channel(1);
        let session = Session::new(Snowflake::new(100), Snowflake::new(7), tx);

        session.try_send(vec![1]).unwrap();
        assert!(matches!(
            session.try_send(vec![2]),
            Err(mpsc::error::TrySendError::Full(_))
        ));
    }

    #[tokio::test]
    async fn test_is_closed_after_receiver_drop() {
        let (tx, rx) = mpsc::channel(1);
        let session = Session::new(Snowflake::new(100), Snowflake::new(7), tx);

        drop(rx);
        assert!(session.is_closed());
        assert!(session.send(vec![1]).await.is_err());
    }
}
