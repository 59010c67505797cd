//! Single-task broadcast router
//!
//! Drains the bounded intent queue and fans each frame out to matching
//! sessions. Delivery uses `try_send`: a full mailbox means that frame is
//! dropped for that session rather than stalling everyone else.

use super::BroadcastIntent;
use crate::connection::SessionRegistry;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Drains broadcast intents and delivers them to session mailboxes
pub struct BroadcastRouter {
    registry: Arc<SessionRegistry>,
    rx: mpsc::Receiver<BroadcastIntent>,
}

impl BroadcastRouter {
    /// Create a router over an intent queue
    #[must_use]
    pub fn new(registry: Arc<SessionRegistry>, rx: mpsc::Receiver<BroadcastIntent>) -> Self {
        Self { registry, rx }
    }

    /// Spawn the router task. It exits when every intent sender is dropped.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        tracing::debug!("Broadcast router started");

        while let Some(intent) = self.rx.recv().await {
            self.deliver(&intent);
        }

        tracing::debug!("Broadcast router stopped");
    }

    fn deliver(&self, intent: &BroadcastIntent) {
        // Snapshot first so delivery never holds registry locks.
        let targets = self.registry.sessions_matching(|s| intent.scope.matches(s));

        let mut sent = 0usize;
        let mut dropped = 0usize;
        for session in &targets {
            match session.try_send(intent.frame.clone()) {
                Ok(()) => sent += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    dropped += 1;
                    tracing::warn!(
                        session_id = %session.id(),
                        user_id = %session.user_id(),
                        type_code = %intent.type_code,
                        "Mailbox full, dropping broadcast frame"
                    );
                }
                // Write pump already gone; the registry entry is on its way out.
                Err(mpsc::error::TrySendError::Closed(_)) => dropped += 1,
            }
        }

        tracing::debug!(
            type_code = %intent.type_code,
            targets = targets.len(),
            sent,
            dropped,
            "Broadcast delivered"
        );
    }
}
