//! One-shot close signal
//!
//! Shared by a connection's read and write pumps. Whichever side detects a
//! terminal condition first fires the signal; the second trigger is a no-op,
//! which keeps connection teardown idempotent.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

/// One-shot close signal for a connection's task pair
pub struct CloseSignal {
    fired: AtomicBool,
    tx: watch::Sender<bool>,
}

impl CloseSignal {
    /// Create an unfired signal
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            fired: AtomicBool::new(false),
            tx,
        }
    }

    /// Fire the signal. Returns true only for the first caller.
    pub fn trigger(&self) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            return false;
        }
        // No listeners left is fine; the tasks already exited.
        let _ = self.tx.send(true);
        true
    }

    /// Check whether the signal has fired
    pub fn is_triggered(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Create a listener for one of the pumps
    #[must_use]
    pub fn listener(&self) -> CloseListener {
        CloseListener {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for CloseSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits for a `CloseSignal` to fire
pub struct CloseListener {
    rx: watch::Receiver<bool>,
}

impl CloseListener {
    /// Wait until the signal fires (or the signal is dropped)
    pub async fn closed(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}
