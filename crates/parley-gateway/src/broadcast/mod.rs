//! Broadcast fan-out
//!
//! Handlers never touch other sessions directly. They emit a
//! `BroadcastIntent` describing the audience; a single router task drains
//! the intent queue and delivers the pre-encoded frame to every matching
//! session's mailbox.

mod intent;
mod router;

pub use intent::{BroadcastIntent, Scope};
pub use router::BroadcastRouter;
