//! Connection management
//!
//! The per-connection session record, the concurrent session registry, and
//! the one-shot close signal shared by a connection's read/write pumps.

mod close;
mod registry;
mod session;

pub use close::{CloseListener, CloseSignal};
pub use registry::SessionRegistry;
pub use session::{Session, LOBBY_SERVER, NO_CHANNEL};
