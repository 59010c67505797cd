//! PostgreSQL store implementations

mod channel;
mod error;
mod message;
mod relationship;
mod server;
mod user;

pub use channel::PgChannelStore;
pub use message::PgMessageStore;
pub use relationship::PgRelationshipStore;
pub use server::PgServerStore;
pub use user::PgUserStore;
