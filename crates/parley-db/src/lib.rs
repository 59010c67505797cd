//! # parley-db
//!
//! PostgreSQL implementations of the store ports defined in `parley-core`,
//! plus connection pool management. Queries here are deliberately narrow:
//! the gateway only ever reaches storage through the port traits.

pub mod pool;
pub mod stores;

// Re-export commonly used types
pub use pool::{create_pool, DatabaseConfig, PgPool};
pub use stores::{
    PgChannelStore, PgMessageStore, PgRelationshipStore, PgServerStore, PgUserStore,
};
