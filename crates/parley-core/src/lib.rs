//! # parley-core
//!
//! Domain layer containing the snowflake ID generator, read-model entities,
//! store ports, and domain errors. This crate has zero dependencies on
//! infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    generate_invite_code, ChannelSummary, ServerSummary, StoredMessage, UserProfile,
};
pub use error::DomainError;
pub use traits::{
    Authenticator, ChannelStore, MessageStore, RelationshipStore, RepoResult, ServerStore,
    UserStore,
};
pub use value_objects::{Snowflake, SnowflakeError, SnowflakeGenerator, SnowflakeParseError};
