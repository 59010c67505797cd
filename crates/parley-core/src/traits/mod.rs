//! Ports - interfaces the gateway consumes, implemented by infrastructure

mod auth;
mod stores;

pub use auth::Authenticator;
pub use stores::{
    ChannelStore, MessageStore, RelationshipStore, RepoResult, ServerStore, UserStore,
};
