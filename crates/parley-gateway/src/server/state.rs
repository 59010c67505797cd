//! Shared gateway state
//!
//! One `GatewayState` per process, cloned into every connection task. All
//! fields sit behind a single `Arc`; cloning is cheap.

use crate::broadcast::BroadcastIntent;
use crate::connection::SessionRegistry;
use parley_common::GatewayConfig;
use parley_core::traits::{
    Authenticator, ChannelStore, MessageStore, RelationshipStore, ServerStore, UserStore,
};
use parley_core::SnowflakeGenerator;
use std::sync::Arc;
use tokio::sync::mpsc;

/// The persistence ports the gateway dispatches against
#[derive(Clone)]
pub struct Stores {
    pub messages: Arc<dyn MessageStore>,
    pub servers: Arc<dyn ServerStore>,
    pub channels: Arc<dyn ChannelStore>,
    pub relationships: Arc<dyn RelationshipStore>,
    pub users: Arc<dyn UserStore>,
}

struct Inner {
    registry: Arc<SessionRegistry>,
    stores: Stores,
    ids: Arc<SnowflakeGenerator>,
    auth: Arc<dyn Authenticator>,
    intents: mpsc::Sender<BroadcastIntent>,
    config: GatewayConfig,
}

/// Shared application state for the gateway
#[derive(Clone)]
pub struct GatewayState {
    inner: Arc<Inner>,
}

impl GatewayState {
    /// Assemble the state from its collaborators
    #[must_use]
    pub fn new(
        registry: Arc<SessionRegistry>,
        stores: Stores,
        ids: Arc<SnowflakeGenerator>,
        auth: Arc<dyn Authenticator>,
        intents: mpsc::Sender<BroadcastIntent>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry,
                stores,
                ids,
                auth,
                intents,
                config,
            }),
        }
    }

    /// Get the session registry
    #[must_use]
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.inner.registry
    }

    /// Get the persistence ports
    #[must_use]
    pub fn stores(&self) -> &Stores {
        &self.inner.stores
    }

    /// Get the snowflake generator
    #[must_use]
    pub fn ids(&self) -> &Arc<SnowflakeGenerator> {
        &self.inner.ids
    }

    /// Get the authenticator
    #[must_use]
    pub fn auth(&self) -> &Arc<dyn Authenticator> {
        &self.inner.auth
    }

    /// Get the broadcast intent queue
    #[must_use]
    pub fn intents(&self) -> &mpsc::Sender<BroadcastIntent> {
        &self.inner.intents
    }

    /// Get the gateway tuning
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }
}
