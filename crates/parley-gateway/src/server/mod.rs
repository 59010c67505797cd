//! Process wiring: state assembly, router, and server loop

mod handler;
mod state;

pub use state::{GatewayState, Stores};

use crate::broadcast::BroadcastRouter;
use crate::connection::SessionRegistry;
use axum::routing::get;
use axum::Router;
use parley_common::{AppConfig, AppError, AppResult, GatewayConfig, JwtAuthenticator, JwtService};
use parley_core::SnowflakeGenerator;
use parley_db::{
    PgChannelStore, PgMessageStore, PgRelationshipStore, PgServerStore, PgUserStore,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

/// Create the gateway router
pub fn create_router(state: GatewayState) -> Router {
    Router::new()
        .route("/ws", get(handler::gateway_handler))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Create the full application with middleware
pub fn create_app(state: GatewayState) -> Router {
    create_router(state).layer(TraceLayer::new_for_http())
}

async fn health_check() -> &'static str {
    "OK"
}

/// Wire up the database pool, stores, ID generator, registry, and broadcast
/// router. A worker ID outside the 10-bit range is fatal here, before the
/// listener ever binds.
async fn create_gateway_state(config: &AppConfig) -> AppResult<GatewayState> {
    let pool = parley_db::create_pool(&parley_db::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        ..Default::default()
    })
    .await
    .map_err(|e| AppError::Database(e.to_string()))?;
    tracing::info!("Database pool ready");

    let stores = Stores {
        messages: Arc::new(PgMessageStore::new(pool.clone())),
        servers: Arc::new(PgServerStore::new(pool.clone())),
        channels: Arc::new(PgChannelStore::new(pool.clone())),
        relationships: Arc::new(PgRelationshipStore::new(pool.clone())),
        users: Arc::new(PgUserStore::new(pool)),
    };

    let auth = Arc::new(JwtAuthenticator::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
    )));

    let ids = Arc::new(
        SnowflakeGenerator::new(config.snowflake.worker_id)
            .map_err(|e| AppError::Config(e.to_string()))?,
    );

    let registry = SessionRegistry::new_shared(ids.clone());
    let (intent_tx, intent_rx) = mpsc::channel(config.gateway.intent_queue_capacity);
    BroadcastRouter::new(registry.clone(), intent_rx).spawn();

    Ok(GatewayState::new(
        registry,
        stores,
        ids,
        auth,
        intent_tx,
        config.gateway.clone(),
    ))
}

async fn run_server(config: &GatewayConfig, app: Router) -> AppResult<()> {
    let address = config.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    tracing::info!(address = %address, "Gateway listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Internal(e.into()))
}

/// Assemble and run the gateway until the process is stopped
pub async fn run(config: AppConfig) -> AppResult<()> {
    let state = create_gateway_state(&config).await?;
    let app = create_app(state);
    run_server(&config.gateway, app).await
}
