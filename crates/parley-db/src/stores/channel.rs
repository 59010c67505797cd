//! PostgreSQL implementation of ChannelStore

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use parley_core::entities::ChannelSummary;
use parley_core::error::DomainError;
use parley_core::traits::{ChannelStore, RepoResult};
use parley_core::value_objects::Snowflake;

use super::error::map_db_error;

#[derive(Debug, sqlx::FromRow)]
struct ChannelRow {
    id: i64,
    server_id: i64,
    name: String,
}

impl From<ChannelRow> for ChannelSummary {
    fn from(row: ChannelRow) -> Self {
        Self {
            id: Snowflake::new(row.id),
            server_id: Snowflake::new(row.server_id),
            name: row.name,
        }
    }
}

/// PostgreSQL implementation of ChannelStore
#[derive(Clone)]
pub struct PgChannelStore {
    pool: PgPool,
}

impl PgChannelStore {
    /// Create a new PgChannelStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChannelStore for PgChannelStore {
    #[instrument(skip(self, name))]
    async fn insert_channel(
        &self,
        id: Snowflake,
        server_id: Snowflake,
        name: &str,
    ) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO channels (id, server_id, name)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id.into_inner())
        .bind(server_id.into_inner())
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn channel_list(&self, server_id: Snowflake) -> RepoResult<Vec<ChannelSummary>> {
        let rows = sqlx::query_as::<_, ChannelRow>(
            r#"
            SELECT id, server_id, name
            FROM channels
            WHERE server_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(server_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(ChannelSummary::from).collect())
    }

    #[instrument(skip(self))]
    async fn server_of_channel(&self, channel_id: Snowflake) -> RepoResult<Snowflake> {
        let server: Option<i64> = sqlx::query_scalar("SELECT server_id FROM channels WHERE id = $1")
            .bind(channel_id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        server
            .map(Snowflake::new)
            .ok_or(DomainError::ChannelNotFound(channel_id))
    }
}
