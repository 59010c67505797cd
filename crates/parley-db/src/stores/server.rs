//! PostgreSQL implementation of ServerStore

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use parley_core::entities::ServerSummary;
use parley_core::traits::{RepoResult, ServerStore};
use parley_core::value_objects::Snowflake;

use super::error::map_db_error;

#[derive(Debug, sqlx::FromRow)]
struct ServerRow {
    id: i64,
    owner_id: i64,
    name: String,
}

impl From<ServerRow> for ServerSummary {
    fn from(row: ServerRow) -> Self {
        Self {
            id: Snowflake::new(row.id),
            owner_id: Snowflake::new(row.owner_id),
            name: row.name,
        }
    }
}

/// PostgreSQL implementation of ServerStore
#[derive(Clone)]
pub struct PgServerStore {
    pool: PgPool,
}

impl PgServerStore {
    /// Create a new PgServerStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServerStore for PgServerStore {
    #[instrument(skip(self, name))]
    async fn insert_server(
        &self,
        id: Snowflake,
        owner_id: Snowflake,
        name: &str,
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r#"
            INSERT INTO servers (id, owner_id, name)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id.into_inner())
        .bind(owner_id.into_inner())
        .bind(name)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        // The owner is always a member of their own server.
        sqlx::query(
            r#"
            INSERT INTO server_members (server_id, user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(id.into_inner())
        .bind(owner_id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_server(&self, id: Snowflake) -> RepoResult<()> {
        // Channels, messages, members and invites cascade via FK constraints.
        sqlx::query("DELETE FROM servers WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn server_list(&self, user_id: Snowflake) -> RepoResult<Vec<ServerSummary>> {
        let rows = sqlx::query_as::<_, ServerRow>(
            r#"
            SELECT s.id, s.owner_id, s.name
            FROM servers s
            JOIN server_members m ON m.server_id = s.id
            WHERE m.user_id = $1
            ORDER BY s.id ASC
            "#,
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(ServerSummary::from).collect())
    }

    #[instrument(skip(self))]
    async fn confirm_membership(
        &self,
        user_id: Snowflake,
        server_id: Snowflake,
    ) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM server_members
                WHERE server_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(server_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn server_owner(&self, server_id: Snowflake) -> RepoResult<Snowflake> {
        let owner: Option<i64> = sqlx::query_scalar("SELECT owner_id FROM servers WHERE id = $1")
            .bind(server_id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(Snowflake::new(owner.unwrap_or(0)))
    }

    #[instrument(skip(self))]
    async fn member_list(&self, server_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        let rows: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT user_id FROM server_members
            WHERE server_id = $1
            ORDER BY user_id ASC
            "#,
        )
        .bind(server_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Snowflake::new).collect())
    }

    #[instrument(skip(self, code))]
    async fn insert_invite(
        &self,
        id: Snowflake,
        server_id: Snowflake,
        code: &str,
    ) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO invites (id, server_id, code)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id.into_inner())
        .bind(server_id.into_inner())
        .bind(code)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}
