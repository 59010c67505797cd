//! PostgreSQL implementation of MessageStore

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use parley_core::entities::StoredMessage;
use parley_core::traits::{MessageStore, RepoResult};
use parley_core::value_objects::Snowflake;

use super::error::map_db_error;

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    channel_id: i64,
    user_id: i64,
    content: String,
    attachments: sqlx::types::Json<Vec<String>>,
}

impl From<MessageRow> for StoredMessage {
    fn from(row: MessageRow) -> Self {
        Self {
            id: Snowflake::new(row.id),
            channel_id: Snowflake::new(row.channel_id),
            user_id: Snowflake::new(row.user_id),
            text: row.content,
            attachments: row.attachments.0,
        }
    }
}

/// PostgreSQL implementation of MessageStore
#[derive(Clone)]
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    /// Create a new PgMessageStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    #[instrument(skip(self, text, attachments))]
    async fn insert_message(
        &self,
        id: Snowflake,
        channel_id: Snowflake,
        user_id: Snowflake,
        text: &str,
        attachments: &[String],
    ) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, channel_id, user_id, content, attachments)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id.into_inner())
        .bind(channel_id.into_inner())
        .bind(user_id.into_inner())
        .bind(text)
        .bind(sqlx::types::Json(attachments))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_message(&self, id: Snowflake, requester: Snowflake) -> RepoResult<Snowflake> {
        // Only the author may delete; a zero channel tells the caller the
        // delete did not happen.
        let channel_id: Option<i64> = sqlx::query_scalar(
            r#"
            DELETE FROM messages
            WHERE id = $1 AND user_id = $2
            RETURNING channel_id
            "#,
        )
        .bind(id.into_inner())
        .bind(requester.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Snowflake::new(channel_id.unwrap_or(0)))
    }

    #[instrument(skip(self))]
    async fn message_history(
        &self,
        channel_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<StoredMessage>> {
        let limit = limit.clamp(1, 100);

        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, channel_id, user_id, content, attachments
            FROM (
                SELECT id, channel_id, user_id, content, attachments
                FROM messages
                WHERE channel_id = $1
                ORDER BY id DESC
                LIMIT $2
            ) recent
            ORDER BY id ASC
            "#,
        )
        .bind(channel_id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(StoredMessage::from).collect())
    }
}
