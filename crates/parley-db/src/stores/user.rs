//! PostgreSQL implementation of UserStore

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use parley_core::entities::UserProfile;
use parley_core::error::DomainError;
use parley_core::traits::{RepoResult, UserStore};
use parley_core::value_objects::Snowflake;

use super::error::map_db_error;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: i64,
    pub display_name: String,
    pub status: Option<String>,
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        Self {
            id: Snowflake::new(row.id),
            display_name: row.display_name,
            status: row.status,
        }
    }
}

/// PostgreSQL implementation of UserStore
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new PgUserStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip(self))]
    async fn profile(&self, user_id: Snowflake) -> RepoResult<UserProfile> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, display_name, status
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(UserProfile::from)
            .ok_or(DomainError::UserNotFound(user_id))
    }

    #[instrument(skip(self, display_name, status))]
    async fn update_profile(
        &self,
        user_id: Snowflake,
        display_name: Option<&str>,
        status: Option<&str>,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET display_name = COALESCE($2, display_name),
                status = COALESCE($3, status)
            WHERE id = $1
            "#,
        )
        .bind(user_id.into_inner())
        .bind(display_name)
        .bind(status)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(user_id));
        }

        Ok(())
    }
}
