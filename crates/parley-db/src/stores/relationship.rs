//! PostgreSQL implementation of RelationshipStore

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use parley_core::entities::UserProfile;
use parley_core::error::DomainError;
use parley_core::traits::{RelationshipStore, RepoResult};
use parley_core::value_objects::Snowflake;

use super::error::{map_db_error, map_unique_violation};
use super::user::UserRow;

/// PostgreSQL implementation of RelationshipStore
#[derive(Clone)]
pub struct PgRelationshipStore {
    pool: PgPool,
}

impl PgRelationshipStore {
    /// Create a new PgRelationshipStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelationshipStore for PgRelationshipStore {
    #[instrument(skip(self))]
    async fn insert_friendship(&self, user_id: Snowflake, friend_id: Snowflake) -> RepoResult<()> {
        let blocked: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM blocks
                WHERE (user_id = $1 AND blocked_id = $2)
                   OR (user_id = $2 AND blocked_id = $1)
            )
            "#,
        )
        .bind(user_id.into_inner())
        .bind(friend_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        if blocked {
            return Err(DomainError::UserBlocked);
        }

        // Friendships are symmetric; store the pair in canonical order.
        let (a, b) = ordered(user_id, friend_id);

        sqlx::query(
            r#"
            INSERT INTO friendships (user_a, user_b)
            VALUES ($1, $2)
            "#,
        )
        .bind(a.into_inner())
        .bind(b.into_inner())
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyFriends))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_friendship(&self, user_id: Snowflake, friend_id: Snowflake) -> RepoResult<()> {
        let (a, b) = ordered(user_id, friend_id);

        sqlx::query("DELETE FROM friendships WHERE user_a = $1 AND user_b = $2")
            .bind(a.into_inner())
            .bind(b.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn insert_block(&self, user_id: Snowflake, blocked_id: Snowflake) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r#"
            INSERT INTO blocks (user_id, blocked_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id.into_inner())
        .bind(blocked_id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        // Blocking severs any existing friendship.
        let (a, b) = ordered(user_id, blocked_id);
        sqlx::query("DELETE FROM friendships WHERE user_a = $1 AND user_b = $2")
            .bind(a.into_inner())
            .bind(b.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn friend_list(&self, user_id: Snowflake) -> RepoResult<Vec<UserProfile>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.display_name, u.status
            FROM users u
            JOIN friendships f
              ON (f.user_a = $1 AND f.user_b = u.id)
              OR (f.user_b = $1 AND f.user_a = u.id)
            ORDER BY u.id ASC
            "#,
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(UserProfile::from).collect())
    }
}

fn ordered(a: Snowflake, b: Snowflake) -> (Snowflake, Snowflake) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_pair_is_canonical() {
        let lo = Snowflake::new(1);
        let hi = Snowflake::new(2);

        assert_eq!(ordered(lo, hi), (lo, hi));
        assert_eq!(ordered(hi, lo), (lo, hi));
    }
}
