use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::models::User;
use crate::domain::views::UserProfile;
use crate::error::{AppError, Result};
use crate::repository::traits::{NewUser, PageWindow, UserStore};

/// PostgreSQL store for User entities and watch history
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, new: NewUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, display_name, avatar_url)
            VALUES (LOWER($1), LOWER($2), $3, $4)
            RETURNING id, username, email, display_name, avatar_url, created_at
            "#,
        )
        .bind(new.username)
        .bind(new.email)
        .bind(new.display_name)
        .bind(new.avatar_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("username or email already taken".to_string())
            }
            _ => AppError::from(e),
        })?;

        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, display_name, avatar_url, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn profiles(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserProfile>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(Uuid, String, String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT id, username, display_name, avatar_url
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, username, display_name, avatar_url)| {
                (
                    id,
                    UserProfile {
                        id,
                        username,
                        display_name,
                        avatar_url,
                    },
                )
            })
            .collect())
    }

    async fn record_watch(&self, user_id: Uuid, video_id: Uuid) -> Result<()> {
        // Re-watching moves the entry to the front instead of duplicating it
        sqlx::query(
            r#"
            INSERT INTO watch_history (user_id, video_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, video_id) DO UPDATE
            SET watched_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(video_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn watch_history(
        &self,
        user_id: Uuid,
        window: PageWindow,
    ) -> Result<(Vec<(Uuid, DateTime<Utc>)>, i64)> {
        let rows: Vec<(Uuid, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT video_id, watched_at
            FROM watch_history
            WHERE user_id = $1
            ORDER BY watched_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM watch_history
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows, total))
    }
}
