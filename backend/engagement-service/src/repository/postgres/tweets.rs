use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::models::Tweet;
use crate::error::Result;
use crate::repository::traits::{NewTweet, PageWindow, TweetStore};

const TWEET_COLUMNS: &str = "id, owner_id, content, created_at, updated_at";

/// PostgreSQL store for Tweet entities
#[derive(Clone)]
pub struct PgTweetStore {
    pool: PgPool,
}

impl PgTweetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TweetStore for PgTweetStore {
    async fn create_tweet(&self, new: NewTweet) -> Result<Tweet> {
        let tweet = sqlx::query_as::<_, Tweet>(&format!(
            r#"
            INSERT INTO tweets (owner_id, content)
            VALUES ($1, $2)
            RETURNING {TWEET_COLUMNS}
            "#,
        ))
        .bind(new.owner_id)
        .bind(new.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(tweet)
    }

    async fn get_tweet(&self, id: Uuid) -> Result<Option<Tweet>> {
        let tweet = sqlx::query_as::<_, Tweet>(&format!(
            r#"
            SELECT {TWEET_COLUMNS}
            FROM tweets
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tweet)
    }

    async fn get_tweets(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Tweet>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let tweets = sqlx::query_as::<_, Tweet>(&format!(
            r#"
            SELECT {TWEET_COLUMNS}
            FROM tweets
            WHERE id = ANY($1)
            "#,
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(tweets.into_iter().map(|t| (t.id, t)).collect())
    }

    async fn update_content(&self, id: Uuid, content: String) -> Result<Option<Tweet>> {
        let tweet = sqlx::query_as::<_, Tweet>(&format!(
            r#"
            UPDATE tweets
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {TWEET_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tweet)
    }

    async fn delete_tweet(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM likes
            WHERE subject_kind = 'tweet' AND subject_id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM tweets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        Ok(deleted > 0)
    }

    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        window: PageWindow,
    ) -> Result<(Vec<Tweet>, i64)> {
        let tweets = sqlx::query_as::<_, Tweet>(&format!(
            r#"
            SELECT {TWEET_COLUMNS}
            FROM tweets
            WHERE owner_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        ))
        .bind(owner_id)
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM tweets
            WHERE owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((tweets, total))
    }
}
