use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::repository::traits::{PageWindow, SubscriptionStore};

/// PostgreSQL store for Subscription facts
///
/// The unique index on (subscriber_id, channel_id) is the serialization
/// point for concurrent toggles.
#[derive(Clone)]
pub struct PgSubscriptionStore {
    pool: PgPool,
}

impl PgSubscriptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for PgSubscriptionStore {
    async fn insert_if_absent(&self, subscriber_id: Uuid, channel_id: Uuid) -> Result<bool> {
        let inserted: Option<(Uuid,)> = sqlx::query_as(
            r#"
            INSERT INTO subscriptions (subscriber_id, channel_id)
            VALUES ($1, $2)
            ON CONFLICT (subscriber_id, channel_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(subscriber_id)
        .bind(channel_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(inserted.is_some())
    }

    async fn remove(&self, subscriber_id: Uuid, channel_id: Uuid) -> Result<bool> {
        let affected = sqlx::query(
            r#"
            DELETE FROM subscriptions
            WHERE subscriber_id = $1 AND channel_id = $2
            "#,
        )
        .bind(subscriber_id)
        .bind(channel_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected > 0)
    }

    async fn exists(&self, subscriber_id: Uuid, channel_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM subscriptions
                WHERE subscriber_id = $1 AND channel_id = $2
            )
            "#,
        )
        .bind(subscriber_id)
        .bind(channel_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn count_subscribers(&self, channel_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM subscriptions
            WHERE channel_id = $1
            "#,
        )
        .bind(channel_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn subscribers_of(
        &self,
        channel_id: Uuid,
        window: PageWindow,
    ) -> Result<(Vec<(Uuid, DateTime<Utc>)>, i64)> {
        let rows: Vec<(Uuid, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT subscriber_id, created_at
            FROM subscriptions
            WHERE channel_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(channel_id)
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = self.count_subscribers(channel_id).await?;

        Ok((rows, total))
    }

    async fn channels_of(
        &self,
        subscriber_id: Uuid,
        window: PageWindow,
    ) -> Result<(Vec<(Uuid, DateTime<Utc>)>, i64)> {
        let rows: Vec<(Uuid, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT channel_id, created_at
            FROM subscriptions
            WHERE subscriber_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(subscriber_id)
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM subscriptions
            WHERE subscriber_id = $1
            "#,
        )
        .bind(subscriber_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows, total))
    }

    async fn flags_for_subscriber(
        &self,
        subscriber_id: Uuid,
        channel_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, bool>> {
        if channel_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let subscribed: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT channel_id
            FROM subscriptions
            WHERE subscriber_id = $1 AND channel_id = ANY($2)
            "#,
        )
        .bind(subscriber_id)
        .bind(channel_ids)
        .fetch_all(&self.pool)
        .await?;

        let subscribed_set: HashSet<Uuid> = subscribed.into_iter().collect();

        Ok(channel_ids
            .iter()
            .map(|id| (*id, subscribed_set.contains(id)))
            .collect())
    }

    async fn flags_for_channel(
        &self,
        channel_id: Uuid,
        subscriber_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, bool>> {
        if subscriber_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let subscribed: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT subscriber_id
            FROM subscriptions
            WHERE channel_id = $1 AND subscriber_id = ANY($2)
            "#,
        )
        .bind(channel_id)
        .bind(subscriber_ids)
        .fetch_all(&self.pool)
        .await?;

        let subscribed_set: HashSet<Uuid> = subscribed.into_iter().collect();

        Ok(subscriber_ids
            .iter()
            .map(|id| (*id, subscribed_set.contains(id)))
            .collect())
    }
}
