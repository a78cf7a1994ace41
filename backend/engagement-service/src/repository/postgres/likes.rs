use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::models::{LikeSubject, SubjectKind};
use crate::error::Result;
use crate::repository::traits::{LikeStore, PageWindow};

/// PostgreSQL store for Like facts
///
/// The unique index on (actor_id, subject_kind, subject_id) is the
/// serialization point for concurrent toggles.
#[derive(Clone)]
pub struct PgLikeStore {
    pool: PgPool,
}

impl PgLikeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeStore for PgLikeStore {
    async fn insert_if_absent(&self, actor_id: Uuid, subject: LikeSubject) -> Result<bool> {
        let inserted: Option<(Uuid,)> = sqlx::query_as(
            r#"
            INSERT INTO likes (actor_id, subject_kind, subject_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (actor_id, subject_kind, subject_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(actor_id)
        .bind(subject.kind().as_str())
        .bind(subject.id())
        .fetch_optional(&self.pool)
        .await?;

        Ok(inserted.is_some())
    }

    async fn remove(&self, actor_id: Uuid, subject: LikeSubject) -> Result<bool> {
        let affected = sqlx::query(
            r#"
            DELETE FROM likes
            WHERE actor_id = $1 AND subject_kind = $2 AND subject_id = $3
            "#,
        )
        .bind(actor_id)
        .bind(subject.kind().as_str())
        .bind(subject.id())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected > 0)
    }

    async fn exists(&self, actor_id: Uuid, subject: LikeSubject) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM likes
                WHERE actor_id = $1 AND subject_kind = $2 AND subject_id = $3
            )
            "#,
        )
        .bind(actor_id)
        .bind(subject.kind().as_str())
        .bind(subject.id())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn count(&self, subject: LikeSubject) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM likes
            WHERE subject_kind = $1 AND subject_id = $2
            "#,
        )
        .bind(subject.kind().as_str())
        .bind(subject.id())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn count_many(&self, kind: SubjectKind, ids: &[Uuid]) -> Result<HashMap<Uuid, i64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT subject_id, COUNT(*)
            FROM likes
            WHERE subject_kind = $1 AND subject_id = ANY($2)
            GROUP BY subject_id
            "#,
        )
        .bind(kind.as_str())
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let counted: HashMap<Uuid, i64> = rows.into_iter().collect();

        // Zero-fill subjects with no likes so callers never miss a key
        Ok(ids
            .iter()
            .map(|id| (*id, counted.get(id).copied().unwrap_or(0)))
            .collect())
    }

    async fn flags_for_actor(
        &self,
        actor_id: Uuid,
        kind: SubjectKind,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, bool>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let liked: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT subject_id
            FROM likes
            WHERE actor_id = $1 AND subject_kind = $2 AND subject_id = ANY($3)
            "#,
        )
        .bind(actor_id)
        .bind(kind.as_str())
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let liked_set: HashSet<Uuid> = liked.into_iter().collect();

        Ok(ids.iter().map(|id| (*id, liked_set.contains(id))).collect())
    }

    async fn count_for_video_owner(&self, owner_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM likes l
            JOIN videos v ON v.id = l.subject_id
            WHERE l.subject_kind = 'video' AND v.owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn liked_subjects(
        &self,
        actor_id: Uuid,
        kind: SubjectKind,
        window: PageWindow,
    ) -> Result<(Vec<(Uuid, DateTime<Utc>)>, i64)> {
        let rows: Vec<(Uuid, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT subject_id, created_at
            FROM likes
            WHERE actor_id = $1 AND subject_kind = $2
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(actor_id)
        .bind(kind.as_str())
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM likes
            WHERE actor_id = $1 AND subject_kind = $2
            "#,
        )
        .bind(actor_id)
        .bind(kind.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok((rows, total))
    }
}
