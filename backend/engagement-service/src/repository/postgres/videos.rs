use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::domain::models::Video;
use crate::error::Result;
use crate::repository::traits::{
    NewVideo, PageWindow, SortDirection, VideoFilter, VideoOwnerStats, VideoSortField,
    VideoStore, VideoUpdate,
};

const VIDEO_COLUMNS: &str = "id, owner_id, title, description, video_url, thumbnail_url, \
     duration_seconds, view_count, is_published, created_at";

/// PostgreSQL store for Video entities
#[derive(Clone)]
pub struct PgVideoStore {
    pool: PgPool,
}

impl PgVideoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_filter(builder: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &VideoFilter) {
        builder.push(" WHERE 1 = 1");
        if filter.published_only {
            builder.push(" AND is_published = TRUE");
        }
        if let Some(owner_id) = filter.owner_id {
            builder.push(" AND owner_id = ").push_bind(owner_id);
        }
        if let Some(query) = &filter.text_query {
            let pattern = format!("%{}%", query);
            builder
                .push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

#[async_trait]
impl VideoStore for PgVideoStore {
    async fn create_video(&self, new: NewVideo) -> Result<Video> {
        let video = sqlx::query_as::<_, Video>(&format!(
            r#"
            INSERT INTO videos (owner_id, title, description, video_url, thumbnail_url, duration_seconds)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {VIDEO_COLUMNS}
            "#,
        ))
        .bind(new.owner_id)
        .bind(new.title)
        .bind(new.description)
        .bind(new.video_url)
        .bind(new.thumbnail_url)
        .bind(new.duration_seconds)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(&format!(
            r#"
            SELECT {VIDEO_COLUMNS}
            FROM videos
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    async fn get_videos(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Video>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let videos = sqlx::query_as::<_, Video>(&format!(
            r#"
            SELECT {VIDEO_COLUMNS}
            FROM videos
            WHERE id = ANY($1)
            "#,
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos.into_iter().map(|v| (v.id, v)).collect())
    }

    async fn update_video(&self, id: Uuid, update: VideoUpdate) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(&format!(
            r#"
            UPDATE videos
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                thumbnail_url = COALESCE($4, thumbnail_url)
            WHERE id = $1
            RETURNING {VIDEO_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(update.title)
        .bind(update.description)
        .bind(update.thumbnail_url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    async fn set_published(&self, id: Uuid, published: bool) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(&format!(
            r#"
            UPDATE videos
            SET is_published = $2
            WHERE id = $1
            RETURNING {VIDEO_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(published)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE videos
            SET view_count = view_count + 1
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_video(&self, id: Uuid) -> Result<bool> {
        // Likes are polymorphic (no FK), so dependent rows go in the same
        // transaction; comments and watch history cascade via schema FKs.
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM likes
            WHERE subject_kind = 'comment'
              AND subject_id IN (SELECT id FROM comments WHERE video_id = $1)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM likes
            WHERE subject_kind = 'video' AND subject_id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM videos
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

    async fn list_videos(
        &self,
        filter: &VideoFilter,
        sort: VideoSortField,
        dir: SortDirection,
        window: PageWindow,
    ) -> Result<(Vec<Video>, i64)> {
        let mut builder = QueryBuilder::new(format!("SELECT {VIDEO_COLUMNS} FROM videos"));
        Self::push_filter(&mut builder, filter);

        // Sort column comes from the allow-listed enum, never from raw input
        builder.push(format!(" ORDER BY {} {}", sort.column(), dir.as_sql()));
        if sort != VideoSortField::CreatedAt {
            builder.push(", created_at DESC");
        }
        builder.push(" LIMIT ").push_bind(window.limit);
        builder.push(" OFFSET ").push_bind(window.offset);

        let videos = builder
            .build_query_as::<Video>()
            .fetch_all(&self.pool)
            .await?;

        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM videos");
        Self::push_filter(&mut count_builder, filter);

        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok((videos, total))
    }

    async fn owner_stats(&self, owner_id: Uuid) -> Result<VideoOwnerStats> {
        let (video_count, total_views): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(view_count), 0)
            FROM videos
            WHERE owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(VideoOwnerStats {
            video_count,
            total_views,
        })
    }
}
