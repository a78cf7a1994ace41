use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::models::Comment;
use crate::error::Result;
use crate::repository::traits::{CommentStore, NewComment, PageWindow};

const COMMENT_COLUMNS: &str = "id, video_id, owner_id, content, created_at, updated_at";

/// PostgreSQL store for Comment entities
#[derive(Clone)]
pub struct PgCommentStore {
    pool: PgPool,
}

impl PgCommentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentStore for PgCommentStore {
    async fn create_comment(&self, new: NewComment) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (video_id, owner_id, content)
            VALUES ($1, $2, $3)
            RETURNING {COMMENT_COLUMNS}
            "#,
        ))
        .bind(new.video_id)
        .bind(new.owner_id)
        .bind(new.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn update_content(&self, id: Uuid, content: String) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            UPDATE comments
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {COMMENT_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool> {
        // Likes are polymorphic (no FK); remove them in the same transaction
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM likes
            WHERE subject_kind = 'comment' AND subject_id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM comments
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

    async fn list_for_video(
        &self,
        video_id: Uuid,
        window: PageWindow,
    ) -> Result<(Vec<Comment>, i64)> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments
            WHERE video_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        ))
        .bind(video_id)
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM comments
            WHERE video_id = $1
            "#,
        )
        .bind(video_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((comments, total))
    }
}
