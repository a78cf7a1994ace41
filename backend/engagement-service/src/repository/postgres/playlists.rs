use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::models::Playlist;
use crate::error::Result;
use crate::repository::traits::{NewPlaylist, PlaylistStore, PlaylistUpdate};

const PLAYLIST_COLUMNS: &str =
    "id, owner_id, name, description, video_slot, created_at, updated_at";

/// PostgreSQL store for single-slot playlists
#[derive(Clone)]
pub struct PgPlaylistStore {
    pool: PgPool,
}

impl PgPlaylistStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaylistStore for PgPlaylistStore {
    async fn create_playlist(&self, new: NewPlaylist) -> Result<Playlist> {
        let playlist = sqlx::query_as::<_, Playlist>(&format!(
            r#"
            INSERT INTO playlists (owner_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING {PLAYLIST_COLUMNS}
            "#,
        ))
        .bind(new.owner_id)
        .bind(new.name)
        .bind(new.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(playlist)
    }

    async fn get_playlist(&self, id: Uuid) -> Result<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(&format!(
            r#"
            SELECT {PLAYLIST_COLUMNS}
            FROM playlists
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(playlist)
    }

    async fn update_meta(&self, id: Uuid, update: PlaylistUpdate) -> Result<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(&format!(
            r#"
            UPDATE playlists
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PLAYLIST_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(playlist)
    }

    async fn delete_playlist(&self, id: Uuid) -> Result<bool> {
        let affected = sqlx::query(
            r#"
            DELETE FROM playlists
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected > 0)
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Playlist>> {
        let playlists = sqlx::query_as::<_, Playlist>(&format!(
            r#"
            SELECT {PLAYLIST_COLUMNS}
            FROM playlists
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(playlists)
    }

    async fn set_slot(&self, id: Uuid, video_id: Uuid) -> Result<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(&format!(
            r#"
            UPDATE playlists
            SET video_slot = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {PLAYLIST_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(playlist)
    }

    async fn clear_slot(&self, id: Uuid) -> Result<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(&format!(
            r#"
            UPDATE playlists
            SET video_slot = NULL, updated_at = NOW()
            WHERE id = $1
            RETURNING {PLAYLIST_COLUMNS}
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(playlist)
    }
}
