//! Playlist CRUD and the single-slot membership engine.
//!
//! A playlist holds at most one video. `set_video` overwrites the slot
//! (displacing any previous video) and is a no-op when the slot already
//! holds the requested id; `clear_video` is a no-op when the slot is empty.

use serde::Deserialize;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::domain::models::Playlist;
use crate::error::{AppError, Result};
use crate::repository::{NewPlaylist, PlaylistUpdate, Stores};
use crate::services::ownership::assert_owner;

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePlaylistRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct PlaylistService {
    stores: Stores,
}

impl PlaylistService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn create_playlist(
        &self,
        ctx: &RequestContext,
        request: CreatePlaylistRequest,
    ) -> Result<Playlist> {
        let actor_id = ctx.require_actor()?;

        if request.name.trim().is_empty() || request.description.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "name and description are required".to_string(),
            ));
        }

        ctx.run(async {
            self.stores
                .playlists
                .create_playlist(NewPlaylist {
                    owner_id: actor_id,
                    name: request.name,
                    description: request.description,
                })
                .await
        })
        .await
    }

    pub async fn get_playlist(&self, ctx: &RequestContext, playlist_id: Uuid) -> Result<Playlist> {
        ctx.run(async {
            self.stores
                .playlists
                .get_playlist(playlist_id)
                .await?
                .ok_or_else(|| AppError::NotFound("playlist not found".to_string()))
        })
        .await
    }

    pub async fn user_playlists(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
    ) -> Result<Vec<Playlist>> {
        ctx.run(async {
            if self.stores.users.get_user(user_id).await?.is_none() {
                return Err(AppError::NotFound("user not found".to_string()));
            }
            self.stores.playlists.list_for_owner(user_id).await
        })
        .await
    }

    pub async fn update_playlist(
        &self,
        ctx: &RequestContext,
        playlist_id: Uuid,
        request: UpdatePlaylistRequest,
    ) -> Result<Playlist> {
        let actor_id = ctx.require_actor()?;

        let blank = |field: &Option<String>| {
            field.as_deref().map(str::trim).map_or(false, str::is_empty)
        };
        if request.name.is_none() && request.description.is_none() {
            return Err(AppError::InvalidArgument("nothing to update".to_string()));
        }
        if blank(&request.name) || blank(&request.description) {
            return Err(AppError::InvalidArgument(
                "name and description cannot be blank".to_string(),
            ));
        }

        ctx.run(async {
            let playlist = self
                .stores
                .playlists
                .get_playlist(playlist_id)
                .await?
                .ok_or_else(|| AppError::NotFound("playlist not found".to_string()))?;
            assert_owner(&playlist, actor_id)?;

            self.stores
                .playlists
                .update_meta(
                    playlist_id,
                    PlaylistUpdate {
                        name: request.name,
                        description: request.description,
                    },
                )
                .await?
                .ok_or_else(|| AppError::NotFound("playlist not found".to_string()))
        })
        .await
    }

    pub async fn delete_playlist(&self, ctx: &RequestContext, playlist_id: Uuid) -> Result<()> {
        let actor_id = ctx.require_actor()?;

        ctx.run(async {
            let playlist = self
                .stores
                .playlists
                .get_playlist(playlist_id)
                .await?
                .ok_or_else(|| AppError::NotFound("playlist not found".to_string()))?;
            assert_owner(&playlist, actor_id)?;

            self.stores.playlists.delete_playlist(playlist_id).await?;
            Ok(())
        })
        .await
    }

    /// Put a video in the playlist's slot; owner only.
    ///
    /// Idempotent when the slot already holds the video; otherwise the
    /// previous occupant is displaced.
    pub async fn set_video(
        &self,
        ctx: &RequestContext,
        playlist_id: Uuid,
        video_id: Uuid,
    ) -> Result<Playlist> {
        let actor_id = ctx.require_actor()?;

        ctx.run(async {
            let playlist = self
                .stores
                .playlists
                .get_playlist(playlist_id)
                .await?
                .ok_or_else(|| AppError::NotFound("playlist not found".to_string()))?;
            assert_owner(&playlist, actor_id)?;

            if self.stores.videos.get_video(video_id).await?.is_none() {
                return Err(AppError::NotFound("video not found".to_string()));
            }

            if playlist.video_slot == Some(video_id) {
                return Ok(playlist);
            }

            self.stores
                .playlists
                .set_slot(playlist_id, video_id)
                .await?
                .ok_or_else(|| AppError::NotFound("playlist not found".to_string()))
        })
        .await
    }

    /// Empty the playlist's slot; owner only. No-op when already empty.
    pub async fn clear_video(&self, ctx: &RequestContext, playlist_id: Uuid) -> Result<Playlist> {
        let actor_id = ctx.require_actor()?;

        ctx.run(async {
            let playlist = self
                .stores
                .playlists
                .get_playlist(playlist_id)
                .await?
                .ok_or_else(|| AppError::NotFound("playlist not found".to_string()))?;
            assert_owner(&playlist, actor_id)?;

            if playlist.video_slot.is_none() {
                return Ok(playlist);
            }

            self.stores
                .playlists
                .clear_slot(playlist_id)
                .await?
                .ok_or_else(|| AppError::NotFound("playlist not found".to_string()))
        })
        .await
    }
}
