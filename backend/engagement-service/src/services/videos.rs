//! Video publication and the video-side views: feed, detail, watch history.

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::domain::models::{LikeSubject, Video};
use crate::domain::views::{
    ChannelSummary, UserProfile, VideoDetail, VideoListItem, WatchHistoryItem,
};
use crate::error::{AppError, Result};
use crate::repository::{NewVideo, Stores, VideoFilter, VideoSortField, VideoUpdate};
use crate::services::ownership::assert_owner;
use crate::services::pagination::{Page, PageParams, PaginationPolicy, RecencySort};

#[derive(Debug, Deserialize)]
pub struct PublishVideoRequest {
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration_seconds: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateVideoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Feed filters on top of the shared page params
#[derive(Debug, Default, Deserialize)]
pub struct VideoFeedQuery {
    pub query: Option<String>,
    pub owner_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct VideoService {
    stores: Stores,
    pagination: PaginationPolicy,
}

impl VideoService {
    pub fn new(stores: Stores, pagination: PaginationPolicy) -> Self {
        Self { stores, pagination }
    }

    /// Create a video record; uploads start unpublished
    pub async fn publish_video(
        &self,
        ctx: &RequestContext,
        request: PublishVideoRequest,
    ) -> Result<Video> {
        let actor_id = ctx.require_actor()?;

        if request.title.trim().is_empty() || request.description.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "title and description are required".to_string(),
            ));
        }
        if request.video_url.is_empty() || request.thumbnail_url.is_empty() {
            return Err(AppError::InvalidArgument(
                "video and thumbnail files are required".to_string(),
            ));
        }

        ctx.run(async {
            let video = self
                .stores
                .videos
                .create_video(NewVideo {
                    owner_id: actor_id,
                    title: request.title,
                    description: request.description,
                    video_url: request.video_url,
                    thumbnail_url: request.thumbnail_url,
                    duration_seconds: request.duration_seconds.max(0),
                })
                .await?;

            info!(video_id = %video.id, owner_id = %actor_id, "video published");
            Ok(video)
        })
        .await
    }

    /// Public feed: published videos only, optional text and owner filters
    pub async fn list_videos(
        &self,
        ctx: &RequestContext,
        query: &VideoFeedQuery,
        params: &PageParams,
    ) -> Result<Page<VideoListItem>> {
        let resolved = self.pagination.resolve::<VideoSortField>(params)?;

        let filter = VideoFilter {
            text_query: query
                .query
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
            owner_id: query.owner_id,
            published_only: true,
        };

        ctx.run(async {
            let (videos, total) = self
                .stores
                .videos
                .list_videos(&filter, resolved.sort_by, resolved.sort_dir, resolved.window())
                .await?;

            let owner_ids: Vec<Uuid> = videos.iter().map(|v| v.owner_id).collect();
            let profiles = self.stores.users.profiles(&owner_ids).await?;

            let items = videos
                .into_iter()
                .map(|video| {
                    let owner = profiles
                        .get(&video.owner_id)
                        .cloned()
                        .unwrap_or_else(|| UserProfile::unknown(video.owner_id));
                    VideoListItem {
                        id: video.id,
                        title: video.title,
                        description: video.description,
                        thumbnail_url: video.thumbnail_url,
                        duration_seconds: video.duration_seconds,
                        view_count: video.view_count,
                        created_at: video.created_at,
                        owner,
                    }
                })
                .collect();

            Ok(Page::new(items, total, &resolved))
        })
        .await
    }

    /// Detail view with viewer-relative engagement joins.
    ///
    /// A successful fetch counts as a view: the video's view count goes up by
    /// one and the video lands at the front of the viewer's watch history.
    /// Both side effects are safe to retry, neither is exactly-once.
    pub async fn get_video(&self, ctx: &RequestContext, video_id: Uuid) -> Result<VideoDetail> {
        ctx.run(async {
            let video = self
                .stores
                .videos
                .get_video(video_id)
                .await?
                .ok_or_else(|| AppError::NotFound("video not found".to_string()))?;

            // Unpublished videos resolve only for their owner
            if !video.is_published && ctx.actor() != Some(video.owner_id) {
                return Err(AppError::NotFound("video not found".to_string()));
            }

            let subject = LikeSubject::Video(video.id);
            let like_count = self.stores.likes.count(subject).await?;
            let subscriber_count = self
                .stores
                .subscriptions
                .count_subscribers(video.owner_id)
                .await?;

            let (is_liked, is_subscribed) = match ctx.actor() {
                Some(actor_id) => (
                    self.stores.likes.exists(actor_id, subject).await?,
                    self.stores
                        .subscriptions
                        .exists(actor_id, video.owner_id)
                        .await?,
                ),
                None => (false, false),
            };

            let profiles = self.stores.users.profiles(&[video.owner_id]).await?;
            let profile = profiles
                .get(&video.owner_id)
                .cloned()
                .unwrap_or_else(|| UserProfile::unknown(video.owner_id));

            self.stores.videos.increment_view_count(video.id).await?;
            if let Some(actor_id) = ctx.actor() {
                self.stores.users.record_watch(actor_id, video.id).await?;
            }

            Ok(VideoDetail {
                id: video.id,
                title: video.title,
                description: video.description,
                video_url: video.video_url,
                thumbnail_url: video.thumbnail_url,
                duration_seconds: video.duration_seconds,
                view_count: video.view_count + 1,
                is_published: video.is_published,
                created_at: video.created_at,
                owner: ChannelSummary {
                    profile,
                    subscriber_count,
                    is_subscribed,
                },
                like_count,
                is_liked,
            })
        })
        .await
    }

    /// Update title/description/thumbnail; owner only
    pub async fn update_video(
        &self,
        ctx: &RequestContext,
        video_id: Uuid,
        request: UpdateVideoRequest,
    ) -> Result<Video> {
        let actor_id = ctx.require_actor()?;

        let blank = |field: &Option<String>| {
            field.as_deref().map(str::trim).map_or(false, str::is_empty)
        };
        if blank(&request.title) || blank(&request.description) {
            return Err(AppError::InvalidArgument(
                "title and description cannot be blank".to_string(),
            ));
        }
        if request.title.is_none() && request.description.is_none() && request.thumbnail_url.is_none()
        {
            return Err(AppError::InvalidArgument(
                "nothing to update".to_string(),
            ));
        }

        ctx.run(async {
            let video = self
                .stores
                .videos
                .get_video(video_id)
                .await?
                .ok_or_else(|| AppError::NotFound("video not found".to_string()))?;
            assert_owner(&video, actor_id)?;

            self.stores
                .videos
                .update_video(
                    video_id,
                    VideoUpdate {
                        title: request.title,
                        description: request.description,
                        thumbnail_url: request.thumbnail_url,
                    },
                )
                .await?
                .ok_or_else(|| AppError::NotFound("video not found".to_string()))
        })
        .await
    }

    /// Delete a video and its dependent comments and likes; owner only
    pub async fn delete_video(&self, ctx: &RequestContext, video_id: Uuid) -> Result<()> {
        let actor_id = ctx.require_actor()?;

        ctx.run(async {
            let video = self
                .stores
                .videos
                .get_video(video_id)
                .await?
                .ok_or_else(|| AppError::NotFound("video not found".to_string()))?;
            assert_owner(&video, actor_id)?;

            self.stores.videos.delete_video(video_id).await?;
            info!(%video_id, owner_id = %actor_id, "video deleted");
            Ok(())
        })
        .await
    }

    /// Flip the publication flag; owner only
    pub async fn toggle_publish(&self, ctx: &RequestContext, video_id: Uuid) -> Result<Video> {
        let actor_id = ctx.require_actor()?;

        ctx.run(async {
            let video = self
                .stores
                .videos
                .get_video(video_id)
                .await?
                .ok_or_else(|| AppError::NotFound("video not found".to_string()))?;
            assert_owner(&video, actor_id)?;

            self.stores
                .videos
                .set_published(video_id, !video.is_published)
                .await?
                .ok_or_else(|| AppError::NotFound("video not found".to_string()))
        })
        .await
    }

    /// The viewer's watch history, most recently watched first
    pub async fn watch_history(
        &self,
        ctx: &RequestContext,
        params: &PageParams,
    ) -> Result<Page<WatchHistoryItem>> {
        let actor_id = ctx.require_actor()?;
        let resolved = self.pagination.resolve::<RecencySort>(params)?;

        ctx.run(async {
            let (rows, total) = self
                .stores
                .users
                .watch_history(actor_id, resolved.window())
                .await?;

            let ids: Vec<Uuid> = rows.iter().map(|(id, _)| *id).collect();
            let videos = self.stores.videos.get_videos(&ids).await?;
            let owner_ids: Vec<Uuid> = videos.values().map(|v| v.owner_id).collect();
            let profiles = self.stores.users.profiles(&owner_ids).await?;

            let items = rows
                .into_iter()
                .filter_map(|(video_id, watched_at)| {
                    let video = videos.get(&video_id)?;
                    let owner = profiles
                        .get(&video.owner_id)
                        .cloned()
                        .unwrap_or_else(|| UserProfile::unknown(video.owner_id));
                    Some(WatchHistoryItem {
                        watched_at,
                        video: VideoListItem {
                            id: video.id,
                            title: video.title.clone(),
                            description: video.description.clone(),
                            thumbnail_url: video.thumbnail_url.clone(),
                            duration_seconds: video.duration_seconds,
                            view_count: video.view_count,
                            created_at: video.created_at,
                            owner,
                        },
                    })
                })
                .collect();

            Ok(Page::new(items, total, &resolved))
        })
        .await
    }
}
