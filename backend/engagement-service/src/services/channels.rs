//! Channel-side views: aggregate stats, the owner's uploads, and both
//! directions of the subscription graph.

use uuid::Uuid;

use crate::context::RequestContext;
use crate::domain::views::{ChannelStats, SubscriptionView, UserProfile, VideoListItem};
use crate::error::{AppError, Result};
use crate::repository::{Stores, VideoFilter, VideoSortField};
use crate::services::pagination::{Page, PageParams, PaginationPolicy, RecencySort};

#[derive(Clone)]
pub struct ChannelService {
    stores: Stores,
    pagination: PaginationPolicy,
}

impl ChannelService {
    pub fn new(stores: Stores, pagination: PaginationPolicy) -> Self {
        Self { stores, pagination }
    }

    /// Aggregate stats for a channel.
    ///
    /// A channel with zero videos fails `NoData` rather than returning a
    /// zeroed aggregate.
    pub async fn channel_stats(
        &self,
        ctx: &RequestContext,
        channel_id: Uuid,
    ) -> Result<ChannelStats> {
        ctx.run(async {
            if self.stores.users.get_user(channel_id).await?.is_none() {
                return Err(AppError::NotFound("channel not found".to_string()));
            }

            let video_stats = self.stores.videos.owner_stats(channel_id).await?;
            if video_stats.video_count == 0 {
                return Err(AppError::NoData("channel has no videos".to_string()));
            }

            let total_likes = self.stores.likes.count_for_video_owner(channel_id).await?;
            let total_subscribers = self
                .stores
                .subscriptions
                .count_subscribers(channel_id)
                .await?;

            Ok(ChannelStats {
                channel_id,
                total_videos: video_stats.video_count,
                total_views: video_stats.total_views,
                total_likes,
                total_subscribers,
            })
        })
        .await
    }

    /// The authenticated channel's own uploads, unpublished included
    pub async fn channel_videos(
        &self,
        ctx: &RequestContext,
        params: &PageParams,
    ) -> Result<Page<VideoListItem>> {
        let actor_id = ctx.require_actor()?;
        let resolved = self.pagination.resolve::<VideoSortField>(params)?;

        let filter = VideoFilter {
            text_query: None,
            owner_id: Some(actor_id),
            published_only: false,
        };

        ctx.run(async {
            let (videos, total) = self
                .stores
                .videos
                .list_videos(&filter, resolved.sort_by, resolved.sort_dir, resolved.window())
                .await?;

            let profiles = self.stores.users.profiles(&[actor_id]).await?;

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

    /// Who subscribes to a channel; `subscribes_back` says whether the
    /// channel subscribes to that user in return
    pub async fn subscribers(
        &self,
        ctx: &RequestContext,
        channel_id: Uuid,
        params: &PageParams,
    ) -> Result<Page<SubscriptionView>> {
        let resolved = self.pagination.resolve::<RecencySort>(params)?;

        ctx.run(async {
            if self.stores.users.get_user(channel_id).await?.is_none() {
                return Err(AppError::NotFound("channel not found".to_string()));
            }

            let (rows, total) = self
                .stores
                .subscriptions
                .subscribers_of(channel_id, resolved.window())
                .await?;

            let subscriber_ids: Vec<Uuid> = rows.iter().map(|(id, _)| *id).collect();
            let profiles = self.stores.users.profiles(&subscriber_ids).await?;
            let reciprocal = self
                .stores
                .subscriptions
                .flags_for_subscriber(channel_id, &subscriber_ids)
                .await?;

            let items = rows
                .into_iter()
                .map(|(subscriber_id, subscribed_at)| SubscriptionView {
                    profile: profiles
                        .get(&subscriber_id)
                        .cloned()
                        .unwrap_or_else(|| UserProfile::unknown(subscriber_id)),
                    subscribed_at,
                    subscribes_back: reciprocal.get(&subscriber_id).copied().unwrap_or(false),
                })
                .collect();

            Ok(Page::new(items, total, &resolved))
        })
        .await
    }

    /// Channels a user subscribes to; `subscribes_back` says whether that
    /// channel subscribes to the user in return
    pub async fn subscribed_channels(
        &self,
        ctx: &RequestContext,
        subscriber_id: Uuid,
        params: &PageParams,
    ) -> Result<Page<SubscriptionView>> {
        let resolved = self.pagination.resolve::<RecencySort>(params)?;

        ctx.run(async {
            if self.stores.users.get_user(subscriber_id).await?.is_none() {
                return Err(AppError::NotFound("user not found".to_string()));
            }

            let (rows, total) = self
                .stores
                .subscriptions
                .channels_of(subscriber_id, resolved.window())
                .await?;

            let channel_ids: Vec<Uuid> = rows.iter().map(|(id, _)| *id).collect();
            let profiles = self.stores.users.profiles(&channel_ids).await?;
            let reciprocal = self
                .stores
                .subscriptions
                .flags_for_channel(subscriber_id, &channel_ids)
                .await?;

            let items = rows
                .into_iter()
                .map(|(channel_id, subscribed_at)| SubscriptionView {
                    profile: profiles
                        .get(&channel_id)
                        .cloned()
                        .unwrap_or_else(|| UserProfile::unknown(channel_id)),
                    subscribed_at,
                    subscribes_back: reciprocal.get(&channel_id).copied().unwrap_or(false),
                })
                .collect();

            Ok(Page::new(items, total, &resolved))
        })
        .await
    }
}
