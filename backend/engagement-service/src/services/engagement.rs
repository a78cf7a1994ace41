//! Toggle engine for Like and Subscription relations, plus the viewer's
//! liked-item views.
//!
//! Toggles are race-safe without a read-then-branch window: the engine first
//! attempts an idempotent delete, and only if nothing was removed attempts an
//! idempotent insert. Uniqueness lives in the store, so two toggles racing on
//! the same key tuple can never create duplicate rows, and a second delete of
//! the same row is a no-op.

use tracing::debug;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::domain::models::{LikeSubject, SubjectKind};
use crate::domain::views::{
    LikeToggle, LikedTweetView, LikedVideoView, SubscriptionToggle, TweetView, UserProfile,
    VideoListItem,
};
use crate::error::{AppError, Result};
use crate::repository::Stores;
use crate::services::pagination::{Page, PageParams, PaginationPolicy, RecencySort};

#[derive(Clone)]
pub struct EngagementService {
    stores: Stores,
    pagination: PaginationPolicy,
}

impl EngagementService {
    pub fn new(stores: Stores, pagination: PaginationPolicy) -> Self {
        Self { stores, pagination }
    }

    /// Toggle the viewer's like on a video
    pub async fn toggle_video_like(
        &self,
        ctx: &RequestContext,
        video_id: Uuid,
    ) -> Result<LikeToggle> {
        let actor_id = ctx.require_actor()?;
        ctx.run(async {
            if self.stores.videos.get_video(video_id).await?.is_none() {
                return Err(AppError::NotFound("video not found".to_string()));
            }
            let is_liked = self.flip_like(actor_id, LikeSubject::Video(video_id)).await?;
            Ok(LikeToggle { is_liked })
        })
        .await
    }

    /// Toggle the viewer's like on a comment
    pub async fn toggle_comment_like(
        &self,
        ctx: &RequestContext,
        comment_id: Uuid,
    ) -> Result<LikeToggle> {
        let actor_id = ctx.require_actor()?;
        ctx.run(async {
            if self.stores.comments.get_comment(comment_id).await?.is_none() {
                return Err(AppError::NotFound("comment not found".to_string()));
            }
            let is_liked = self
                .flip_like(actor_id, LikeSubject::Comment(comment_id))
                .await?;
            Ok(LikeToggle { is_liked })
        })
        .await
    }

    /// Toggle the viewer's like on a tweet
    pub async fn toggle_tweet_like(
        &self,
        ctx: &RequestContext,
        tweet_id: Uuid,
    ) -> Result<LikeToggle> {
        let actor_id = ctx.require_actor()?;
        ctx.run(async {
            if self.stores.tweets.get_tweet(tweet_id).await?.is_none() {
                return Err(AppError::NotFound("tweet not found".to_string()));
            }
            let is_liked = self.flip_like(actor_id, LikeSubject::Tweet(tweet_id)).await?;
            Ok(LikeToggle { is_liked })
        })
        .await
    }

    /// Toggle the viewer's subscription to a channel
    pub async fn toggle_subscription(
        &self,
        ctx: &RequestContext,
        channel_id: Uuid,
    ) -> Result<SubscriptionToggle> {
        let actor_id = ctx.require_actor()?;
        if actor_id == channel_id {
            return Err(AppError::InvalidArgument(
                "a channel cannot subscribe to itself".to_string(),
            ));
        }

        ctx.run(async {
            if self.stores.users.get_user(channel_id).await?.is_none() {
                return Err(AppError::NotFound("channel not found".to_string()));
            }

            if self.stores.subscriptions.remove(actor_id, channel_id).await? {
                debug!(%actor_id, %channel_id, "subscription removed");
                return Ok(SubscriptionToggle {
                    is_subscribed: false,
                });
            }

            // Losing an insert race means a concurrent toggle created the
            // row; either way the relation is now present.
            let inserted = self
                .stores
                .subscriptions
                .insert_if_absent(actor_id, channel_id)
                .await?;
            debug!(%actor_id, %channel_id, inserted, "subscription created");
            Ok(SubscriptionToggle {
                is_subscribed: true,
            })
        })
        .await
    }

    /// Videos the viewer has liked, most recent like first
    pub async fn liked_videos(
        &self,
        ctx: &RequestContext,
        params: &PageParams,
    ) -> Result<Page<LikedVideoView>> {
        let actor_id = ctx.require_actor()?;
        let resolved = self.pagination.resolve::<RecencySort>(params)?;

        ctx.run(async {
            let (rows, total) = self
                .stores
                .likes
                .liked_subjects(actor_id, SubjectKind::Video, resolved.window())
                .await?;

            let ids: Vec<Uuid> = rows.iter().map(|(id, _)| *id).collect();
            let videos = self.stores.videos.get_videos(&ids).await?;
            let owner_ids: Vec<Uuid> = videos.values().map(|v| v.owner_id).collect();
            let profiles = self.stores.users.profiles(&owner_ids).await?;

            let items = rows
                .into_iter()
                .filter_map(|(video_id, liked_at)| {
                    let video = videos.get(&video_id)?;
                    let owner = profiles
                        .get(&video.owner_id)
                        .cloned()
                        .unwrap_or_else(|| UserProfile::unknown(video.owner_id));
                    Some(LikedVideoView {
                        liked_at,
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

    /// Tweets the viewer has liked, most recent like first
    pub async fn liked_tweets(
        &self,
        ctx: &RequestContext,
        params: &PageParams,
    ) -> Result<Page<LikedTweetView>> {
        let actor_id = ctx.require_actor()?;
        let resolved = self.pagination.resolve::<RecencySort>(params)?;

        ctx.run(async {
            let (rows, total) = self
                .stores
                .likes
                .liked_subjects(actor_id, SubjectKind::Tweet, resolved.window())
                .await?;

            let ids: Vec<Uuid> = rows.iter().map(|(id, _)| *id).collect();
            let tweets = self.stores.tweets.get_tweets(&ids).await?;
            let like_counts = self.stores.likes.count_many(SubjectKind::Tweet, &ids).await?;
            let owner_ids: Vec<Uuid> = tweets.values().map(|t| t.owner_id).collect();
            let profiles = self.stores.users.profiles(&owner_ids).await?;

            let items = rows
                .into_iter()
                .filter_map(|(tweet_id, liked_at)| {
                    let tweet = tweets.get(&tweet_id)?;
                    let owner = profiles
                        .get(&tweet.owner_id)
                        .cloned()
                        .unwrap_or_else(|| UserProfile::unknown(tweet.owner_id));
                    Some(LikedTweetView {
                        liked_at,
                        tweet: TweetView {
                            id: tweet.id,
                            content: tweet.content.clone(),
                            created_at: tweet.created_at,
                            owner,
                            like_count: like_counts.get(&tweet_id).copied().unwrap_or(0),
                            // Every row in this view is a like held by the viewer
                            is_liked: true,
                        },
                    })
                })
                .collect();

            Ok(Page::new(items, total, &resolved))
        })
        .await
    }

    /// Race-safe presence flip for a like relation
    async fn flip_like(&self, actor_id: Uuid, subject: LikeSubject) -> Result<bool> {
        if self.stores.likes.remove(actor_id, subject).await? {
            debug!(%actor_id, subject_kind = subject.kind().as_str(), subject_id = %subject.id(), "like removed");
            return Ok(false);
        }

        // Losing an insert race means a concurrent toggle created the row;
        // either way the relation is now present.
        let inserted = self.stores.likes.insert_if_absent(actor_id, subject).await?;
        debug!(%actor_id, subject_kind = subject.kind().as_str(), subject_id = %subject.id(), inserted, "like created");
        Ok(true)
    }
}
