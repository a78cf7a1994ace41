//! Viewer-relative projections returned by the view composer.
//!
//! Every `is_*` flag is computed per request against the current viewer and
//! never cached.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Public profile fields joined into list rows
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl UserProfile {
    /// Placeholder profile for rows whose owner record is missing
    pub fn unknown(id: Uuid) -> Self {
        Self {
            id,
            username: "unknown".to_string(),
            display_name: "Unknown".to_string(),
            avatar_url: None,
        }
    }
}

/// Feed row: video summary plus owner profile, no per-viewer flags
#[derive(Debug, Clone, Serialize)]
pub struct VideoListItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub duration_seconds: i64,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub owner: UserProfile,
}

/// Detail view: engagement joins relative to the current viewer
#[derive(Debug, Clone, Serialize)]
pub struct VideoDetail {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration_seconds: i64,
    pub view_count: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub owner: ChannelSummary,
    pub like_count: i64,
    pub is_liked: bool,
}

/// Channel block embedded in video detail
#[derive(Debug, Clone, Serialize)]
pub struct ChannelSummary {
    pub profile: UserProfile,
    pub subscriber_count: i64,
    pub is_subscribed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub video_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub owner: UserProfile,
    pub like_count: i64,
    pub is_liked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TweetView {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub owner: UserProfile,
    pub like_count: i64,
    pub is_liked: bool,
}

/// Channel aggregate; a channel with zero videos yields `NoData` instead
#[derive(Debug, Clone, Serialize)]
pub struct ChannelStats {
    pub channel_id: Uuid,
    pub total_videos: i64,
    pub total_views: i64,
    pub total_likes: i64,
    pub total_subscribers: i64,
}

/// One edge of the subscription graph joined to a profile
///
/// `subscribes_back` carries the reciprocal relation: for a channel's
/// subscriber list, whether the channel subscribes to that user; for a
/// user's channel list, whether that channel subscribes to the user.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionView {
    pub profile: UserProfile,
    pub subscribed_at: DateTime<Utc>,
    pub subscribes_back: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LikedVideoView {
    pub liked_at: DateTime<Utc>,
    pub video: VideoListItem,
}

#[derive(Debug, Clone, Serialize)]
pub struct LikedTweetView {
    pub liked_at: DateTime<Utc>,
    pub tweet: TweetView,
}

/// Watch-history row, most recently watched first
#[derive(Debug, Clone, Serialize)]
pub struct WatchHistoryItem {
    pub watched_at: DateTime<Utc>,
    pub video: VideoListItem,
}

/// Outcome of a like toggle
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LikeToggle {
    pub is_liked: bool,
}

/// Outcome of a subscription toggle
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SubscriptionToggle {
    pub is_subscribed: bool,
}
