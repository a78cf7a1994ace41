//! Store traits for entity and relation persistence.
//!
//! Services depend on these traits only; `postgres` and `memory` provide the
//! implementations. Relation primitives (`insert_if_absent` / `remove`) are
//! atomic per key tuple, which is what makes the toggle engine race-safe.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::models::{
    Comment, LikeSubject, Playlist, SubjectKind, Tweet, User, Video,
};
use crate::domain::views::UserProfile;
use crate::error::Result;

/// Window into a sorted collection, derived from validated page params
#[derive(Debug, Clone, Copy)]
pub struct PageWindow {
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Allow-listed sort fields for the video feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoSortField {
    CreatedAt,
    ViewCount,
    DurationSeconds,
    Title,
}

impl VideoSortField {
    pub fn column(&self) -> &'static str {
        match self {
            VideoSortField::CreatedAt => "created_at",
            VideoSortField::ViewCount => "view_count",
            VideoSortField::DurationSeconds => "duration_seconds",
            VideoSortField::Title => "title",
        }
    }
}

/// Feed filter; `text_query` is the optional search gate over title+description
#[derive(Debug, Clone, Default)]
pub struct VideoFilter {
    pub text_query: Option<String>,
    pub owner_id: Option<Uuid>,
    pub published_only: bool,
}

/// Per-owner video aggregate used by channel stats
#[derive(Debug, Clone, Copy, Default)]
pub struct VideoOwnerStats {
    pub video_count: i64,
    pub total_views: i64,
}

pub struct NewUser {
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

pub struct NewVideo {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration_seconds: i64,
}

#[derive(Default)]
pub struct VideoUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
}

pub struct NewComment {
    pub video_id: Uuid,
    pub owner_id: Uuid,
    pub content: String,
}

pub struct NewTweet {
    pub owner_id: Uuid,
    pub content: String,
}

pub struct NewPlaylist {
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
}

#[derive(Default)]
pub struct PlaylistUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user; usernames are stored lowercase
    async fn create_user(&self, new: NewUser) -> Result<User>;

    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Batch-resolve public profiles for view joins
    async fn profiles(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserProfile>>;

    /// Record a watch event: deduplicated, most recent first
    async fn record_watch(&self, user_id: Uuid, video_id: Uuid) -> Result<()>;

    /// Watched video ids with watch times, most recent first
    /// Returns (rows, total_count)
    async fn watch_history(
        &self,
        user_id: Uuid,
        window: PageWindow,
    ) -> Result<(Vec<(Uuid, DateTime<Utc>)>, i64)>;
}

#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn create_video(&self, new: NewVideo) -> Result<Video>;

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>>;

    async fn get_videos(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Video>>;

    async fn update_video(&self, id: Uuid, update: VideoUpdate) -> Result<Option<Video>>;

    async fn set_published(&self, id: Uuid, published: bool) -> Result<Option<Video>>;

    /// Monotonic view counter; lost updates are not acceptable, so the
    /// increment happens in the store, not read-modify-write in the service
    async fn increment_view_count(&self, id: Uuid) -> Result<()>;

    /// Delete a video along with its comments and all dependent likes
    async fn delete_video(&self, id: Uuid) -> Result<bool>;

    /// Filtered, sorted, windowed feed query
    /// Returns (rows, total_count)
    async fn list_videos(
        &self,
        filter: &VideoFilter,
        sort: VideoSortField,
        dir: SortDirection,
        window: PageWindow,
    ) -> Result<(Vec<Video>, i64)>;

    /// Video count and view sum across an owner's uploads
    async fn owner_stats(&self, owner_id: Uuid) -> Result<VideoOwnerStats>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn create_comment(&self, new: NewComment) -> Result<Comment>;

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>>;

    async fn update_content(&self, id: Uuid, content: String) -> Result<Option<Comment>>;

    /// Delete a comment and its likes
    async fn delete_comment(&self, id: Uuid) -> Result<bool>;

    /// Comments for a video, newest first
    /// Returns (rows, total_count)
    async fn list_for_video(
        &self,
        video_id: Uuid,
        window: PageWindow,
    ) -> Result<(Vec<Comment>, i64)>;
}

#[async_trait]
pub trait TweetStore: Send + Sync {
    async fn create_tweet(&self, new: NewTweet) -> Result<Tweet>;

    async fn get_tweet(&self, id: Uuid) -> Result<Option<Tweet>>;

    async fn get_tweets(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Tweet>>;

    async fn update_content(&self, id: Uuid, content: String) -> Result<Option<Tweet>>;

    /// Delete a tweet and its likes
    async fn delete_tweet(&self, id: Uuid) -> Result<bool>;

    /// Tweets by an owner, newest first
    /// Returns (rows, total_count)
    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        window: PageWindow,
    ) -> Result<(Vec<Tweet>, i64)>;
}

#[async_trait]
pub trait PlaylistStore: Send + Sync {
    async fn create_playlist(&self, new: NewPlaylist) -> Result<Playlist>;

    async fn get_playlist(&self, id: Uuid) -> Result<Option<Playlist>>;

    async fn update_meta(&self, id: Uuid, update: PlaylistUpdate) -> Result<Option<Playlist>>;

    async fn delete_playlist(&self, id: Uuid) -> Result<bool>;

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Playlist>>;

    /// Atomically overwrite the single video slot
    async fn set_slot(&self, id: Uuid, video_id: Uuid) -> Result<Option<Playlist>>;

    /// Atomically clear the single video slot
    async fn clear_slot(&self, id: Uuid) -> Result<Option<Playlist>>;
}

#[async_trait]
pub trait LikeStore: Send + Sync {
    /// Idempotent create; returns true if a new row was inserted.
    /// A conflict with a concurrent creator returns false, never an error.
    async fn insert_if_absent(&self, actor_id: Uuid, subject: LikeSubject) -> Result<bool>;

    /// Idempotent delete; returns true if a row was removed.
    async fn remove(&self, actor_id: Uuid, subject: LikeSubject) -> Result<bool>;

    async fn exists(&self, actor_id: Uuid, subject: LikeSubject) -> Result<bool>;

    async fn count(&self, subject: LikeSubject) -> Result<i64>;

    /// Batch like counts for subjects of one kind
    async fn count_many(&self, kind: SubjectKind, ids: &[Uuid]) -> Result<HashMap<Uuid, i64>>;

    /// Batch viewer-relative flags for subjects of one kind
    async fn flags_for_actor(
        &self,
        actor_id: Uuid,
        kind: SubjectKind,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, bool>>;

    /// Total likes across all videos owned by `owner_id`
    async fn count_for_video_owner(&self, owner_id: Uuid) -> Result<i64>;

    /// Subjects of one kind liked by an actor, most recent like first
    /// Returns ((subject_id, liked_at) rows, total_count)
    async fn liked_subjects(
        &self,
        actor_id: Uuid,
        kind: SubjectKind,
        window: PageWindow,
    ) -> Result<(Vec<(Uuid, DateTime<Utc>)>, i64)>;
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Idempotent create; returns true if a new row was inserted.
    async fn insert_if_absent(&self, subscriber_id: Uuid, channel_id: Uuid) -> Result<bool>;

    /// Idempotent delete; returns true if a row was removed.
    async fn remove(&self, subscriber_id: Uuid, channel_id: Uuid) -> Result<bool>;

    async fn exists(&self, subscriber_id: Uuid, channel_id: Uuid) -> Result<bool>;

    async fn count_subscribers(&self, channel_id: Uuid) -> Result<i64>;

    /// Subscribers of a channel, most recent first
    /// Returns ((subscriber_id, subscribed_at) rows, total_count)
    async fn subscribers_of(
        &self,
        channel_id: Uuid,
        window: PageWindow,
    ) -> Result<(Vec<(Uuid, DateTime<Utc>)>, i64)>;

    /// Channels a user subscribes to, most recent first
    /// Returns ((channel_id, subscribed_at) rows, total_count)
    async fn channels_of(
        &self,
        subscriber_id: Uuid,
        window: PageWindow,
    ) -> Result<(Vec<(Uuid, DateTime<Utc>)>, i64)>;

    /// Batch check whether `subscriber_id` subscribes to each of `channel_ids`
    async fn flags_for_subscriber(
        &self,
        subscriber_id: Uuid,
        channel_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, bool>>;

    /// Batch check whether each of `subscriber_ids` subscribes to `channel_id`
    async fn flags_for_channel(
        &self,
        channel_id: Uuid,
        subscriber_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, bool>>;
}
