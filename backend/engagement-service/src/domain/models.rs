use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - a viewer, and a channel when subscribed to
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Video entity - owner is immutable after creation
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Video {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration_seconds: i64,
    pub view_count: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// Comment entity - mutable only by its owner
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub video_id: Uuid,
    pub owner_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tweet entity - same ownership rule as Comment
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tweet {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Kind of entity a Like applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Video,
    Comment,
    Tweet,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectKind::Video => "video",
            SubjectKind::Comment => "comment",
            SubjectKind::Tweet => "tweet",
        }
    }
}

/// Like subject as a sum type: exactly one subject kind per Like, by construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum LikeSubject {
    Video(Uuid),
    Comment(Uuid),
    Tweet(Uuid),
}

impl LikeSubject {
    pub fn kind(&self) -> SubjectKind {
        match self {
            LikeSubject::Video(_) => SubjectKind::Video,
            LikeSubject::Comment(_) => SubjectKind::Comment,
            LikeSubject::Tweet(_) => SubjectKind::Tweet,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            LikeSubject::Video(id) | LikeSubject::Comment(id) | LikeSubject::Tweet(id) => *id,
        }
    }
}

/// Like fact - at most one per (actor, subject)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub subject: LikeSubject,
    pub created_at: DateTime<Utc>,
}

/// Subscription fact - at most one per (subscriber, channel)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub subscriber_id: Uuid,
    pub channel_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Playlist entity - holds at most one video in its slot
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Playlist {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub video_slot: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
