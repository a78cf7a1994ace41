#![allow(dead_code)]

use std::sync::Once;

use engagement_service::domain::models::{User, Video};
use engagement_service::repository::{NewUser, NewVideo, Stores};
use engagement_service::services::{
    ChannelService, CommentService, EngagementService, PaginationPolicy, PlaylistService,
    TweetService, VideoService,
};
use uuid::Uuid;

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "engagement_service=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Full service stack over the in-memory store
pub struct TestApp {
    pub stores: Stores,
    pub engagement: EngagementService,
    pub videos: VideoService,
    pub comments: CommentService,
    pub tweets: TweetService,
    pub channels: ChannelService,
    pub playlists: PlaylistService,
}

pub fn test_app() -> TestApp {
    init_tracing();

    let stores = Stores::memory();
    let pagination = PaginationPolicy::default();

    TestApp {
        engagement: EngagementService::new(stores.clone(), pagination.clone()),
        videos: VideoService::new(stores.clone(), pagination.clone()),
        comments: CommentService::new(stores.clone(), pagination.clone()),
        tweets: TweetService::new(stores.clone(), pagination.clone()),
        channels: ChannelService::new(stores.clone(), pagination),
        playlists: PlaylistService::new(stores.clone()),
        stores,
    }
}

pub async fn create_user(app: &TestApp, username: &str) -> User {
    app.stores
        .users
        .create_user(NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            display_name: username.to_string(),
            avatar_url: None,
        })
        .await
        .expect("user fixture")
}

pub async fn create_video(app: &TestApp, owner_id: Uuid, title: &str, published: bool) -> Video {
    let video = app
        .stores
        .videos
        .create_video(NewVideo {
            owner_id,
            title: title.to_string(),
            description: format!("{title} description"),
            video_url: format!("s3://videos/{title}.mp4"),
            thumbnail_url: format!("s3://thumbnails/{title}.png"),
            duration_seconds: 120,
        })
        .await
        .expect("video fixture");

    if published {
        app.stores
            .videos
            .set_published(video.id, true)
            .await
            .expect("publish fixture")
            .expect("video exists")
    } else {
        video
    }
}
