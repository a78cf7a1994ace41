//! Video feed and detail composition: filters, sorting, pagination bounds,
//! viewer-relative flags and read side effects.

mod common;

use common::{create_user, create_video, test_app};
use engagement_service::services::PageParams;
use engagement_service::services::videos::{UpdateVideoRequest, VideoFeedQuery};
use engagement_service::{AppError, RequestContext};

#[tokio::test]
async fn feed_returns_published_videos_with_owner_profiles() {
    let app = test_app();
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;

    create_video(&app, alice.id, "rust streams", true).await;
    create_video(&app, bob.id, "cooking pasta", true).await;
    create_video(&app, bob.id, "secret draft", false).await;

    let page = app
        .videos
        .list_videos(
            &RequestContext::anonymous(),
            &VideoFeedQuery::default(),
            &PageParams::default(),
        )
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(page.items.len(), 2);
    assert!(page.items.iter().all(|item| item.title != "secret draft"));
    assert!(page
        .items
        .iter()
        .any(|item| item.title == "rust streams" && item.owner.username == "alice"));
}

#[tokio::test]
async fn feed_text_query_gates_on_title_and_description() {
    let app = test_app();
    let alice = create_user(&app, "alice").await;

    create_video(&app, alice.id, "Rust ownership explained", true).await;
    create_video(&app, alice.id, "gardening", true).await;

    let query = VideoFeedQuery {
        query: Some("RUST".to_string()),
        owner_id: None,
    };
    let page = app
        .videos
        .list_videos(&RequestContext::anonymous(), &query, &PageParams::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].title, "Rust ownership explained");

    // Description matches as well; fixtures derive it from the title
    let query = VideoFeedQuery {
        query: Some("gardening description".to_string()),
        owner_id: None,
    };
    let page = app
        .videos
        .list_videos(&RequestContext::anonymous(), &query, &PageParams::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn feed_owner_filter() {
    let app = test_app();
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;

    create_video(&app, alice.id, "one", true).await;
    create_video(&app, bob.id, "two", true).await;

    let query = VideoFeedQuery {
        query: None,
        owner_id: Some(bob.id),
    };
    let page = app
        .videos
        .list_videos(&RequestContext::anonymous(), &query, &PageParams::default())
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].owner.id, bob.id);
}

#[tokio::test]
async fn feed_rejects_unknown_sort_field() {
    let app = test_app();

    let params = PageParams {
        sort_by: Some("owner_id".to_string()),
        ..PageParams::default()
    };
    let err = app
        .videos
        .list_videos(
            &RequestContext::anonymous(),
            &VideoFeedQuery::default(),
            &params,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[tokio::test]
async fn page_past_the_end_is_an_empty_success() {
    let app = test_app();
    let alice = create_user(&app, "alice").await;
    for i in 0..5 {
        create_video(&app, alice.id, &format!("video {i}"), true).await;
    }

    // K=5, L=2 -> ceil(K/L)+1 = 4 is past the end
    let params = PageParams {
        page: Some(4),
        limit: Some(2),
        ..PageParams::default()
    };
    let page = app
        .videos
        .list_videos(
            &RequestContext::anonymous(),
            &VideoFeedQuery::default(),
            &params,
        )
        .await
        .unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.total, 5);
    assert_eq!(page.page_count, 3);
}

#[tokio::test]
async fn detail_flags_are_viewer_relative() {
    let app = test_app();
    let owner = create_user(&app, "owner").await;
    let liker = create_user(&app, "liker").await;
    let other = create_user(&app, "other").await;
    let video = create_video(&app, owner.id, "popular", true).await;

    let liker_ctx = RequestContext::for_actor(liker.id);
    app.engagement
        .toggle_video_like(&liker_ctx, video.id)
        .await
        .unwrap();

    let seen_by_liker = app.videos.get_video(&liker_ctx, video.id).await.unwrap();
    assert!(seen_by_liker.is_liked);
    assert_eq!(seen_by_liker.like_count, 1);

    let other_ctx = RequestContext::for_actor(other.id);
    let seen_by_other = app.videos.get_video(&other_ctx, video.id).await.unwrap();
    assert!(!seen_by_other.is_liked);
    assert_eq!(seen_by_other.like_count, 1);
}

#[tokio::test]
async fn like_unlike_scenario() {
    let app = test_app();
    let owner = create_user(&app, "owner").await;
    let viewer = create_user(&app, "viewer").await;
    let video = create_video(&app, owner.id, "clip", true).await;
    let ctx = RequestContext::for_actor(viewer.id);

    let toggled = app.engagement.toggle_video_like(&ctx, video.id).await.unwrap();
    assert!(toggled.is_liked);

    let detail = app.videos.get_video(&ctx, video.id).await.unwrap();
    assert!(detail.is_liked);
    assert_eq!(detail.like_count, 1);

    let toggled = app.engagement.toggle_video_like(&ctx, video.id).await.unwrap();
    assert!(!toggled.is_liked);

    let detail = app.videos.get_video(&ctx, video.id).await.unwrap();
    assert!(!detail.is_liked);
    assert_eq!(detail.like_count, 0);
}

#[tokio::test]
async fn detail_shows_subscription_state_of_the_owner_channel() {
    let app = test_app();
    let owner = create_user(&app, "owner").await;
    let fan = create_user(&app, "fan").await;
    let video = create_video(&app, owner.id, "clip", true).await;

    let fan_ctx = RequestContext::for_actor(fan.id);
    app.engagement
        .toggle_subscription(&fan_ctx, owner.id)
        .await
        .unwrap();

    let detail = app.videos.get_video(&fan_ctx, video.id).await.unwrap();
    assert!(detail.owner.is_subscribed);
    assert_eq!(detail.owner.subscriber_count, 1);
    assert_eq!(detail.owner.profile.username, "owner");

    let anonymous = app
        .videos
        .get_video(&RequestContext::anonymous(), video.id)
        .await
        .unwrap();
    assert!(!anonymous.owner.is_subscribed);
    assert_eq!(anonymous.owner.subscriber_count, 1);
}

#[tokio::test]
async fn detail_increments_view_count_and_records_history() {
    let app = test_app();
    let owner = create_user(&app, "owner").await;
    let viewer = create_user(&app, "viewer").await;
    let first = create_video(&app, owner.id, "first", true).await;
    let second = create_video(&app, owner.id, "second", true).await;
    let ctx = RequestContext::for_actor(viewer.id);

    let detail = app.videos.get_video(&ctx, first.id).await.unwrap();
    assert_eq!(detail.view_count, 1);

    app.videos.get_video(&ctx, second.id).await.unwrap();
    // Rewatching moves the entry back to the front without duplicating it
    let detail = app.videos.get_video(&ctx, first.id).await.unwrap();
    assert_eq!(detail.view_count, 2);

    let history = app
        .videos
        .watch_history(&ctx, &PageParams::default())
        .await
        .unwrap();
    assert_eq!(history.total, 2);
    assert_eq!(history.items[0].video.id, first.id);
    assert_eq!(history.items[1].video.id, second.id);
}

#[tokio::test]
async fn unpublished_detail_resolves_only_for_the_owner() {
    let app = test_app();
    let owner = create_user(&app, "owner").await;
    let other = create_user(&app, "other").await;
    let draft = create_video(&app, owner.id, "draft", false).await;

    let detail = app
        .videos
        .get_video(&RequestContext::for_actor(owner.id), draft.id)
        .await
        .unwrap();
    assert!(!detail.is_published);

    let err = app
        .videos
        .get_video(&RequestContext::for_actor(other.id), draft.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = app
        .videos
        .get_video(&RequestContext::anonymous(), draft.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn video_mutations_are_owner_only() {
    let app = test_app();
    let owner = create_user(&app, "owner").await;
    let intruder = create_user(&app, "intruder").await;
    let video = create_video(&app, owner.id, "mine", true).await;

    let update = UpdateVideoRequest {
        title: Some("still mine".to_string()),
        ..UpdateVideoRequest::default()
    };
    let err = app
        .videos
        .update_video(&RequestContext::for_actor(intruder.id), video.id, update)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let update = UpdateVideoRequest {
        title: Some("renamed".to_string()),
        ..UpdateVideoRequest::default()
    };
    let updated = app
        .videos
        .update_video(&RequestContext::for_actor(owner.id), video.id, update)
        .await
        .unwrap();
    assert_eq!(updated.title, "renamed");

    let err = app
        .videos
        .delete_video(&RequestContext::for_actor(intruder.id), video.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    app.videos
        .delete_video(&RequestContext::for_actor(owner.id), video.id)
        .await
        .unwrap();
    assert!(app
        .stores
        .videos
        .get_video(video.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn toggle_publish_flips_the_flag() {
    let app = test_app();
    let owner = create_user(&app, "owner").await;
    let video = create_video(&app, owner.id, "clip", false).await;
    let ctx = RequestContext::for_actor(owner.id);

    let published = app.videos.toggle_publish(&ctx, video.id).await.unwrap();
    assert!(published.is_published);

    let unpublished = app.videos.toggle_publish(&ctx, video.id).await.unwrap();
    assert!(!unpublished.is_published);
}
