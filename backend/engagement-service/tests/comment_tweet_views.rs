//! Comment and tweet composition: ownership enforcement, list joins and
//! viewer-relative like data.

mod common;

use common::{create_user, create_video, test_app};
use engagement_service::domain::models::LikeSubject;
use engagement_service::services::PageParams;
use engagement_service::{AppError, RequestContext};
use uuid::Uuid;

#[tokio::test]
async fn comments_require_content_and_an_existing_video() {
    let app = test_app();
    let user = create_user(&app, "alice").await;
    let video = create_video(&app, user.id, "clip", true).await;
    let ctx = RequestContext::for_actor(user.id);

    let err = app
        .comments
        .add_comment(&ctx, video.id, "   ".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));

    let err = app
        .comments
        .add_comment(&ctx, Uuid::new_v4(), "hello".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let comment = app
        .comments
        .add_comment(&ctx, video.id, "hello".to_string())
        .await
        .unwrap();
    assert_eq!(comment.owner_id, user.id);
}

#[tokio::test]
async fn comment_list_is_newest_first_with_viewer_flags() {
    let app = test_app();
    let owner = create_user(&app, "owner").await;
    let commenter = create_user(&app, "commenter").await;
    let viewer = create_user(&app, "viewer").await;
    let video = create_video(&app, owner.id, "clip", true).await;

    let commenter_ctx = RequestContext::for_actor(commenter.id);
    let first = app
        .comments
        .add_comment(&commenter_ctx, video.id, "first!".to_string())
        .await
        .unwrap();
    let second = app
        .comments
        .add_comment(&commenter_ctx, video.id, "second!".to_string())
        .await
        .unwrap();

    let viewer_ctx = RequestContext::for_actor(viewer.id);
    app.engagement
        .toggle_comment_like(&viewer_ctx, first.id)
        .await
        .unwrap();

    let page = app
        .comments
        .list_comments(&viewer_ctx, video.id, &PageParams::default())
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(page.items[0].id, second.id);
    assert_eq!(page.items[1].id, first.id);

    let first_row = &page.items[1];
    assert_eq!(first_row.like_count, 1);
    assert!(first_row.is_liked);
    assert_eq!(first_row.owner.username, "commenter");

    // The commenter did not like anything, same counts, different flags
    let page = app
        .comments
        .list_comments(&commenter_ctx, video.id, &PageParams::default())
        .await
        .unwrap();
    assert_eq!(page.items[1].like_count, 1);
    assert!(!page.items[1].is_liked);
}

#[tokio::test]
async fn comment_mutations_are_owner_only() {
    let app = test_app();
    let owner = create_user(&app, "owner").await;
    let intruder = create_user(&app, "intruder").await;
    let video = create_video(&app, owner.id, "clip", true).await;

    let comment = app
        .comments
        .add_comment(
            &RequestContext::for_actor(owner.id),
            video.id,
            "original".to_string(),
        )
        .await
        .unwrap();

    let err = app
        .comments
        .update_comment(
            &RequestContext::for_actor(intruder.id),
            comment.id,
            "defaced".to_string(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let updated = app
        .comments
        .update_comment(
            &RequestContext::for_actor(owner.id),
            comment.id,
            "edited".to_string(),
        )
        .await
        .unwrap();
    assert_eq!(updated.content, "edited");

    let err = app
        .comments
        .delete_comment(&RequestContext::for_actor(intruder.id), comment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    app.comments
        .delete_comment(&RequestContext::for_actor(owner.id), comment.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn deleting_a_comment_drops_its_likes() {
    let app = test_app();
    let owner = create_user(&app, "owner").await;
    let fan = create_user(&app, "fan").await;
    let video = create_video(&app, owner.id, "clip", true).await;
    let owner_ctx = RequestContext::for_actor(owner.id);

    let comment = app
        .comments
        .add_comment(&owner_ctx, video.id, "like me".to_string())
        .await
        .unwrap();
    app.engagement
        .toggle_comment_like(&RequestContext::for_actor(fan.id), comment.id)
        .await
        .unwrap();

    let subject = LikeSubject::Comment(comment.id);
    assert_eq!(app.stores.likes.count(subject).await.unwrap(), 1);

    app.comments.delete_comment(&owner_ctx, comment.id).await.unwrap();
    assert_eq!(app.stores.likes.count(subject).await.unwrap(), 0);
}

#[tokio::test]
async fn tweet_lifecycle_and_list_flags() {
    let app = test_app();
    let author = create_user(&app, "author").await;
    let fan = create_user(&app, "fan").await;
    let author_ctx = RequestContext::for_actor(author.id);
    let fan_ctx = RequestContext::for_actor(fan.id);

    let err = app
        .tweets
        .create_tweet(&author_ctx, "  ".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));

    let first = app
        .tweets
        .create_tweet(&author_ctx, "hello world".to_string())
        .await
        .unwrap();
    let second = app
        .tweets
        .create_tweet(&author_ctx, "second thought".to_string())
        .await
        .unwrap();

    app.engagement
        .toggle_tweet_like(&fan_ctx, first.id)
        .await
        .unwrap();

    let page = app
        .tweets
        .list_tweets(&fan_ctx, author.id, &PageParams::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items[0].id, second.id);
    assert_eq!(page.items[1].id, first.id);
    assert!(page.items[1].is_liked);
    assert_eq!(page.items[1].like_count, 1);
    assert_eq!(page.items[0].owner.username, "author");

    let err = app
        .tweets
        .list_tweets(&fan_ctx, Uuid::new_v4(), &PageParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn tweet_mutations_are_owner_only() {
    let app = test_app();
    let author = create_user(&app, "author").await;
    let intruder = create_user(&app, "intruder").await;

    let tweet = app
        .tweets
        .create_tweet(&RequestContext::for_actor(author.id), "mine".to_string())
        .await
        .unwrap();

    let err = app
        .tweets
        .update_tweet(
            &RequestContext::for_actor(intruder.id),
            tweet.id,
            "hijacked".to_string(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = app
        .tweets
        .delete_tweet(&RequestContext::for_actor(intruder.id), tweet.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let updated = app
        .tweets
        .update_tweet(
            &RequestContext::for_actor(author.id),
            tweet.id,
            "edited".to_string(),
        )
        .await
        .unwrap();
    assert_eq!(updated.content, "edited");

    app.tweets
        .delete_tweet(&RequestContext::for_actor(author.id), tweet.id)
        .await
        .unwrap();
    assert!(app.stores.tweets.get_tweet(tweet.id).await.unwrap().is_none());
}

#[tokio::test]
async fn liked_tweets_view_orders_by_like_recency() {
    let app = test_app();
    let author = create_user(&app, "author").await;
    let fan = create_user(&app, "fan").await;
    let author_ctx = RequestContext::for_actor(author.id);
    let fan_ctx = RequestContext::for_actor(fan.id);

    let first = app
        .tweets
        .create_tweet(&author_ctx, "older tweet".to_string())
        .await
        .unwrap();
    let second = app
        .tweets
        .create_tweet(&author_ctx, "newer tweet".to_string())
        .await
        .unwrap();

    // Liked in creation order, so the most recent like is the newer tweet
    app.engagement.toggle_tweet_like(&fan_ctx, first.id).await.unwrap();
    app.engagement.toggle_tweet_like(&fan_ctx, second.id).await.unwrap();

    let page = app
        .engagement
        .liked_tweets(&fan_ctx, &PageParams::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items[0].tweet.id, second.id);
    assert_eq!(page.items[1].tweet.id, first.id);
    assert!(page.items.iter().all(|item| item.tweet.is_liked));
}
