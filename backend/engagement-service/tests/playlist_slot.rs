//! Single-slot playlist membership: displacement, idempotence, ownership.

mod common;

use common::{create_user, create_video, test_app};
use engagement_service::services::playlists::{CreatePlaylistRequest, UpdatePlaylistRequest};
use engagement_service::{AppError, RequestContext};
use uuid::Uuid;

#[tokio::test]
async fn create_requires_name_and_description() {
    let app = test_app();
    let owner = create_user(&app, "owner").await;
    let ctx = RequestContext::for_actor(owner.id);

    let err = app
        .playlists
        .create_playlist(
            &ctx,
            CreatePlaylistRequest {
                name: "  ".to_string(),
                description: "watch later".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));

    let playlist = app
        .playlists
        .create_playlist(
            &ctx,
            CreatePlaylistRequest {
                name: "favorites".to_string(),
                description: "watch later".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(playlist.owner_id, owner.id);
    assert!(playlist.video_slot.is_none());
}

#[tokio::test]
async fn set_video_displaces_the_previous_occupant() {
    let app = test_app();
    let owner = create_user(&app, "owner").await;
    let ctx = RequestContext::for_actor(owner.id);
    let v1 = create_video(&app, owner.id, "first", true).await;
    let v2 = create_video(&app, owner.id, "second", true).await;

    let playlist = app
        .playlists
        .create_playlist(
            &ctx,
            CreatePlaylistRequest {
                name: "queue".to_string(),
                description: "single slot".to_string(),
            },
        )
        .await
        .unwrap();

    let after_first = app
        .playlists
        .set_video(&ctx, playlist.id, v1.id)
        .await
        .unwrap();
    assert_eq!(after_first.video_slot, Some(v1.id));

    // The slot holds one video; the second set displaces the first
    let after_second = app
        .playlists
        .set_video(&ctx, playlist.id, v2.id)
        .await
        .unwrap();
    assert_eq!(after_second.video_slot, Some(v2.id));
}

#[tokio::test]
async fn set_video_is_idempotent_for_the_same_id() {
    let app = test_app();
    let owner = create_user(&app, "owner").await;
    let ctx = RequestContext::for_actor(owner.id);
    let video = create_video(&app, owner.id, "clip", true).await;

    let playlist = app
        .playlists
        .create_playlist(
            &ctx,
            CreatePlaylistRequest {
                name: "queue".to_string(),
                description: "single slot".to_string(),
            },
        )
        .await
        .unwrap();

    app.playlists.set_video(&ctx, playlist.id, video.id).await.unwrap();
    let repeated = app
        .playlists
        .set_video(&ctx, playlist.id, video.id)
        .await
        .unwrap();
    assert_eq!(repeated.video_slot, Some(video.id));
}

#[tokio::test]
async fn set_video_validates_playlist_and_video() {
    let app = test_app();
    let owner = create_user(&app, "owner").await;
    let ctx = RequestContext::for_actor(owner.id);
    let video = create_video(&app, owner.id, "clip", true).await;

    let err = app
        .playlists
        .set_video(&ctx, Uuid::new_v4(), video.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let playlist = app
        .playlists
        .create_playlist(
            &ctx,
            CreatePlaylistRequest {
                name: "queue".to_string(),
                description: "single slot".to_string(),
            },
        )
        .await
        .unwrap();

    let err = app
        .playlists
        .set_video(&ctx, playlist.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn clear_video_empties_the_slot_and_is_idempotent() {
    let app = test_app();
    let owner = create_user(&app, "owner").await;
    let ctx = RequestContext::for_actor(owner.id);
    let video = create_video(&app, owner.id, "clip", true).await;

    let playlist = app
        .playlists
        .create_playlist(
            &ctx,
            CreatePlaylistRequest {
                name: "queue".to_string(),
                description: "single slot".to_string(),
            },
        )
        .await
        .unwrap();

    // Clearing an already-empty slot is a successful no-op
    let cleared = app.playlists.clear_video(&ctx, playlist.id).await.unwrap();
    assert!(cleared.video_slot.is_none());

    app.playlists.set_video(&ctx, playlist.id, video.id).await.unwrap();
    let cleared = app.playlists.clear_video(&ctx, playlist.id).await.unwrap();
    assert!(cleared.video_slot.is_none());
}

#[tokio::test]
async fn playlist_mutations_are_owner_only() {
    let app = test_app();
    let owner = create_user(&app, "owner").await;
    let intruder = create_user(&app, "intruder").await;
    let video = create_video(&app, owner.id, "clip", true).await;

    let playlist = app
        .playlists
        .create_playlist(
            &RequestContext::for_actor(owner.id),
            CreatePlaylistRequest {
                name: "queue".to_string(),
                description: "single slot".to_string(),
            },
        )
        .await
        .unwrap();

    let intruder_ctx = RequestContext::for_actor(intruder.id);

    let err = app
        .playlists
        .set_video(&intruder_ctx, playlist.id, video.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = app
        .playlists
        .clear_video(&intruder_ctx, playlist.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = app
        .playlists
        .update_playlist(
            &intruder_ctx,
            playlist.id,
            UpdatePlaylistRequest {
                name: Some("stolen".to_string()),
                description: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = app
        .playlists
        .delete_playlist(&intruder_ctx, playlist.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn playlist_crud_round_trip() {
    let app = test_app();
    let owner = create_user(&app, "owner").await;
    let ctx = RequestContext::for_actor(owner.id);

    let playlist = app
        .playlists
        .create_playlist(
            &ctx,
            CreatePlaylistRequest {
                name: "queue".to_string(),
                description: "things to watch".to_string(),
            },
        )
        .await
        .unwrap();

    let fetched = app.playlists.get_playlist(&ctx, playlist.id).await.unwrap();
    assert_eq!(fetched.name, "queue");

    let updated = app
        .playlists
        .update_playlist(
            &ctx,
            playlist.id,
            UpdatePlaylistRequest {
                name: Some("renamed".to_string()),
                description: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "renamed");
    assert_eq!(updated.description, "things to watch");

    let listed = app.playlists.user_playlists(&ctx, owner.id).await.unwrap();
    assert_eq!(listed.len(), 1);

    app.playlists.delete_playlist(&ctx, playlist.id).await.unwrap();
    let err = app.playlists.get_playlist(&ctx, playlist.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn deleting_a_video_clears_playlist_slots() {
    let app = test_app();
    let owner = create_user(&app, "owner").await;
    let ctx = RequestContext::for_actor(owner.id);
    let video = create_video(&app, owner.id, "clip", true).await;

    let playlist = app
        .playlists
        .create_playlist(
            &ctx,
            CreatePlaylistRequest {
                name: "queue".to_string(),
                description: "single slot".to_string(),
            },
        )
        .await
        .unwrap();
    app.playlists.set_video(&ctx, playlist.id, video.id).await.unwrap();

    app.videos.delete_video(&ctx, video.id).await.unwrap();

    let fetched = app.playlists.get_playlist(&ctx, playlist.id).await.unwrap();
    assert!(fetched.video_slot.is_none());
}
