//! In-memory store implementation.
//!
//! One mutex guards the whole state, so every primitive is linearizable and
//! the toggle engine gets the same per-key serialization the PostgreSQL
//! unique indexes provide. Used by the test suites and suitable for
//! single-process deployments.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::models::{
    Comment, LikeSubject, Playlist, SubjectKind, Tweet, User, Video,
};
use crate::domain::views::UserProfile;
use crate::error::{AppError, Result};
use crate::repository::traits::{
    CommentStore, LikeStore, NewComment, NewPlaylist, NewTweet, NewUser, NewVideo, PageWindow,
    PlaylistStore, PlaylistUpdate, SortDirection, SubscriptionStore, TweetStore, UserStore,
    VideoFilter, VideoOwnerStats, VideoSortField, VideoStore, VideoUpdate,
};

struct RelationRow {
    created_at: DateTime<Utc>,
    seq: u64,
}

#[derive(Default)]
struct Inner {
    seq: u64,
    users: HashMap<Uuid, User>,
    videos: HashMap<Uuid, Video>,
    video_seq: HashMap<Uuid, u64>,
    comments: HashMap<Uuid, Comment>,
    comment_seq: HashMap<Uuid, u64>,
    tweets: HashMap<Uuid, Tweet>,
    tweet_seq: HashMap<Uuid, u64>,
    playlists: HashMap<Uuid, Playlist>,
    likes: HashMap<(Uuid, SubjectKind, Uuid), RelationRow>,
    subscriptions: HashMap<(Uuid, Uuid), RelationRow>,
    // Most recently watched first, deduplicated per user
    watch_history: HashMap<Uuid, Vec<(Uuid, DateTime<Utc>)>>,
}

impl Inner {
    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }
}

pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store mutex poisoned")
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn window_slice<T: Clone>(rows: &[T], window: PageWindow) -> Vec<T> {
    let offset = window.offset.max(0) as usize;
    let limit = window.limit.max(0) as usize;
    rows.iter().skip(offset).take(limit).cloned().collect()
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new: NewUser) -> Result<User> {
        let mut state = self.state();

        let username = new.username.to_lowercase();
        let email = new.email.to_lowercase();
        let taken = state
            .users
            .values()
            .any(|u| u.username == username || u.email == email);
        if taken {
            return Err(AppError::Conflict("username or email already taken".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username,
            email,
            display_name: new.display_name,
            avatar_url: new.avatar_url,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.state().users.get(&id).cloned())
    }

    async fn profiles(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserProfile>> {
        let state = self.state();
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id))
            .map(|u| {
                (
                    u.id,
                    UserProfile {
                        id: u.id,
                        username: u.username.clone(),
                        display_name: u.display_name.clone(),
                        avatar_url: u.avatar_url.clone(),
                    },
                )
            })
            .collect())
    }

    async fn record_watch(&self, user_id: Uuid, video_id: Uuid) -> Result<()> {
        let mut state = self.state();
        let history = state.watch_history.entry(user_id).or_default();
        history.retain(|(id, _)| *id != video_id);
        history.insert(0, (video_id, Utc::now()));
        Ok(())
    }

    async fn watch_history(
        &self,
        user_id: Uuid,
        window: PageWindow,
    ) -> Result<(Vec<(Uuid, DateTime<Utc>)>, i64)> {
        let state = self.state();
        let history = state.watch_history.get(&user_id).cloned().unwrap_or_default();
        let total = history.len() as i64;
        Ok((window_slice(&history, window), total))
    }
}

#[async_trait]
impl VideoStore for MemoryStore {
    async fn create_video(&self, new: NewVideo) -> Result<Video> {
        let mut state = self.state();
        let seq = state.next_seq();

        let video = Video {
            id: Uuid::new_v4(),
            owner_id: new.owner_id,
            title: new.title,
            description: new.description,
            video_url: new.video_url,
            thumbnail_url: new.thumbnail_url,
            duration_seconds: new.duration_seconds,
            view_count: 0,
            is_published: false,
            created_at: Utc::now(),
        };
        state.videos.insert(video.id, video.clone());
        state.video_seq.insert(video.id, seq);

        Ok(video)
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>> {
        Ok(self.state().videos.get(&id).cloned())
    }

    async fn get_videos(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Video>> {
        let state = self.state();
        Ok(ids
            .iter()
            .filter_map(|id| state.videos.get(id).cloned())
            .map(|v| (v.id, v))
            .collect())
    }

    async fn update_video(&self, id: Uuid, update: VideoUpdate) -> Result<Option<Video>> {
        let mut state = self.state();
        let Some(video) = state.videos.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = update.title {
            video.title = title;
        }
        if let Some(description) = update.description {
            video.description = description;
        }
        if let Some(thumbnail_url) = update.thumbnail_url {
            video.thumbnail_url = thumbnail_url;
        }

        Ok(Some(video.clone()))
    }

    async fn set_published(&self, id: Uuid, published: bool) -> Result<Option<Video>> {
        let mut state = self.state();
        let Some(video) = state.videos.get_mut(&id) else {
            return Ok(None);
        };
        video.is_published = published;
        Ok(Some(video.clone()))
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<()> {
        let mut state = self.state();
        if let Some(video) = state.videos.get_mut(&id) {
            video.view_count += 1;
        }
        Ok(())
    }

    async fn delete_video(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state();
        if state.videos.remove(&id).is_none() {
            return Ok(false);
        }
        state.video_seq.remove(&id);

        let comment_ids: Vec<Uuid> = state
            .comments
            .values()
            .filter(|c| c.video_id == id)
            .map(|c| c.id)
            .collect();
        for comment_id in &comment_ids {
            state.comments.remove(comment_id);
            state.comment_seq.remove(comment_id);
        }

        state.likes.retain(|(_, kind, subject_id), _| {
            !(*kind == SubjectKind::Video && *subject_id == id)
                && !(*kind == SubjectKind::Comment && comment_ids.contains(subject_id))
        });

        for history in state.watch_history.values_mut() {
            history.retain(|(video_id, _)| *video_id != id);
        }
        for playlist in state.playlists.values_mut() {
            if playlist.video_slot == Some(id) {
                playlist.video_slot = None;
            }
        }

        Ok(true)
    }

    async fn list_videos(
        &self,
        filter: &VideoFilter,
        sort: VideoSortField,
        dir: SortDirection,
        window: PageWindow,
    ) -> Result<(Vec<Video>, i64)> {
        let state = self.state();

        let query = filter.text_query.as_ref().map(|q| q.to_lowercase());
        let mut matched: Vec<&Video> = state
            .videos
            .values()
            .filter(|v| !filter.published_only || v.is_published)
            .filter(|v| filter.owner_id.map_or(true, |owner| v.owner_id == owner))
            .filter(|v| {
                query.as_ref().map_or(true, |q| {
                    v.title.to_lowercase().contains(q) || v.description.to_lowercase().contains(q)
                })
            })
            .collect();

        matched.sort_by(|a, b| {
            let ordering = match sort {
                VideoSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                VideoSortField::ViewCount => a.view_count.cmp(&b.view_count),
                VideoSortField::DurationSeconds => a.duration_seconds.cmp(&b.duration_seconds),
                VideoSortField::Title => a.title.cmp(&b.title),
            };
            let ordering = match dir {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            // Creation order breaks ties, newest first
            ordering.then_with(|| {
                let a_seq = state.video_seq.get(&a.id).copied().unwrap_or(0);
                let b_seq = state.video_seq.get(&b.id).copied().unwrap_or(0);
                b_seq.cmp(&a_seq)
            })
        });

        let total = matched.len() as i64;
        let rows: Vec<Video> = matched.into_iter().cloned().collect();

        Ok((window_slice(&rows, window), total))
    }

    async fn owner_stats(&self, owner_id: Uuid) -> Result<VideoOwnerStats> {
        let state = self.state();
        let mut stats = VideoOwnerStats::default();
        for video in state.videos.values().filter(|v| v.owner_id == owner_id) {
            stats.video_count += 1;
            stats.total_views += video.view_count;
        }
        Ok(stats)
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn create_comment(&self, new: NewComment) -> Result<Comment> {
        let mut state = self.state();
        let seq = state.next_seq();

        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            video_id: new.video_id,
            owner_id: new.owner_id,
            content: new.content,
            created_at: now,
            updated_at: now,
        };
        state.comments.insert(comment.id, comment.clone());
        state.comment_seq.insert(comment.id, seq);

        Ok(comment)
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        Ok(self.state().comments.get(&id).cloned())
    }

    async fn update_content(&self, id: Uuid, content: String) -> Result<Option<Comment>> {
        let mut state = self.state();
        let Some(comment) = state.comments.get_mut(&id) else {
            return Ok(None);
        };
        comment.content = content;
        comment.updated_at = Utc::now();
        Ok(Some(comment.clone()))
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state();
        if state.comments.remove(&id).is_none() {
            return Ok(false);
        }
        state.comment_seq.remove(&id);
        state
            .likes
            .retain(|(_, kind, subject_id), _| !(*kind == SubjectKind::Comment && *subject_id == id));
        Ok(true)
    }

    async fn list_for_video(
        &self,
        video_id: Uuid,
        window: PageWindow,
    ) -> Result<(Vec<Comment>, i64)> {
        let state = self.state();

        let mut matched: Vec<&Comment> = state
            .comments
            .values()
            .filter(|c| c.video_id == video_id)
            .collect();
        matched.sort_by(|a, b| {
            b.created_at.cmp(&a.created_at).then_with(|| {
                let a_seq = state.comment_seq.get(&a.id).copied().unwrap_or(0);
                let b_seq = state.comment_seq.get(&b.id).copied().unwrap_or(0);
                b_seq.cmp(&a_seq)
            })
        });

        let total = matched.len() as i64;
        let rows: Vec<Comment> = matched.into_iter().cloned().collect();

        Ok((window_slice(&rows, window), total))
    }
}

#[async_trait]
impl TweetStore for MemoryStore {
    async fn create_tweet(&self, new: NewTweet) -> Result<Tweet> {
        let mut state = self.state();
        let seq = state.next_seq();

        let now = Utc::now();
        let tweet = Tweet {
            id: Uuid::new_v4(),
            owner_id: new.owner_id,
            content: new.content,
            created_at: now,
            updated_at: now,
        };
        state.tweets.insert(tweet.id, tweet.clone());
        state.tweet_seq.insert(tweet.id, seq);

        Ok(tweet)
    }

    async fn get_tweet(&self, id: Uuid) -> Result<Option<Tweet>> {
        Ok(self.state().tweets.get(&id).cloned())
    }

    async fn get_tweets(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Tweet>> {
        let state = self.state();
        Ok(ids
            .iter()
            .filter_map(|id| state.tweets.get(id).cloned())
            .map(|t| (t.id, t))
            .collect())
    }

    async fn update_content(&self, id: Uuid, content: String) -> Result<Option<Tweet>> {
        let mut state = self.state();
        let Some(tweet) = state.tweets.get_mut(&id) else {
            return Ok(None);
        };
        tweet.content = content;
        tweet.updated_at = Utc::now();
        Ok(Some(tweet.clone()))
    }

    async fn delete_tweet(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state();
        if state.tweets.remove(&id).is_none() {
            return Ok(false);
        }
        state.tweet_seq.remove(&id);
        state
            .likes
            .retain(|(_, kind, subject_id), _| !(*kind == SubjectKind::Tweet && *subject_id == id));
        Ok(true)
    }

    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        window: PageWindow,
    ) -> Result<(Vec<Tweet>, i64)> {
        let state = self.state();

        let mut matched: Vec<&Tweet> = state
            .tweets
            .values()
            .filter(|t| t.owner_id == owner_id)
            .collect();
        matched.sort_by(|a, b| {
            b.created_at.cmp(&a.created_at).then_with(|| {
                let a_seq = state.tweet_seq.get(&a.id).copied().unwrap_or(0);
                let b_seq = state.tweet_seq.get(&b.id).copied().unwrap_or(0);
                b_seq.cmp(&a_seq)
            })
        });

        let total = matched.len() as i64;
        let rows: Vec<Tweet> = matched.into_iter().cloned().collect();

        Ok((window_slice(&rows, window), total))
    }
}

#[async_trait]
impl PlaylistStore for MemoryStore {
    async fn create_playlist(&self, new: NewPlaylist) -> Result<Playlist> {
        let mut state = self.state();

        let now = Utc::now();
        let playlist = Playlist {
            id: Uuid::new_v4(),
            owner_id: new.owner_id,
            name: new.name,
            description: new.description,
            video_slot: None,
            created_at: now,
            updated_at: now,
        };
        state.playlists.insert(playlist.id, playlist.clone());

        Ok(playlist)
    }

    async fn get_playlist(&self, id: Uuid) -> Result<Option<Playlist>> {
        Ok(self.state().playlists.get(&id).cloned())
    }

    async fn update_meta(&self, id: Uuid, update: PlaylistUpdate) -> Result<Option<Playlist>> {
        let mut state = self.state();
        let Some(playlist) = state.playlists.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = update.name {
            playlist.name = name;
        }
        if let Some(description) = update.description {
            playlist.description = description;
        }
        playlist.updated_at = Utc::now();

        Ok(Some(playlist.clone()))
    }

    async fn delete_playlist(&self, id: Uuid) -> Result<bool> {
        Ok(self.state().playlists.remove(&id).is_some())
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Playlist>> {
        let state = self.state();
        let mut playlists: Vec<Playlist> = state
            .playlists
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        playlists.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(playlists)
    }

    async fn set_slot(&self, id: Uuid, video_id: Uuid) -> Result<Option<Playlist>> {
        let mut state = self.state();
        let Some(playlist) = state.playlists.get_mut(&id) else {
            return Ok(None);
        };
        playlist.video_slot = Some(video_id);
        playlist.updated_at = Utc::now();
        Ok(Some(playlist.clone()))
    }

    async fn clear_slot(&self, id: Uuid) -> Result<Option<Playlist>> {
        let mut state = self.state();
        let Some(playlist) = state.playlists.get_mut(&id) else {
            return Ok(None);
        };
        playlist.video_slot = None;
        playlist.updated_at = Utc::now();
        Ok(Some(playlist.clone()))
    }
}

#[async_trait]
impl LikeStore for MemoryStore {
    async fn insert_if_absent(&self, actor_id: Uuid, subject: LikeSubject) -> Result<bool> {
        let mut state = self.state();
        let key = (actor_id, subject.kind(), subject.id());
        if state.likes.contains_key(&key) {
            return Ok(false);
        }
        let seq = state.next_seq();
        state.likes.insert(
            key,
            RelationRow {
                created_at: Utc::now(),
                seq,
            },
        );
        Ok(true)
    }

    async fn remove(&self, actor_id: Uuid, subject: LikeSubject) -> Result<bool> {
        let key = (actor_id, subject.kind(), subject.id());
        Ok(self.state().likes.remove(&key).is_some())
    }

    async fn exists(&self, actor_id: Uuid, subject: LikeSubject) -> Result<bool> {
        let key = (actor_id, subject.kind(), subject.id());
        Ok(self.state().likes.contains_key(&key))
    }

    async fn count(&self, subject: LikeSubject) -> Result<i64> {
        let state = self.state();
        let count = state
            .likes
            .keys()
            .filter(|(_, kind, id)| *kind == subject.kind() && *id == subject.id())
            .count();
        Ok(count as i64)
    }

    async fn count_many(&self, kind: SubjectKind, ids: &[Uuid]) -> Result<HashMap<Uuid, i64>> {
        let state = self.state();
        let mut counts: HashMap<Uuid, i64> = ids.iter().map(|id| (*id, 0)).collect();
        for (_, row_kind, subject_id) in state.likes.keys() {
            if *row_kind == kind {
                if let Some(count) = counts.get_mut(subject_id) {
                    *count += 1;
                }
            }
        }
        Ok(counts)
    }

    async fn flags_for_actor(
        &self,
        actor_id: Uuid,
        kind: SubjectKind,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, bool>> {
        let state = self.state();
        Ok(ids
            .iter()
            .map(|id| (*id, state.likes.contains_key(&(actor_id, kind, *id))))
            .collect())
    }

    async fn count_for_video_owner(&self, owner_id: Uuid) -> Result<i64> {
        let state = self.state();
        let count = state
            .likes
            .keys()
            .filter(|(_, kind, subject_id)| {
                *kind == SubjectKind::Video
                    && state
                        .videos
                        .get(subject_id)
                        .map_or(false, |v| v.owner_id == owner_id)
            })
            .count();
        Ok(count as i64)
    }

    async fn liked_subjects(
        &self,
        actor_id: Uuid,
        kind: SubjectKind,
        window: PageWindow,
    ) -> Result<(Vec<(Uuid, DateTime<Utc>)>, i64)> {
        let state = self.state();

        let mut matched: Vec<(Uuid, DateTime<Utc>, u64)> = state
            .likes
            .iter()
            .filter(|((actor, row_kind, _), _)| *actor == actor_id && *row_kind == kind)
            .map(|((_, _, subject_id), row)| (*subject_id, row.created_at, row.seq))
            .collect();
        matched.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.cmp(&a.2)));

        let total = matched.len() as i64;
        let rows: Vec<(Uuid, DateTime<Utc>)> =
            matched.into_iter().map(|(id, at, _)| (id, at)).collect();

        Ok((window_slice(&rows, window), total))
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn insert_if_absent(&self, subscriber_id: Uuid, channel_id: Uuid) -> Result<bool> {
        let mut state = self.state();
        let key = (subscriber_id, channel_id);
        if state.subscriptions.contains_key(&key) {
            return Ok(false);
        }
        let seq = state.next_seq();
        state.subscriptions.insert(
            key,
            RelationRow {
                created_at: Utc::now(),
                seq,
            },
        );
        Ok(true)
    }

    async fn remove(&self, subscriber_id: Uuid, channel_id: Uuid) -> Result<bool> {
        Ok(self
            .state()
            .subscriptions
            .remove(&(subscriber_id, channel_id))
            .is_some())
    }

    async fn exists(&self, subscriber_id: Uuid, channel_id: Uuid) -> Result<bool> {
        Ok(self
            .state()
            .subscriptions
            .contains_key(&(subscriber_id, channel_id)))
    }

    async fn count_subscribers(&self, channel_id: Uuid) -> Result<i64> {
        let state = self.state();
        let count = state
            .subscriptions
            .keys()
            .filter(|(_, channel)| *channel == channel_id)
            .count();
        Ok(count as i64)
    }

    async fn subscribers_of(
        &self,
        channel_id: Uuid,
        window: PageWindow,
    ) -> Result<(Vec<(Uuid, DateTime<Utc>)>, i64)> {
        let state = self.state();

        let mut matched: Vec<(Uuid, DateTime<Utc>, u64)> = state
            .subscriptions
            .iter()
            .filter(|((_, channel), _)| *channel == channel_id)
            .map(|((subscriber, _), row)| (*subscriber, row.created_at, row.seq))
            .collect();
        matched.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.cmp(&a.2)));

        let total = matched.len() as i64;
        let rows: Vec<(Uuid, DateTime<Utc>)> =
            matched.into_iter().map(|(id, at, _)| (id, at)).collect();

        Ok((window_slice(&rows, window), total))
    }

    async fn channels_of(
        &self,
        subscriber_id: Uuid,
        window: PageWindow,
    ) -> Result<(Vec<(Uuid, DateTime<Utc>)>, i64)> {
        let state = self.state();

        let mut matched: Vec<(Uuid, DateTime<Utc>, u64)> = state
            .subscriptions
            .iter()
            .filter(|((subscriber, _), _)| *subscriber == subscriber_id)
            .map(|((_, channel), row)| (*channel, row.created_at, row.seq))
            .collect();
        matched.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.cmp(&a.2)));

        let total = matched.len() as i64;
        let rows: Vec<(Uuid, DateTime<Utc>)> =
            matched.into_iter().map(|(id, at, _)| (id, at)).collect();

        Ok((window_slice(&rows, window), total))
    }

    async fn flags_for_subscriber(
        &self,
        subscriber_id: Uuid,
        channel_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, bool>> {
        let state = self.state();
        Ok(channel_ids
            .iter()
            .map(|id| {
                (
                    *id,
                    state.subscriptions.contains_key(&(subscriber_id, *id)),
                )
            })
            .collect())
    }

    async fn flags_for_channel(
        &self,
        channel_id: Uuid,
        subscriber_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, bool>> {
        let state = self.state();
        Ok(subscriber_ids
            .iter()
            .map(|id| {
                (
                    *id,
                    state.subscriptions.contains_key(&(*id, channel_id)),
                )
            })
            .collect())
    }
}
