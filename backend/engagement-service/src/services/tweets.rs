//! Tweet CRUD and the per-user tweet list view.

use tracing::info;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::domain::models::{SubjectKind, Tweet};
use crate::domain::views::{TweetView, UserProfile};
use crate::error::{AppError, Result};
use crate::repository::{NewTweet, Stores};
use crate::services::ownership::assert_owner;
use crate::services::pagination::{Page, PageParams, PaginationPolicy, RecencySort};

#[derive(Clone)]
pub struct TweetService {
    stores: Stores,
    pagination: PaginationPolicy,
}

impl TweetService {
    pub fn new(stores: Stores, pagination: PaginationPolicy) -> Self {
        Self { stores, pagination }
    }

    pub async fn create_tweet(&self, ctx: &RequestContext, content: String) -> Result<Tweet> {
        let actor_id = ctx.require_actor()?;
        let content = non_blank(content)?;

        ctx.run(async {
            self.stores
                .tweets
                .create_tweet(NewTweet {
                    owner_id: actor_id,
                    content,
                })
                .await
        })
        .await
    }

    pub async fn update_tweet(
        &self,
        ctx: &RequestContext,
        tweet_id: Uuid,
        content: String,
    ) -> Result<Tweet> {
        let actor_id = ctx.require_actor()?;
        let content = non_blank(content)?;

        ctx.run(async {
            let tweet = self
                .stores
                .tweets
                .get_tweet(tweet_id)
                .await?
                .ok_or_else(|| AppError::NotFound("tweet not found".to_string()))?;
            assert_owner(&tweet, actor_id)?;

            self.stores
                .tweets
                .update_content(tweet_id, content)
                .await?
                .ok_or_else(|| AppError::NotFound("tweet not found".to_string()))
        })
        .await
    }

    pub async fn delete_tweet(&self, ctx: &RequestContext, tweet_id: Uuid) -> Result<()> {
        let actor_id = ctx.require_actor()?;

        ctx.run(async {
            let tweet = self
                .stores
                .tweets
                .get_tweet(tweet_id)
                .await?
                .ok_or_else(|| AppError::NotFound("tweet not found".to_string()))?;
            assert_owner(&tweet, actor_id)?;

            self.stores.tweets.delete_tweet(tweet_id).await?;
            info!(%tweet_id, owner_id = %actor_id, "tweet deleted");
            Ok(())
        })
        .await
    }

    /// Tweets by a user, newest first, with viewer-relative like data
    pub async fn list_tweets(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        params: &PageParams,
    ) -> Result<Page<TweetView>> {
        let resolved = self.pagination.resolve::<RecencySort>(params)?;

        ctx.run(async {
            if self.stores.users.get_user(user_id).await?.is_none() {
                return Err(AppError::NotFound("user not found".to_string()));
            }

            let (tweets, total) = self
                .stores
                .tweets
                .list_for_owner(user_id, resolved.window())
                .await?;

            let ids: Vec<Uuid> = tweets.iter().map(|t| t.id).collect();
            let profiles = self.stores.users.profiles(&[user_id]).await?;
            let like_counts = self.stores.likes.count_many(SubjectKind::Tweet, &ids).await?;
            let liked_flags = match ctx.actor() {
                Some(actor_id) => {
                    self.stores
                        .likes
                        .flags_for_actor(actor_id, SubjectKind::Tweet, &ids)
                        .await?
                }
                None => Default::default(),
            };

            let items = tweets
                .into_iter()
                .map(|tweet| {
                    let owner = profiles
                        .get(&tweet.owner_id)
                        .cloned()
                        .unwrap_or_else(|| UserProfile::unknown(tweet.owner_id));
                    TweetView {
                        id: tweet.id,
                        content: tweet.content,
                        created_at: tweet.created_at,
                        owner,
                        like_count: like_counts.get(&tweet.id).copied().unwrap_or(0),
                        is_liked: liked_flags.get(&tweet.id).copied().unwrap_or(false),
                    }
                })
                .collect();

            Ok(Page::new(items, total, &resolved))
        })
        .await
    }
}

fn non_blank(content: String) -> Result<String> {
    if content.trim().is_empty() {
        return Err(AppError::InvalidArgument("content is required".to_string()));
    }
    Ok(content)
}
