//! Comment CRUD and the per-video comment list view.

use tracing::info;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::domain::models::{Comment, SubjectKind};
use crate::domain::views::{CommentView, UserProfile};
use crate::error::{AppError, Result};
use crate::repository::{NewComment, Stores};
use crate::services::ownership::assert_owner;
use crate::services::pagination::{Page, PageParams, PaginationPolicy, RecencySort};

#[derive(Clone)]
pub struct CommentService {
    stores: Stores,
    pagination: PaginationPolicy,
}

impl CommentService {
    pub fn new(stores: Stores, pagination: PaginationPolicy) -> Self {
        Self { stores, pagination }
    }

    pub async fn add_comment(
        &self,
        ctx: &RequestContext,
        video_id: Uuid,
        content: String,
    ) -> Result<Comment> {
        let actor_id = ctx.require_actor()?;
        let content = non_blank(content)?;

        ctx.run(async {
            if self.stores.videos.get_video(video_id).await?.is_none() {
                return Err(AppError::NotFound("video not found".to_string()));
            }

            self.stores
                .comments
                .create_comment(NewComment {
                    video_id,
                    owner_id: actor_id,
                    content,
                })
                .await
        })
        .await
    }

    pub async fn update_comment(
        &self,
        ctx: &RequestContext,
        comment_id: Uuid,
        content: String,
    ) -> Result<Comment> {
        let actor_id = ctx.require_actor()?;
        let content = non_blank(content)?;

        ctx.run(async {
            let comment = self
                .stores
                .comments
                .get_comment(comment_id)
                .await?
                .ok_or_else(|| AppError::NotFound("comment not found".to_string()))?;
            assert_owner(&comment, actor_id)?;

            self.stores
                .comments
                .update_content(comment_id, content)
                .await?
                .ok_or_else(|| AppError::NotFound("comment not found".to_string()))
        })
        .await
    }

    pub async fn delete_comment(&self, ctx: &RequestContext, comment_id: Uuid) -> Result<()> {
        let actor_id = ctx.require_actor()?;

        ctx.run(async {
            let comment = self
                .stores
                .comments
                .get_comment(comment_id)
                .await?
                .ok_or_else(|| AppError::NotFound("comment not found".to_string()))?;
            assert_owner(&comment, actor_id)?;

            self.stores.comments.delete_comment(comment_id).await?;
            info!(%comment_id, owner_id = %actor_id, "comment deleted");
            Ok(())
        })
        .await
    }

    /// Comments on a video, newest first, with owner profiles and
    /// viewer-relative like data
    pub async fn list_comments(
        &self,
        ctx: &RequestContext,
        video_id: Uuid,
        params: &PageParams,
    ) -> Result<Page<CommentView>> {
        let resolved = self.pagination.resolve::<RecencySort>(params)?;

        ctx.run(async {
            if self.stores.videos.get_video(video_id).await?.is_none() {
                return Err(AppError::NotFound("video not found".to_string()));
            }

            let (comments, total) = self
                .stores
                .comments
                .list_for_video(video_id, resolved.window())
                .await?;

            let ids: Vec<Uuid> = comments.iter().map(|c| c.id).collect();
            let owner_ids: Vec<Uuid> = comments.iter().map(|c| c.owner_id).collect();

            let profiles = self.stores.users.profiles(&owner_ids).await?;
            let like_counts = self
                .stores
                .likes
                .count_many(SubjectKind::Comment, &ids)
                .await?;
            let liked_flags = match ctx.actor() {
                Some(actor_id) => {
                    self.stores
                        .likes
                        .flags_for_actor(actor_id, SubjectKind::Comment, &ids)
                        .await?
                }
                None => Default::default(),
            };

            let items = comments
                .into_iter()
                .map(|comment| {
                    let owner = profiles
                        .get(&comment.owner_id)
                        .cloned()
                        .unwrap_or_else(|| UserProfile::unknown(comment.owner_id));
                    CommentView {
                        id: comment.id,
                        video_id: comment.video_id,
                        content: comment.content,
                        created_at: comment.created_at,
                        owner,
                        like_count: like_counts.get(&comment.id).copied().unwrap_or(0),
                        is_liked: liked_flags.get(&comment.id).copied().unwrap_or(false),
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
