//! Post service
//!
//! Implements business logic for posts:
//! - Popularity and freshness rankings
//! - Batch serialization of posts into listing records
//! - The full detail view of a single post
//! - Validated create, edit, delete and like operations for the admin surface

use crate::config::MediaConfig;
use crate::db::repositories::{
    is_unique_violation, CommentRepository, PostRepository, TagRepository, UserRepository,
};
use crate::models::{
    CommentSummary, CreatePostInput, ListParams, PagedResult, Post, PostDetail, PostListItem,
    PostSummary, TagSummary, UpdatePostInput, MAX_SLUG_LENGTH, MAX_TITLE_LENGTH,
};
use anyhow::Context;
use std::collections::HashMap;
use std::sync::Arc;

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// Post not found
    #[error("Post not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Slug already in use
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Post service
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    tags: Arc<dyn TagRepository>,
    users: Arc<dyn UserRepository>,
    comments: Arc<dyn CommentRepository>,
    media: MediaConfig,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        tags: Arc<dyn TagRepository>,
        users: Arc<dyn UserRepository>,
        comments: Arc<dyn CommentRepository>,
        media: MediaConfig,
    ) -> Self {
        Self {
            posts,
            tags,
            users,
            comments,
            media,
        }
    }

    // ========================================================================
    // Rankings
    // ========================================================================

    /// IDs of the `limit` most liked posts, most likes first.
    ///
    /// Posts nobody liked are not ranked. Equal counts order by ascending ID.
    pub async fn popular_ordered_ids(&self, limit: usize) -> Result<Vec<i64>, PostServiceError> {
        self.posts
            .popular_ids(limit)
            .await
            .context("Failed to rank popular posts")
            .map_err(Into::into)
    }

    /// IDs of the `limit` newest posts
    pub async fn fresh_ordered_ids(&self, limit: usize) -> Result<Vec<i64>, PostServiceError> {
        self.posts
            .fresh_ids(limit)
            .await
            .context("Failed to rank fresh posts")
            .map_err(Into::into)
    }

    /// IDs of the `limit` newest posts carrying a tag
    pub async fn fresh_ordered_ids_for_tag(
        &self,
        tag_id: i64,
        limit: usize,
    ) -> Result<Vec<i64>, PostServiceError> {
        self.posts
            .fresh_ids_by_tag(tag_id, limit)
            .await
            .context("Failed to rank posts by tag")
            .map_err(Into::into)
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Serialize a set of posts into listing records, keyed by post ID.
    ///
    /// Duplicates in `ids` collapse and unknown IDs are skipped. Runs two
    /// queries however many IDs are given, and none for an empty set.
    pub async fn serialize_posts(
        &self,
        ids: &[i64],
    ) -> Result<HashMap<i64, PostSummary>, PostServiceError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = self
            .posts
            .fetch_rows(ids)
            .await
            .context("Failed to fetch posts for serialization")?;
        let tag_pairs = self
            .tags
            .tags_for_posts(ids)
            .await
            .context("Failed to fetch tags for serialization")?;

        let mut tags_by_post: HashMap<i64, Vec<TagSummary>> = HashMap::new();
        for (post_id, tag) in tag_pairs {
            tags_by_post
                .entry(post_id)
                .or_default()
                .push(TagSummary::from(tag));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let tags = tags_by_post.remove(&row.post.id).unwrap_or_default();
                (row.post.id, PostSummary::from_row(row, tags, &self.media))
            })
            .collect())
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Get post by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>, PostServiceError> {
        self.posts
            .get_by_slug(slug)
            .await
            .context("Failed to get post by slug")
            .map_err(Into::into)
    }

    /// Get post by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Post>, PostServiceError> {
        self.posts
            .get_by_id(id)
            .await
            .context("Failed to get post by ID")
            .map_err(Into::into)
    }

    /// Full view of one post: body, author, comments, likes and tags
    pub async fn detail(&self, slug: &str) -> Result<PostDetail, PostServiceError> {
        let post = self
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| PostServiceError::NotFound(format!("No post with slug '{}'", slug)))?;

        let author = self
            .users
            .get_by_id(post.author_id)
            .await
            .context("Failed to get post author")?
            .map(|u| u.username)
            .ok_or_else(|| {
                anyhow::anyhow!("Author {} of post '{}' does not exist", post.author_id, post.slug)
            })?;

        let comments = self
            .comments
            .list_by_post(post.id)
            .await
            .context("Failed to get post comments")?
            .into_iter()
            .map(CommentSummary::from)
            .collect();

        let likes_amount = self
            .posts
            .like_count(post.id)
            .await
            .context("Failed to count post likes")?;

        let tags = self
            .tags
            .tags_for_posts(&[post.id])
            .await
            .context("Failed to get post tags")?
            .into_iter()
            .map(|(_, tag)| TagSummary::from(tag))
            .collect();

        Ok(PostDetail {
            image_url: self.media.image_url(&post.image),
            title: post.title,
            text: post.text,
            author,
            comments,
            likes_amount,
            published_at: post.published_at,
            slug: post.slug,
            tags,
        })
    }

    /// Admin listing, newest first, one fixed-size page at a time
    pub async fn list(
        &self,
        params: &ListParams,
    ) -> Result<PagedResult<PostListItem>, PostServiceError> {
        let items = self
            .posts
            .list(params.offset(), params.limit())
            .await
            .context("Failed to list posts")?;
        let total = self.posts.count().await.context("Failed to count posts")?;

        Ok(PagedResult::new(items, total, params))
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Create a post
    ///
    /// # Errors
    /// - `ValidationError` for an empty or oversized title or slug, a slug
    ///   with characters outside `[A-Za-z0-9_-]`, a non-staff or missing
    ///   author, or tag/user IDs that do not exist
    /// - `Conflict` if the slug is taken
    pub async fn create(&self, mut input: CreatePostInput) -> Result<Post, PostServiceError> {
        input.title = input.title.trim().to_string();
        input.slug = input.slug.trim().to_string();

        validate_title(&input.title)?;
        validate_slug(&input.slug)?;
        self.ensure_slug_free(&input.slug, None).await?;
        self.ensure_staff_author(input.author_id).await?;
        self.ensure_tags_exist(&input.tag_ids).await?;
        self.ensure_users_exist(&input.like_user_ids).await?;

        let post = self
            .posts
            .create(&input)
            .await
            .map_err(|e| slug_write_error(e, &input.slug, "Failed to create post"))?;

        tracing::info!("Created post '{}' ({})", post.slug, post.id);
        Ok(post)
    }

    /// Edit a post; relation lists replace the stored sets when present.
    ///
    /// An input with no field set is a `ValidationError`.
    pub async fn update(
        &self,
        id: i64,
        mut input: UpdatePostInput,
    ) -> Result<Post, PostServiceError> {
        if !input.has_changes() {
            return Err(PostServiceError::ValidationError(
                "No fields to update".to_string(),
            ));
        }
        if let Some(title) = input.title.as_mut() {
            *title = title.trim().to_string();
            validate_title(title)?;
        }
        if let Some(slug) = input.slug.as_mut() {
            *slug = slug.trim().to_string();
            validate_slug(slug)?;
            self.ensure_slug_free(slug, Some(id)).await?;
        }
        if let Some(author_id) = input.author_id {
            self.ensure_staff_author(author_id).await?;
        }
        if let Some(tag_ids) = &input.tag_ids {
            self.ensure_tags_exist(tag_ids).await?;
        }
        if let Some(user_ids) = &input.like_user_ids {
            self.ensure_users_exist(user_ids).await?;
        }

        let post = self
            .posts
            .update(id, &input)
            .await
            .map_err(|e| {
                let slug = input.slug.as_deref().unwrap_or_default();
                slug_write_error(e, slug, "Failed to update post")
            })?
            .ok_or_else(|| PostServiceError::NotFound(format!("Post {} not found", id)))?;

        tracing::info!("Updated post '{}' ({})", post.slug, post.id);
        Ok(post)
    }

    /// Delete a post along with its comments, likes and tag links
    pub async fn delete(&self, id: i64) -> Result<(), PostServiceError> {
        let deleted = self
            .posts
            .delete(id)
            .await
            .context("Failed to delete post")?;

        if !deleted {
            return Err(PostServiceError::NotFound(format!("Post {} not found", id)));
        }
        tracing::info!("Deleted post {}", id);
        Ok(())
    }

    /// Record a like. Liking twice is a no-op. Returns the new like count.
    pub async fn like(&self, post_id: i64, user_id: i64) -> Result<i64, PostServiceError> {
        self.ensure_post_exists(post_id).await?;
        self.ensure_users_exist(&[user_id]).await?;

        self.posts
            .add_like(post_id, user_id)
            .await
            .context("Failed to add like")?;
        self.posts
            .like_count(post_id)
            .await
            .context("Failed to count likes")
            .map_err(Into::into)
    }

    /// Withdraw a like. Returns the new like count.
    pub async fn unlike(&self, post_id: i64, user_id: i64) -> Result<i64, PostServiceError> {
        self.ensure_post_exists(post_id).await?;

        self.posts
            .remove_like(post_id, user_id)
            .await
            .context("Failed to remove like")?;
        self.posts
            .like_count(post_id)
            .await
            .context("Failed to count likes")
            .map_err(Into::into)
    }

    async fn ensure_post_exists(&self, id: i64) -> Result<(), PostServiceError> {
        match self.get_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(PostServiceError::NotFound(format!("Post {} not found", id))),
        }
    }

    async fn ensure_slug_free(
        &self,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> Result<(), PostServiceError> {
        let taken = self
            .posts
            .exists_by_slug(slug, exclude_id)
            .await
            .context("Failed to check slug")?;
        if taken {
            return Err(slug_conflict(slug));
        }
        Ok(())
    }

    async fn ensure_staff_author(&self, author_id: i64) -> Result<(), PostServiceError> {
        let author = self
            .users
            .get_by_id(author_id)
            .await
            .context("Failed to get author")?;
        match author {
            Some(user) if user.is_staff => Ok(()),
            Some(user) => Err(PostServiceError::ValidationError(format!(
                "User '{}' is not staff and cannot author posts",
                user.username
            ))),
            None => Err(PostServiceError::ValidationError(format!(
                "Author {} does not exist",
                author_id
            ))),
        }
    }

    async fn ensure_tags_exist(&self, ids: &[i64]) -> Result<(), PostServiceError> {
        let wanted = distinct_count(ids);
        let found = self
            .tags
            .count_existing(ids)
            .await
            .context("Failed to check tags")?;
        if found != wanted {
            return Err(PostServiceError::ValidationError(
                "Some tag IDs do not exist".to_string(),
            ));
        }
        Ok(())
    }

    async fn ensure_users_exist(&self, ids: &[i64]) -> Result<(), PostServiceError> {
        let wanted = distinct_count(ids);
        let found = self
            .users
            .count_existing(ids)
            .await
            .context("Failed to check users")?;
        if found != wanted {
            return Err(PostServiceError::ValidationError(
                "Some user IDs do not exist".to_string(),
            ));
        }
        Ok(())
    }
}

fn slug_conflict(slug: &str) -> PostServiceError {
    PostServiceError::Conflict(format!("Slug '{}' is already in use", slug))
}

/// A post write that lost a slug race reports a conflict, not an internal error
fn slug_write_error(err: anyhow::Error, slug: &str, what: &'static str) -> PostServiceError {
    if is_unique_violation(&err) {
        slug_conflict(slug)
    } else {
        PostServiceError::InternalError(err.context(what))
    }
}

fn distinct_count(ids: &[i64]) -> i64 {
    ids.iter().collect::<std::collections::HashSet<_>>().len() as i64
}

fn validate_title(title: &str) -> Result<(), PostServiceError> {
    if title.is_empty() {
        return Err(PostServiceError::ValidationError(
            "Title cannot be empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(PostServiceError::ValidationError(format!(
            "Title cannot exceed {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}

fn validate_slug(slug: &str) -> Result<(), PostServiceError> {
    if slug.is_empty() {
        return Err(PostServiceError::ValidationError(
            "Slug cannot be empty".to_string(),
        ));
    }
    if slug.len() > MAX_SLUG_LENGTH {
        return Err(PostServiceError::ValidationError(format!(
            "Slug cannot exceed {} characters",
            MAX_SLUG_LENGTH
        )));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(PostServiceError::ValidationError(
            "Slug may only contain letters, digits, hyphens and underscores".to_string(),
        ));
    }
    Ok(())
}
