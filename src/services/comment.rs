//! Comment service
//!
//! Admin-side comment management: create, search, delete. Reading the
//! comments of one post goes through the post detail view.

use crate::db::repositories::{CommentRepository, PostRepository, UserRepository};
use crate::models::{Comment, CommentListItem, CreateCommentInput, ListParams, PagedResult};
use anyhow::Context;
use std::sync::Arc;

/// Error types for comment service operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    #[error("Comment not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Comment service
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            comments,
            posts,
            users,
        }
    }

    /// Create a comment on an existing post by an existing user
    pub async fn create(&self, input: CreateCommentInput) -> Result<Comment, CommentServiceError> {
        if input.text.trim().is_empty() {
            return Err(CommentServiceError::ValidationError(
                "Comment text cannot be empty".to_string(),
            ));
        }

        let post = self
            .posts
            .get_by_id(input.post_id)
            .await
            .context("Failed to get post")?;
        if post.is_none() {
            return Err(CommentServiceError::ValidationError(format!(
                "Post {} does not exist",
                input.post_id
            )));
        }

        let author = self
            .users
            .get_by_id(input.author_id)
            .await
            .context("Failed to get comment author")?;
        if author.is_none() {
            return Err(CommentServiceError::ValidationError(format!(
                "User {} does not exist",
                input.author_id
            )));
        }

        let comment = self
            .comments
            .create(&input)
            .await
            .context("Failed to create comment")?;

        tracing::info!("Created comment {} on post {}", comment.id, comment.post_id);
        Ok(comment)
    }

    /// Admin listing ordered by ID, optionally searching the comment text
    pub async fn list(
        &self,
        params: &ListParams,
        search: Option<&str>,
    ) -> Result<PagedResult<CommentListItem>, CommentServiceError> {
        let items = self
            .comments
            .list(search, params.offset(), params.limit())
            .await
            .context("Failed to list comments")?;
        let total = self
            .comments
            .count(search)
            .await
            .context("Failed to count comments")?;

        Ok(PagedResult::new(items, total, params))
    }

    /// Delete a comment
    pub async fn delete(&self, id: i64) -> Result<(), CommentServiceError> {
        let deleted = self
            .comments
            .delete(id)
            .await
            .context("Failed to delete comment")?;

        if !deleted {
            return Err(CommentServiceError::NotFound(format!(
                "Comment {} not found",
                id
            )));
        }
        Ok(())
    }
}
