//! Blog page service
//!
//! Composes rankings and batch serialization into the context of each
//! public page. Every page carries the same sidebar: the most popular
//! posts and the most used tags.

use crate::models::{PostDetail, PostSummary, TagSummary};
use crate::services::post::{PostService, PostServiceError};
use crate::services::tag::{TagService, TagServiceError};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tera::Context as TeraContext;

/// Posts in the "most popular" sidebar
pub const POPULAR_POSTS_LIMIT: usize = 5;
/// Newest posts on the home page
pub const FRESH_POSTS_LIMIT: usize = 5;
/// Tags in the "popular tags" sidebar
pub const POPULAR_TAGS_LIMIT: usize = 5;
/// Posts listed on a tag page
pub const TAG_POSTS_LIMIT: usize = 20;

/// Error types for page assembly
#[derive(Debug, thiserror::Error)]
pub enum BlogServiceError {
    /// Requested post or tag does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<PostServiceError> for BlogServiceError {
    fn from(e: PostServiceError) -> Self {
        match e {
            PostServiceError::NotFound(msg) => Self::NotFound(msg),
            PostServiceError::ValidationError(msg) => Self::ValidationError(msg),
            PostServiceError::Conflict(msg) => Self::InternalError(anyhow::anyhow!(msg)),
            PostServiceError::InternalError(e) => Self::InternalError(e),
        }
    }
}

impl From<TagServiceError> for BlogServiceError {
    fn from(e: TagServiceError) -> Self {
        match e {
            TagServiceError::NotFound(msg) => Self::NotFound(msg),
            TagServiceError::ValidationError(msg) => Self::ValidationError(msg),
            TagServiceError::Conflict(msg) => Self::InternalError(anyhow::anyhow!(msg)),
            TagServiceError::InternalError(e) => Self::InternalError(e),
        }
    }
}

/// Home page: popular and fresh posts plus popular tags
#[derive(Debug, Clone, Serialize)]
pub struct HomeContext {
    pub most_popular_posts: Vec<PostSummary>,
    pub page_posts: Vec<PostSummary>,
    pub popular_tags: Vec<TagSummary>,
}

/// Post detail page
#[derive(Debug, Clone, Serialize)]
pub struct PostDetailContext {
    pub post: PostDetail,
    pub popular_tags: Vec<TagSummary>,
    pub most_popular_posts: Vec<PostSummary>,
}

/// Posts carrying one tag
#[derive(Debug, Clone, Serialize)]
pub struct TagFilterContext {
    /// Title of the tag being listed
    pub tag: String,
    pub posts: Vec<PostSummary>,
    pub popular_tags: Vec<TagSummary>,
    pub most_popular_posts: Vec<PostSummary>,
}

macro_rules! impl_to_context {
    ($($ty:ty),+) => {
        $(
            impl $ty {
                /// Template context with one variable per field
                pub fn to_context(&self) -> tera::Result<TeraContext> {
                    TeraContext::from_serialize(self)
                }
            }
        )+
    };
}

impl_to_context!(HomeContext, PostDetailContext, TagFilterContext);

/// Page assembly service
pub struct BlogService {
    posts: Arc<PostService>,
    tags: Arc<TagService>,
}

impl BlogService {
    pub fn new(posts: Arc<PostService>, tags: Arc<TagService>) -> Self {
        Self { posts, tags }
    }

    /// Home page context. Popular and fresh posts share one serialization pass.
    pub async fn home(&self) -> Result<HomeContext, BlogServiceError> {
        let popular_ids = self.posts.popular_ordered_ids(POPULAR_POSTS_LIMIT).await?;
        let fresh_ids = self.posts.fresh_ordered_ids(FRESH_POSTS_LIMIT).await?;

        let all_ids: Vec<i64> = popular_ids.iter().chain(&fresh_ids).copied().collect();
        let records = self.posts.serialize_posts(&all_ids).await?;

        Ok(HomeContext {
            most_popular_posts: in_order(&records, &popular_ids),
            page_posts: in_order(&records, &fresh_ids),
            popular_tags: self.tags.popular_tags(POPULAR_TAGS_LIMIT).await?,
        })
    }

    /// Post detail context for the post with `slug`
    pub async fn post_detail(&self, slug: &str) -> Result<PostDetailContext, BlogServiceError> {
        let post = self.posts.detail(slug).await?;

        let popular_ids = self.posts.popular_ordered_ids(POPULAR_POSTS_LIMIT).await?;
        let records = self.posts.serialize_posts(&popular_ids).await?;

        Ok(PostDetailContext {
            post,
            popular_tags: self.tags.popular_tags(POPULAR_TAGS_LIMIT).await?,
            most_popular_posts: in_order(&records, &popular_ids),
        })
    }

    /// Newest posts carrying the tag titled `tag_title` (any case)
    pub async fn tag_filter(&self, tag_title: &str) -> Result<TagFilterContext, BlogServiceError> {
        let tag = self
            .tags
            .get_by_title(tag_title)
            .await?
            .ok_or_else(|| BlogServiceError::NotFound(format!("No tag titled '{}'", tag_title)))?;

        let tagged_ids = self
            .posts
            .fresh_ordered_ids_for_tag(tag.id, TAG_POSTS_LIMIT)
            .await?;
        let popular_ids = self.posts.popular_ordered_ids(POPULAR_POSTS_LIMIT).await?;

        let all_ids: Vec<i64> = tagged_ids.iter().chain(&popular_ids).copied().collect();
        let records = self.posts.serialize_posts(&all_ids).await?;

        Ok(TagFilterContext {
            tag: tag.title,
            posts: in_order(&records, &tagged_ids),
            popular_tags: self.tags.popular_tags(POPULAR_TAGS_LIMIT).await?,
            most_popular_posts: in_order(&records, &popular_ids),
        })
    }
}

/// Pick serialized records in ranking order
fn in_order(records: &HashMap<i64, PostSummary>, ids: &[i64]) -> Vec<PostSummary> {
    ids.iter().filter_map(|id| records.get(id).cloned()).collect()
}
