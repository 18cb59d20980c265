//! Post model
//!
//! This module provides:
//! - `Post` entity representing a blog post
//! - `PostRow`, a post joined with its author name and comment count
//! - Input types for creating and updating posts
//! - Fixed-size listing parameters for the admin surface

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of characters kept in a post teaser
pub const TEASER_LENGTH: usize = 200;

/// Maximum length of a post title
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length of a post slug
pub const MAX_SLUG_LENGTH: usize = 200;

/// Post entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// Post title
    pub title: String,
    /// Full body text
    pub text: String,
    /// URL slug
    pub slug: String,
    /// Image path relative to the media root, empty when the post has no image
    pub image: String,
    /// Publication timestamp
    pub published_at: DateTime<Utc>,
    /// Author user ID (staff only)
    pub author_id: i64,
}

impl Post {
    /// Prefix of the body shown in listings
    pub fn teaser_text(&self) -> String {
        teaser(&self.text)
    }
}

/// Cut `text` down to its first [`TEASER_LENGTH`] characters.
///
/// Counts Unicode scalar values, so multi-byte text is never split mid-character.
pub fn teaser(text: &str) -> String {
    match text.char_indices().nth(TEASER_LENGTH) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// A post as fetched for batch serialization: the row plus the values
/// the listing query computes alongside it.
#[derive(Debug, Clone, Serialize)]
pub struct PostRow {
    #[serde(flatten)]
    pub post: Post,
    /// Author username
    pub author_name: String,
    /// Number of comments on the post
    pub comments_count: i64,
}

/// Admin listing row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListItem {
    pub id: i64,
    pub title: String,
    pub published_at: DateTime<Utc>,
}

/// Input for creating a new post
///
/// Relations are given as raw identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostInput {
    pub title: String,
    pub text: String,
    pub slug: String,
    #[serde(default)]
    pub image: String,
    /// Defaults to the creation time
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: i64,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
    #[serde(default)]
    pub like_user_ids: Vec<i64>,
}

impl CreatePostInput {
    /// Create a new CreatePostInput without image, tags or likes
    pub fn new(title: &str, text: &str, slug: &str, author_id: i64) -> Self {
        Self {
            title: title.to_string(),
            text: text.to_string(),
            slug: slug.to_string(),
            image: String::new(),
            published_at: None,
            author_id,
            tag_ids: Vec::new(),
            like_user_ids: Vec::new(),
        }
    }

    /// Set the publication timestamp
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    /// Set the image path
    pub fn with_image(mut self, image: &str) -> Self {
        self.image = image.to_string();
        self
    }

    /// Set the tag IDs
    pub fn with_tags(mut self, tag_ids: Vec<i64>) -> Self {
        self.tag_ids = tag_ids;
        self
    }

    /// Set the IDs of users who liked the post
    pub fn with_likes(mut self, like_user_ids: Vec<i64>) -> Self {
        self.like_user_ids = like_user_ids;
        self
    }
}

/// Input for editing a post; `None` leaves a field unchanged.
///
/// `tag_ids` and `like_user_ids` replace the whole relation when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub text: Option<String>,
    pub slug: Option<String>,
    pub image: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Option<i64>,
    pub tag_ids: Option<Vec<i64>>,
    pub like_user_ids: Option<Vec<i64>>,
}

impl UpdatePostInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.text.is_some()
            || self.slug.is_some()
            || self.image.is_some()
            || self.published_at.is_some()
            || self.author_id.is_some()
            || self.tag_ids.is_some()
            || self.like_user_ids.is_some()
    }
}

/// Admin list parameters. The page size is fixed; only the page moves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

/// Rows per admin list page
pub const ADMIN_PAGE_SIZE: u32 = 25;

impl Default for ListParams {
    fn default() -> Self {
        Self::page(1)
    }
}

impl ListParams {
    /// Parameters for the given admin page
    pub fn page(page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: ADMIN_PAGE_SIZE,
        }
    }

    /// Calculate the offset for database queries
    pub fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * self.per_page as i64
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    /// Calculate the total number of pages
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        (self.total.max(0) as u32).div_ceil(self.per_page)
    }
}
