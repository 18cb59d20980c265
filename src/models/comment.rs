//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    pub published_at: DateTime<Utc>,
}

/// Comment joined with its author's username, as shown under a post
#[derive(Debug, Clone, Serialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,
    pub author_name: String,
}

/// Admin listing row: the comment with the titles needed to identify it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentListItem {
    pub id: i64,
    pub post_id: i64,
    pub post_title: String,
    pub author: String,
    pub text: String,
    pub published_at: DateTime<Utc>,
}

/// Input for creating a comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentInput {
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    /// Defaults to the creation time
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl CreateCommentInput {
    pub fn new(post_id: i64, author_id: i64, text: &str) -> Self {
        Self {
            post_id,
            author_id,
            text: text.to_string(),
            published_at: None,
        }
    }

    /// Set the publication timestamp
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }
}
