//! Serialized records
//!
//! Flat, template-ready views of stored entities. Each type serializes with
//! `serde` to the shape templates and the JSON API consume; field names are
//! the wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CommentWithAuthor, PostRow, TagWithCount};
use crate::config::MediaConfig;

/// A tag with its global post count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagSummary {
    pub title: String,
    pub posts_with_tag: i64,
}

impl From<TagWithCount> for TagSummary {
    fn from(twc: TagWithCount) -> Self {
        Self {
            title: twc.tag.title,
            posts_with_tag: twc.posts_count,
        }
    }
}

/// A post as shown in listings and sidebars
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub teaser_text: String,
    pub author: String,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub slug: String,
    pub comments_amount: i64,
    pub tags: Vec<TagSummary>,
    /// `None` for a post without tags
    pub first_tag_title: Option<String>,
}

impl PostSummary {
    /// Shape a fetched row and its tags into a summary
    pub fn from_row(row: PostRow, tags: Vec<TagSummary>, media: &MediaConfig) -> Self {
        let first_tag_title = tags.first().map(|t| t.title.clone());
        Self {
            id: row.post.id,
            teaser_text: row.post.teaser_text(),
            image_url: media.image_url(&row.post.image),
            title: row.post.title,
            author: row.author_name,
            published_at: row.post.published_at,
            slug: row.post.slug,
            comments_amount: row.comments_count,
            tags,
            first_tag_title,
        }
    }
}

/// A comment as shown under a post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommentSummary {
    pub text: String,
    pub published_at: DateTime<Utc>,
    pub author: String,
}

impl From<CommentWithAuthor> for CommentSummary {
    fn from(c: CommentWithAuthor) -> Self {
        Self {
            text: c.comment.text,
            published_at: c.comment.published_at,
            author: c.author_name,
        }
    }
}

/// A post with its full text and comments, for the detail page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostDetail {
    pub title: String,
    pub text: String,
    pub author: String,
    pub comments: Vec<CommentSummary>,
    pub likes_amount: i64,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub slug: String,
    pub tags: Vec<TagSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Post, Tag};
    use chrono::TimeZone;

    fn sample_row(text: &str, image: &str) -> PostRow {
        PostRow {
            post: Post {
                id: 9,
                title: "Hello".to_string(),
                text: text.to_string(),
                slug: "hello".to_string(),
                image: image.to_string(),
                published_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
                author_id: 1,
            },
            author_name: "alice".to_string(),
            comments_count: 4,
        }
    }

    #[test]
    fn test_from_row_without_tags_has_no_first_tag() {
        let summary = PostSummary::from_row(sample_row("body", ""), vec![], &MediaConfig::default());

        assert_eq!(summary.first_tag_title, None);
        assert_eq!(summary.image_url, None);
        assert_eq!(summary.comments_amount, 4);
        assert_eq!(summary.author, "alice");
    }

    #[test]
    fn test_from_row_first_tag_and_image() {
        let tags = vec![
            TagSummary { title: "python".to_string(), posts_with_tag: 2 },
            TagSummary { title: "web".to_string(), posts_with_tag: 1 },
        ];
        let summary = PostSummary::from_row(sample_row("body", "cat.png"), tags, &MediaConfig::default());

        assert_eq!(summary.first_tag_title.as_deref(), Some("python"));
        assert_eq!(summary.image_url.as_deref(), Some("/media/cat.png"));
    }

    #[test]
    fn test_from_row_truncates_teaser() {
        let text = "x".repeat(500);
        let summary = PostSummary::from_row(sample_row(&text, ""), vec![], &MediaConfig::default());

        assert_eq!(summary.teaser_text.chars().count(), 200);
    }

    #[test]
    fn test_wire_format_uses_null_for_missing_values() {
        let summary = PostSummary::from_row(sample_row("body", ""), vec![], &MediaConfig::default());
        let json = serde_json::to_value(&summary).unwrap();

        assert!(json["first_tag_title"].is_null());
        assert!(json["image_url"].is_null());
        assert_eq!(json["published_at"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_tag_summary_from_count() {
        let summary = TagSummary::from(TagWithCount::new(Tag::new("Rust"), 3));

        assert_eq!(summary, TagSummary { title: "rust".to_string(), posts_with_tag: 3 });
    }
}
