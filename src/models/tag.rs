//! Tag model
//!
//! Tags are identified by a unique, lowercase title of at most
//! [`MAX_TAG_TITLE_LENGTH`] characters.

use serde::{Deserialize, Serialize};

/// Maximum length of a tag title
pub const MAX_TAG_TITLE_LENGTH: usize = 20;

/// Tag entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// Normalized (lowercase) title
    pub title: String,
}

impl Tag {
    /// Create a new Tag with a normalized title.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(title: &str) -> Self {
        Self {
            id: 0,
            title: normalize_tag_title(title),
        }
    }
}

/// Normalize a tag title the way it is stored: trimmed and lowercased.
pub fn normalize_tag_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Tag with the number of posts referencing it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagWithCount {
    #[serde(flatten)]
    pub tag: Tag,
    /// Number of posts with this tag
    pub posts_count: i64,
}

impl TagWithCount {
    pub fn new(tag: Tag, posts_count: i64) -> Self {
        Self { tag, posts_count }
    }
}

/// Input for creating a tag
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTagInput {
    pub title: String,
}
