//! Data models
//!
//! This module contains the data structures used throughout Quill:
//! - Database entities (Post, Tag, Comment, User)
//! - Row types carrying values computed by queries
//! - Serialized records handed to templates and the JSON API

mod comment;
mod post;
mod summary;
mod tag;
mod user;

pub use comment::{Comment, CommentListItem, CommentWithAuthor, CreateCommentInput};
pub use post::{
    teaser, CreatePostInput, ListParams, PagedResult, Post, PostListItem, PostRow,
    UpdatePostInput, ADMIN_PAGE_SIZE, MAX_SLUG_LENGTH, MAX_TITLE_LENGTH, TEASER_LENGTH,
};
pub use summary::{CommentSummary, PostDetail, PostSummary, TagSummary};
pub use tag::{normalize_tag_title, CreateTagInput, Tag, TagWithCount, MAX_TAG_TITLE_LENGTH};
pub use user::{CreateUserInput, User, MAX_USERNAME_LENGTH};
