//! Services layer - Business logic
//!
//! This module contains the business logic of the Quill blog.
//! Services are responsible for:
//! - Enforcing validation rules before anything reaches a repository
//! - Computing rankings and serializing posts in batches
//! - Assembling the context of each public page

pub mod blog;
pub mod comment;
pub mod post;
pub mod tag;
pub mod user;

pub use blog::{
    BlogService, BlogServiceError, HomeContext, PostDetailContext, TagFilterContext,
    FRESH_POSTS_LIMIT, POPULAR_POSTS_LIMIT, POPULAR_TAGS_LIMIT, TAG_POSTS_LIMIT,
};
pub use comment::{CommentService, CommentServiceError};
pub use post::{PostService, PostServiceError};
pub use tag::{TagService, TagServiceError};
pub use user::{UserService, UserServiceError};
