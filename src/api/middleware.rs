//! Shared HTTP plumbing
//!
//! Contains:
//! - `AppState`, the services every handler reaches through `State`
//! - `ApiError`, the JSON error envelope of the API
//! - `PageError`, the themed error page of the HTML site

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

use crate::config::MediaConfig;
use crate::db::repositories::{
    SqlxCommentRepository, SqlxPostRepository, SqlxTagRepository, SqlxUserRepository,
};
use crate::db::DynDatabasePool;
use crate::services::{
    BlogService, BlogServiceError, CommentService, CommentServiceError, PostService,
    PostServiceError, TagService, TagServiceError, UserService, UserServiceError,
};
use crate::theme::{simple_error_page, ThemeEngine, ERROR_TEMPLATE};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub blog_service: Arc<BlogService>,
    pub post_service: Arc<PostService>,
    pub tag_service: Arc<TagService>,
    pub comment_service: Arc<CommentService>,
    pub user_service: Arc<UserService>,
    pub theme_engine: Arc<RwLock<ThemeEngine>>,
}

impl AppState {
    /// Wire repositories and services over one connection pool
    pub fn new(pool: DynDatabasePool, media: MediaConfig, theme_engine: ThemeEngine) -> Self {
        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let tag_repo = SqlxTagRepository::boxed(pool.clone());
        let post_repo = SqlxPostRepository::boxed(pool.clone());
        let comment_repo = SqlxCommentRepository::boxed(pool);

        let post_service = Arc::new(PostService::new(
            post_repo.clone(),
            tag_repo.clone(),
            user_repo.clone(),
            comment_repo.clone(),
            media,
        ));
        let tag_service = Arc::new(TagService::new(tag_repo));

        Self {
            blog_service: Arc::new(BlogService::new(post_service.clone(), tag_service.clone())),
            comment_service: Arc::new(CommentService::new(
                comment_repo,
                post_repo,
                user_repo.clone(),
            )),
            user_service: Arc::new(UserService::new(user_repo)),
            post_service,
            tag_service,
            theme_engine: Arc::new(RwLock::new(theme_engine)),
        }
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    /// Internal errors are logged in full and answered with a generic message
    fn internal(e: anyhow::Error) -> Self {
        tracing::error!("Request failed: {:#}", e);
        Self::internal_error("Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<BlogServiceError> for ApiError {
    fn from(e: BlogServiceError) -> Self {
        match e {
            BlogServiceError::NotFound(msg) => Self::not_found(msg),
            BlogServiceError::ValidationError(msg) => Self::validation_error(msg),
            BlogServiceError::InternalError(e) => Self::internal(e),
        }
    }
}

impl From<PostServiceError> for ApiError {
    fn from(e: PostServiceError) -> Self {
        match e {
            PostServiceError::NotFound(msg) => Self::not_found(msg),
            PostServiceError::ValidationError(msg) => Self::validation_error(msg),
            PostServiceError::Conflict(msg) => Self::conflict(msg),
            PostServiceError::InternalError(e) => Self::internal(e),
        }
    }
}

impl From<TagServiceError> for ApiError {
    fn from(e: TagServiceError) -> Self {
        match e {
            TagServiceError::NotFound(msg) => Self::not_found(msg),
            TagServiceError::ValidationError(msg) => Self::validation_error(msg),
            TagServiceError::Conflict(msg) => Self::conflict(msg),
            TagServiceError::InternalError(e) => Self::internal(e),
        }
    }
}

impl From<CommentServiceError> for ApiError {
    fn from(e: CommentServiceError) -> Self {
        match e {
            CommentServiceError::NotFound(msg) => Self::not_found(msg),
            CommentServiceError::ValidationError(msg) => Self::validation_error(msg),
            CommentServiceError::InternalError(e) => Self::internal(e),
        }
    }
}

impl From<UserServiceError> for ApiError {
    fn from(e: UserServiceError) -> Self {
        match e {
            UserServiceError::NotFound(msg) => Self::not_found(msg),
            UserServiceError::ValidationError(msg) => Self::validation_error(msg),
            UserServiceError::Conflict(msg) => Self::conflict(msg),
            UserServiceError::InternalError(e) => Self::internal(e),
        }
    }
}

/// A rendered error page for the HTML site
#[derive(Debug)]
pub struct PageError {
    pub status: StatusCode,
    pub html: String,
}

impl PageError {
    /// 404 page rendered by the active theme
    pub fn not_found(state: &AppState, message: &str) -> Self {
        let html = match state.theme_engine.read() {
            Ok(engine) => engine.render_not_found(message),
            Err(e) => {
                tracing::error!("Failed to acquire theme lock: {}", e);
                simple_error_page("Not Found", message)
            }
        };
        Self {
            status: StatusCode::NOT_FOUND,
            html,
        }
    }

    /// 500 page; the cause is logged, never shown
    pub fn internal(state: &AppState, error: &dyn std::fmt::Display) -> Self {
        tracing::error!("Page request failed: {}", error);
        let html = match state.theme_engine.read() {
            Ok(engine) => engine.render_with_fallback(ERROR_TEMPLATE, &tera::Context::new()),
            Err(e) => {
                tracing::error!("Failed to acquire theme lock: {}", e);
                simple_error_page("Server Error", "The page could not be displayed.")
            }
        };
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            html,
        }
    }

    /// Map a page assembly failure to its error page
    pub fn from_blog(state: &AppState, e: BlogServiceError) -> Self {
        match e {
            BlogServiceError::NotFound(msg) => Self::not_found(state, &msg),
            other => Self::internal(state, &other),
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        (self.status, Html(self.html)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_not_found() {
        let error = ApiError::not_found("No such post");
        assert_eq!(error.error.code, "NOT_FOUND");
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_api_error_status_mapping() {
        assert_eq!(
            ApiError::validation_error("bad").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::conflict("taken").into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::internal_error("boom").into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_with_details() {
        let details = serde_json::json!({"field": "slug"});
        let error = ApiError::with_details("VALIDATION_ERROR", "Invalid", details.clone());
        assert_eq!(error.error.details, Some(details));
    }

    #[test]
    fn test_service_errors_keep_their_kind() {
        let from_post: ApiError = PostServiceError::Conflict("slug taken".to_string()).into();
        assert_eq!(from_post.error.code, "CONFLICT");

        let from_blog: ApiError = BlogServiceError::NotFound("no tag".to_string()).into();
        assert_eq!(from_blog.error.code, "NOT_FOUND");
        assert_eq!(from_blog.error.message, "no tag");
    }

    #[test]
    fn test_internal_error_hides_cause() {
        let error: ApiError =
            TagServiceError::InternalError(anyhow::anyhow!("database is locked")).into();

        assert_eq!(error.error.code, "INTERNAL_ERROR");
        assert!(!error.error.message.contains("locked"));
    }
}
