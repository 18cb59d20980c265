//! Post API endpoints
//!
//! The page contexts of the HTML site as JSON:
//! - GET /api/v1/home - popular posts, fresh posts and popular tags
//! - GET /api/v1/posts/{slug} - post detail with sidebar

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState};
use crate::services::{HomeContext, PostDetailContext};

/// Build the posts router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/home", get(home))
        .route("/posts/{slug}", get(post_detail))
}

/// GET /api/v1/home
async fn home(State(state): State<AppState>) -> Result<Json<HomeContext>, ApiError> {
    let page = state.blog_service.home().await?;
    Ok(Json(page))
}

/// GET /api/v1/posts/{slug}
async fn post_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PostDetailContext>, ApiError> {
    let page = state.blog_service.post_detail(&slug).await?;
    Ok(Json(page))
}
