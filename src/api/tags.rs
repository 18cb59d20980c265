//! Tag API endpoints
//!
//! Handles HTTP requests for tags:
//! - GET /api/v1/tags?limit=K - Most used tags
//! - GET /api/v1/tags/{tag_title} - Posts carrying a tag

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState};
use crate::models::TagSummary;
use crate::services::{TagFilterContext, POPULAR_TAGS_LIMIT};

/// Largest accepted `limit`
const MAX_TAGS_LIMIT: usize = 100;

/// Query parameters for the popular tags list
#[derive(Debug, Deserialize)]
pub struct PopularTagsQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    POPULAR_TAGS_LIMIT
}

/// Build the tags router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(popular_tags))
        .route("/{tag_title}", get(tag_filter))
}

/// GET /api/v1/tags - Most used tags with their post counts
async fn popular_tags(
    State(state): State<AppState>,
    Query(query): Query<PopularTagsQuery>,
) -> Result<Json<Vec<TagSummary>>, ApiError> {
    if query.limit == 0 || query.limit > MAX_TAGS_LIMIT {
        return Err(ApiError::with_details(
            "VALIDATION_ERROR",
            format!("limit must be between 1 and {}", MAX_TAGS_LIMIT),
            json!({"field": "limit", "min": 1, "max": MAX_TAGS_LIMIT}),
        ));
    }

    let tags = state.tag_service.popular_tags(query.limit).await?;
    Ok(Json(tags))
}

/// GET /api/v1/tags/{tag_title} - Newest posts with the tag
async fn tag_filter(
    State(state): State<AppState>,
    Path(tag_title): Path<String>,
) -> Result<Json<TagFilterContext>, ApiError> {
    let page = state.blog_service.tag_filter(&tag_title).await?;
    Ok(Json(page))
}

#[cfg(test)]
mod tests {
    use crate::api::testing::{seed_post, test_app};
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_popular_tags_with_limit() {
        let (server, state) = test_app().await;
        seed_post(&state, "a", &["rust", "go"]).await;
        seed_post(&state, "b", &["rust"]).await;

        let body: Value = server.get("/api/v1/tags?limit=1").await.json();

        assert_eq!(body, json!([{"title": "rust", "posts_with_tag": 2}]));
    }

    #[tokio::test]
    async fn test_popular_tags_rejects_zero_limit() {
        let (server, _state) = test_app().await;

        let response = server.get("/api/v1/tags?limit=0").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["details"], json!({"field": "limit", "min": 1, "max": 100}));
    }

    #[tokio::test]
    async fn test_tag_filter_json() {
        let (server, state) = test_app().await;
        seed_post(&state, "first", &["Django"]).await;

        let response = server.get("/api/v1/tags/django").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["tag"], "django");
        assert_eq!(body["posts"][0]["slug"], "first");
    }

    #[tokio::test]
    async fn test_tag_filter_unknown_tag() {
        let (server, _state) = test_app().await;

        server
            .get("/api/v1/tags/unknown")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
