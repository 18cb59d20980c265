//! Admin API endpoints
//!
//! Handles HTTP requests for content management:
//! - Users: create, get
//! - Posts: paged list, create, edit, delete, likes
//! - Tags: list, create, delete
//! - Comments: paged list with text search, create, delete
//! - Theme: reload templates from disk
//!
//! Lists use a fixed page size of 25 rows.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{
    Comment, CommentListItem, CreateCommentInput, CreatePostInput, CreateTagInput,
    CreateUserInput, ListParams, PagedResult, Post, PostListItem, Tag, UpdatePostInput, User,
};

/// Query parameters for paged lists
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    /// Substring searched in comment text
    pub q: Option<String>,
}

fn default_page() -> u32 {
    1
}

/// One page of an admin list
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> From<PagedResult<T>> for PageResponse<T> {
    fn from(result: PagedResult<T>) -> Self {
        Self {
            total_pages: result.total_pages(),
            items: result.items,
            total: result.total,
            page: result.page,
            per_page: result.per_page,
        }
    }
}

/// Request for liking a post on behalf of a user
#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    pub user_id: i64,
}

/// Like count after a like or unlike
#[derive(Debug, Serialize)]
pub struct LikesResponse {
    pub likes_amount: i64,
}

/// Theme reload outcome
#[derive(Debug, Serialize)]
pub struct ThemeReloadResponse {
    pub theme: String,
}

/// Build the admin router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", put(update_post).delete(delete_post))
        .route("/posts/{id}/likes", post(like_post))
        .route("/posts/{id}/likes/{user_id}", delete(unlike_post))
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/{id}", delete(delete_tag))
        .route("/comments", get(list_comments).post(create_comment))
        .route("/comments/{id}", delete(delete_comment))
        .route("/theme/reload", post(reload_theme))
}

/// POST /api/v1/admin/users - Create user
async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserInput>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.user_service.create(body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/v1/admin/users/{id} - Get user
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    let user = state.user_service.get_by_id(id).await?;
    Ok(Json(user))
}

/// GET /api/v1/admin/posts?page=N - Posts, newest first
async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<PostListItem>>, ApiError> {
    let result = state.post_service.list(&ListParams::page(query.page)).await?;
    Ok(Json(result.into()))
}

/// POST /api/v1/admin/posts - Create post
async fn create_post(
    State(state): State<AppState>,
    Json(body): Json<CreatePostInput>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let post = state.post_service.create(body).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/v1/admin/posts/{id} - Edit post
async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdatePostInput>,
) -> Result<Json<Post>, ApiError> {
    let post = state.post_service.update(id, body).await?;
    Ok(Json(post))
}

/// DELETE /api/v1/admin/posts/{id} - Delete post and its comments
async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.post_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/posts/{id}/likes - Like a post
async fn like_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<LikeRequest>,
) -> Result<Json<LikesResponse>, ApiError> {
    let likes_amount = state.post_service.like(id, body.user_id).await?;
    Ok(Json(LikesResponse { likes_amount }))
}

/// DELETE /api/v1/admin/posts/{id}/likes/{user_id} - Withdraw a like
async fn unlike_post(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> Result<Json<LikesResponse>, ApiError> {
    let likes_amount = state.post_service.unlike(id, user_id).await?;
    Ok(Json(LikesResponse { likes_amount }))
}

/// GET /api/v1/admin/tags - All tags by title
async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, ApiError> {
    let tags = state.tag_service.list().await?;
    Ok(Json(tags))
}

/// POST /api/v1/admin/tags - Create tag
async fn create_tag(
    State(state): State<AppState>,
    Json(body): Json<CreateTagInput>,
) -> Result<(StatusCode, Json<Tag>), ApiError> {
    let tag = state.tag_service.create(&body.title).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// DELETE /api/v1/admin/tags/{id} - Delete tag
async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.tag_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/comments?page=N&q=TEXT - Comments by ID
async fn list_comments(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<CommentListItem>>, ApiError> {
    let result = state
        .comment_service
        .list(&ListParams::page(query.page), query.q.as_deref())
        .await?;
    Ok(Json(result.into()))
}

/// POST /api/v1/admin/comments - Create comment
async fn create_comment(
    State(state): State<AppState>,
    Json(body): Json<CreateCommentInput>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let comment = state.comment_service.create(body).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// DELETE /api/v1/admin/comments/{id} - Delete comment
async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.comment_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/theme/reload - Re-read the active theme from disk
async fn reload_theme(
    State(state): State<AppState>,
) -> Result<Json<ThemeReloadResponse>, ApiError> {
    let mut engine = state
        .theme_engine
        .write()
        .map_err(|e| ApiError::internal_error(format!("Failed to acquire theme lock: {}", e)))?;

    engine.reload_templates().map_err(|e| {
        tracing::warn!("Theme reload failed: {:#}", e);
        ApiError::validation_error(e.to_string())
    })?;

    tracing::info!("Reloaded theme '{}'", engine.current_theme());
    Ok(Json(ThemeReloadResponse {
        theme: engine.current_theme().to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::testing::{seed_post, test_app};
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_create_user_and_conflict() {
        let (server, _state) = test_app().await;

        let response = server
            .post("/api/v1/admin/users")
            .json(&json!({"username": "bob", "is_staff": true}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let id = response.json::<Value>()["id"].as_i64().unwrap();

        server
            .get(&format!("/api/v1/admin/users/{}", id))
            .await
            .assert_status_ok();
        server
            .post("/api/v1/admin/users")
            .json(&json!({"username": "bob"}))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_post_lifecycle() {
        let (server, _state) = test_app().await;
        let author: Value = server
            .post("/api/v1/admin/users")
            .json(&json!({"username": "writer", "is_staff": true}))
            .await
            .json();
        let tag: Value = server
            .post("/api/v1/admin/tags")
            .json(&json!({"title": "Rust"}))
            .await
            .json();

        let response = server
            .post("/api/v1/admin/posts")
            .json(&json!({
                "title": "First",
                "text": "Body",
                "slug": "first",
                "author_id": author["id"],
                "tag_ids": [tag["id"]]
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let post_id = response.json::<Value>()["id"].as_i64().unwrap();

        let updated: Value = server
            .put(&format!("/api/v1/admin/posts/{}", post_id))
            .json(&json!({"title": "Renamed", "tag_ids": []}))
            .await
            .json();
        assert_eq!(updated["title"], "Renamed");

        server
            .put(&format!("/api/v1/admin/posts/{}", post_id))
            .json(&json!({}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let detail: Value = server.get("/api/v1/posts/first").await.json();
        assert_eq!(detail["post"]["tags"], json!([]));

        let list: Value = server.get("/api/v1/admin/posts?page=1").await.json();
        assert_eq!(list["total"], 1);
        assert_eq!(list["per_page"], 25);
        assert_eq!(list["items"][0]["title"], "Renamed");

        server
            .delete(&format!("/api/v1/admin/posts/{}", post_id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get("/api/v1/posts/first")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_post_validation_errors() {
        let (server, _state) = test_app().await;
        let reader: Value = server
            .post("/api/v1/admin/users")
            .json(&json!({"username": "reader", "is_staff": false}))
            .await
            .json();

        let response = server
            .post("/api/v1/admin/posts")
            .json(&json!({
                "title": "Nope",
                "text": "Body",
                "slug": "nope",
                "author_id": reader["id"]
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let (server, state) = test_app().await;
        let post = seed_post(&state, "taken", &[]).await;

        server
            .post("/api/v1/admin/posts")
            .json(&json!({
                "title": "Again",
                "text": "Body",
                "slug": "taken",
                "author_id": post.author_id
            }))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_like_and_unlike() {
        let (server, state) = test_app().await;
        let post = seed_post(&state, "liked", &[]).await;

        let body: Value = server
            .post(&format!("/api/v1/admin/posts/{}/likes", post.id))
            .json(&json!({"user_id": post.author_id}))
            .await
            .json();
        assert_eq!(body["likes_amount"], 1);

        // Liking twice keeps one like
        let body: Value = server
            .post(&format!("/api/v1/admin/posts/{}/likes", post.id))
            .json(&json!({"user_id": post.author_id}))
            .await
            .json();
        assert_eq!(body["likes_amount"], 1);

        let home: Value = server.get("/api/v1/home").await.json();
        assert_eq!(home["most_popular_posts"][0]["slug"], "liked");

        let body: Value = server
            .delete(&format!("/api/v1/admin/posts/{}/likes/{}", post.id, post.author_id))
            .await
            .json();
        assert_eq!(body["likes_amount"], 0);
    }

    #[tokio::test]
    async fn test_like_missing_post() {
        let (server, _state) = test_app().await;

        server
            .post("/api/v1/admin/posts/999/likes")
            .json(&json!({"user_id": 1}))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tags_admin() {
        let (server, _state) = test_app().await;

        let tag: Value = server
            .post("/api/v1/admin/tags")
            .json(&json!({"title": "Django"}))
            .await
            .json();
        assert_eq!(tag["title"], "django");

        server
            .post("/api/v1/admin/tags")
            .json(&json!({"title": "DJANGO"}))
            .await
            .assert_status(StatusCode::CONFLICT);

        let tags: Value = server.get("/api/v1/admin/tags").await.json();
        assert_eq!(tags.as_array().unwrap().len(), 1);

        server
            .delete(&format!("/api/v1/admin/tags/{}", tag["id"]))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .delete(&format!("/api/v1/admin/tags/{}", tag["id"]))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_comments_admin() {
        let (server, state) = test_app().await;
        let post = seed_post(&state, "discussed", &[]).await;

        for text in ["great post", "100% agree", "meh"] {
            server
                .post("/api/v1/admin/comments")
                .json(&json!({"post_id": post.id, "author_id": post.author_id, "text": text}))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let all: Value = server.get("/api/v1/admin/comments").await.json();
        assert_eq!(all["total"], 3);
        assert_eq!(all["items"][0]["text"], "great post");
        assert_eq!(all["items"][0]["post_title"], "discussed");

        let found: Value = server.get("/api/v1/admin/comments?q=100%25").await.json();
        assert_eq!(found["total"], 1);
        assert_eq!(found["items"][0]["text"], "100% agree");

        let detail: Value = server.get("/api/v1/posts/discussed").await.json();
        assert_eq!(detail["post"]["comments"].as_array().unwrap().len(), 3);

        let id = all["items"][2]["id"].as_i64().unwrap();
        server
            .delete(&format!("/api/v1/admin/comments/{}", id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_reload_without_theme_dir_fails() {
        let (server, _state) = test_app().await;

        server
            .post("/api/v1/admin/theme/reload")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
