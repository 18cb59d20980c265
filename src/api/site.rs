//! Public HTML pages
//!
//! Each handler builds its page context through the blog service and
//! renders it with the active theme:
//! - GET / - home page
//! - GET /post/{slug} - post detail
//! - GET /tag/{tag_title} - posts carrying a tag
//! - GET /contacts - static contacts page

use axum::{
    extract::{Path, State},
    http::Uri,
    response::Html,
    routing::get,
    Router,
};
use tera::Context as TeraContext;

use crate::api::middleware::{AppState, PageError};

/// Build the HTML site router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/post/{slug}", get(post_detail))
        .route("/tag/{tag_title}", get(tag_filter))
        .route("/contacts", get(contacts))
}

/// Render `template`, turning any failure into the themed error page
fn render_page(
    state: &AppState,
    template: &str,
    context: tera::Result<TeraContext>,
) -> Result<Html<String>, PageError> {
    let context = context.map_err(|e| PageError::internal(state, &e))?;
    let rendered = {
        let engine = state.theme_engine.read().map_err(|e| {
            PageError::internal(state, &format!("Failed to acquire theme lock: {}", e))
        })?;
        engine.render(template, &context)
    };

    rendered.map(Html).map_err(|e| PageError::internal(state, &e))
}

/// GET / - Home page
async fn home(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let page = state
        .blog_service
        .home()
        .await
        .map_err(|e| PageError::from_blog(&state, e))?;

    render_page(&state, "index.html", page.to_context())
}

/// GET /post/{slug} - Post detail page
async fn post_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, PageError> {
    let page = state
        .blog_service
        .post_detail(&slug)
        .await
        .map_err(|e| PageError::from_blog(&state, e))?;

    render_page(&state, "post-details.html", page.to_context())
}

/// GET /tag/{tag_title} - Posts with a tag
async fn tag_filter(
    State(state): State<AppState>,
    Path(tag_title): Path<String>,
) -> Result<Html<String>, PageError> {
    let page = state
        .blog_service
        .tag_filter(&tag_title)
        .await
        .map_err(|e| PageError::from_blog(&state, e))?;

    render_page(&state, "posts-list.html", page.to_context())
}

/// GET /contacts - Static page
async fn contacts(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    render_page(&state, "contacts.html", Ok(TeraContext::new()))
}

/// Themed 404 for every unrouted path
pub async fn not_found(State(state): State<AppState>, uri: Uri) -> PageError {
    PageError::not_found(&state, &format!("Nothing lives at {}", uri.path()))
}

#[cfg(test)]
mod tests {
    use crate::api::testing::{seed_post, test_app};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_home_page_lists_posts() {
        let (server, state) = test_app().await;
        seed_post(&state, "hello-world", &["Rust"]).await;

        let response = server.get("/").await;

        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains("hello-world"));
        assert!(html.contains("/tag/rust"));
    }

    #[tokio::test]
    async fn test_post_detail_page() {
        let (server, state) = test_app().await;
        seed_post(&state, "hello-world", &[]).await;

        let response = server.get("/post/hello-world").await;

        response.assert_status_ok();
        assert!(response.text().contains("No comments yet."));
    }

    #[tokio::test]
    async fn test_missing_post_is_themed_404() {
        let (server, _state) = test_app().await;

        let response = server.get("/post/missing").await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.text().contains("Page not found"));
    }

    #[tokio::test]
    async fn test_tag_page_matches_any_case() {
        let (server, state) = test_app().await;
        seed_post(&state, "tagged", &["Django"]).await;

        let response = server.get("/tag/DJANGO").await;

        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains("Posts tagged #django"));
        assert!(html.contains("/post/tagged"));
    }

    #[tokio::test]
    async fn test_unknown_tag_is_404() {
        let (server, _state) = test_app().await;

        server
            .get("/tag/nothing")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_contacts_page() {
        let (server, _state) = test_app().await;

        let response = server.get("/contacts").await;

        response.assert_status_ok();
        assert!(response.text().contains("Contacts"));
    }

    #[tokio::test]
    async fn test_unrouted_path_is_404() {
        let (server, _state) = test_app().await;

        let response = server.get("/no/such/page").await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.text().contains("Page not found"));
    }
}
