//! API layer - HTTP handlers and routing
//!
//! This module contains every HTTP endpoint of Quill:
//! - Themed HTML pages (home, post detail, tag filter, contacts)
//! - JSON read API mirroring the page contexts
//! - Admin JSON API for content management
//! - Media file serving

pub mod admin;
pub mod middleware;
pub mod posts;
pub mod site;
pub mod tags;

use axum::Router;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::MediaConfig;

pub use middleware::{ApiError, AppState, PageError};

/// Build the JSON API router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .merge(posts::router())
        .nest("/tags", tags::router())
        .nest("/admin", admin::router())
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, media: &MediaConfig) -> Router {
    // Validated config guarantees a prefix like "/media/"
    let media_mount = media.url_prefix.trim_end_matches('/');

    Router::new()
        .merge(site::router())
        .nest("/api/v1", build_api_router())
        .nest_service(media_mount, ServeDir::new(&media.root))
        .fallback(site::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for HTTP tests

    use super::*;
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreatePostInput, CreateUserInput, Post};
    use crate::theme::ThemeEngine;
    use axum_test::TestServer;

    /// Server over a fresh in-memory database and the built-in theme
    pub async fn test_app() -> (TestServer, AppState) {
        test_app_with_media(MediaConfig::default()).await
    }

    pub async fn test_app_with_media(media: MediaConfig) -> (TestServer, AppState) {
        let pool = create_test_pool()
            .await
            .expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let theme = ThemeEngine::builtin().expect("Failed to load built-in theme");
        let state = AppState::new(pool, media.clone(), theme);
        let server = TestServer::new(build_router(state.clone(), &media))
            .expect("Failed to start test server");

        (server, state)
    }

    /// Publish a post titled after its slug, creating tags and a staff author as needed
    pub async fn seed_post(state: &AppState, slug: &str, tags: &[&str]) -> Post {
        let author = match state.user_service.create(CreateUserInput::new("author", true)).await {
            Ok(user) => user.id,
            // Already created by an earlier call
            Err(_) => 1,
        };

        let mut tag_ids = Vec::new();
        for title in tags {
            let tag = match state.tag_service.get_by_title(title).await.unwrap() {
                Some(tag) => tag,
                None => state.tag_service.create(title).await.unwrap(),
            };
            tag_ids.push(tag.id);
        }

        state
            .post_service
            .create(CreatePostInput::new(slug, "Body text", slug, author).with_tags(tag_ids))
            .await
            .expect("Failed to seed post")
    }
}
