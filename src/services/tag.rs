//! Tag service
//!
//! Implements business logic for tag management:
//! - Creating tags with normalized, unique titles
//! - Looking tags up by the title used in URLs
//! - The popular-tags summary shown in every sidebar

use crate::db::repositories::{is_unique_violation, TagRepository};
use crate::models::{normalize_tag_title, Tag, TagSummary, MAX_TAG_TITLE_LENGTH};
use anyhow::Context;
use std::sync::Arc;

/// Error types for tag service operations
#[derive(Debug, thiserror::Error)]
pub enum TagServiceError {
    /// Tag not found
    #[error("Tag not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Title already in use
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Tag service for managing blog tags
pub struct TagService {
    repo: Arc<dyn TagRepository>,
}

impl TagService {
    /// Create a new tag service
    pub fn new(repo: Arc<dyn TagRepository>) -> Self {
        Self { repo }
    }

    /// Create a tag.
    ///
    /// The title is trimmed and lowercased before it is checked and stored,
    /// so "Django" and "django" are the same tag.
    ///
    /// # Errors
    /// - `ValidationError` if the normalized title is empty or too long
    /// - `Conflict` if a tag with the normalized title exists
    pub async fn create(&self, title: &str) -> Result<Tag, TagServiceError> {
        let tag = Tag::new(title);
        if tag.title.is_empty() {
            return Err(TagServiceError::ValidationError(
                "Tag title cannot be empty".to_string(),
            ));
        }
        if tag.title.chars().count() > MAX_TAG_TITLE_LENGTH {
            return Err(TagServiceError::ValidationError(format!(
                "Tag title cannot exceed {} characters",
                MAX_TAG_TITLE_LENGTH
            )));
        }

        let conflict = || TagServiceError::Conflict(format!("Tag '{}' already exists", tag.title));

        if self
            .repo
            .get_by_title(&tag.title)
            .await
            .context("Failed to check existing tag")?
            .is_some()
        {
            return Err(conflict());
        }

        let created = self.repo.create(&tag).await.map_err(|e| {
            if is_unique_violation(&e) {
                conflict()
            } else {
                TagServiceError::InternalError(e.context("Failed to create tag"))
            }
        })?;

        tracing::info!("Created tag '{}' ({})", created.title, created.id);
        Ok(created)
    }

    /// Find a tag by title, matching case-insensitively
    pub async fn get_by_title(&self, title: &str) -> Result<Option<Tag>, TagServiceError> {
        self.repo
            .get_by_title(&normalize_tag_title(title))
            .await
            .context("Failed to get tag by title")
            .map_err(Into::into)
    }

    /// Get tag by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Tag>, TagServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get tag by ID")
            .map_err(Into::into)
    }

    /// List all tags ordered by title
    pub async fn list(&self) -> Result<Vec<Tag>, TagServiceError> {
        self.repo
            .list()
            .await
            .context("Failed to list tags")
            .map_err(Into::into)
    }

    /// Top `limit` tags by number of posts.
    ///
    /// Unused tags take part with a count of zero; ties break on title.
    pub async fn popular_tags(&self, limit: usize) -> Result<Vec<TagSummary>, TagServiceError> {
        let tags = self
            .repo
            .get_with_counts(limit)
            .await
            .context("Failed to get popular tags")?;

        Ok(tags.into_iter().map(TagSummary::from).collect())
    }

    /// Delete a tag, detaching it from every post
    pub async fn delete(&self, id: i64) -> Result<(), TagServiceError> {
        let deleted = self
            .repo
            .delete(id)
            .await
            .context("Failed to delete tag")?;

        if !deleted {
            return Err(TagServiceError::NotFound(format!("Tag {} not found", id)));
        }
        tracing::info!("Deleted tag {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxTagRepository;
    use crate::db::{create_test_pool, migrations, DynDatabasePool};

    async fn setup_test_service() -> (DynDatabasePool, TagService) {
        let pool = create_test_pool()
            .await
            .expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let repo = SqlxTagRepository::boxed(pool.clone());
        let service = TagService::new(repo);

        (pool, service)
    }

    /// Insert a post carrying the given tags, bypassing the post service
    async fn insert_tagged_post(pool: &DynDatabasePool, slug: &str, tag_ids: &[i64]) {
        let sqlite = pool.as_sqlite().unwrap();
        sqlx::query("INSERT OR IGNORE INTO users (id, username, is_staff) VALUES (1, 'writer', 1)")
            .execute(sqlite)
            .await
            .unwrap();
        let post_id = sqlx::query(
            "INSERT INTO posts (title, text, slug, published_at, author_id) VALUES ('T', 'B', ?, ?, 1)",
        )
        .bind(slug)
        .bind(chrono::Utc::now())
        .execute(sqlite)
        .await
        .unwrap()
        .last_insert_rowid();
        for tag_id in tag_ids {
            sqlx::query("INSERT INTO post_tags (post_id, tag_id) VALUES (?, ?)")
                .bind(post_id)
                .bind(tag_id)
                .execute(sqlite)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_title() {
        let (_pool, service) = setup_test_service().await;

        let tag = service.create("Django").await.expect("Failed to create tag");

        assert_eq!(tag.title, "django");
        let found = service.get_by_title("django").await.unwrap().expect("Tag not found");
        assert_eq!(found.id, tag.id);
    }

    #[tokio::test]
    async fn test_get_by_title_is_case_insensitive() {
        let (_pool, service) = setup_test_service().await;
        let tag = service.create("python").await.unwrap();

        let found = service.get_by_title("PyThOn").await.unwrap().expect("Tag not found");

        assert_eq!(found.id, tag.id);
    }

    #[tokio::test]
    async fn test_create_rejects_case_variant_duplicate() {
        let (_pool, service) = setup_test_service().await;
        service.create("web").await.unwrap();

        let result = service.create("WEB").await;

        assert!(matches!(result, Err(TagServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_concurrent_creates_of_one_title() {
        let (_pool, service) = setup_test_service().await;

        let (first, second) = tokio::join!(service.create("Rust"), service.create("rust"));

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(TagServiceError::Conflict(_)))));
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_validates_length() {
        let (_pool, service) = setup_test_service().await;

        assert!(matches!(
            service.create("  ").await,
            Err(TagServiceError::ValidationError(_))
        ));
        assert!(matches!(
            service.create(&"t".repeat(MAX_TAG_TITLE_LENGTH + 1)).await,
            Err(TagServiceError::ValidationError(_))
        ));
        assert!(service.create(&"t".repeat(MAX_TAG_TITLE_LENGTH)).await.is_ok());
    }

    #[tokio::test]
    async fn test_popular_tags_counts_and_order() {
        let (pool, service) = setup_test_service().await;
        let rust = service.create("rust").await.unwrap();
        let go = service.create("go").await.unwrap();
        service.create("idle").await.unwrap();
        insert_tagged_post(&pool, "a", &[rust.id, go.id]).await;
        insert_tagged_post(&pool, "b", &[rust.id]).await;

        let popular = service.popular_tags(5).await.unwrap();

        assert_eq!(
            popular,
            vec![
                TagSummary { title: "rust".to_string(), posts_with_tag: 2 },
                TagSummary { title: "go".to_string(), posts_with_tag: 1 },
                TagSummary { title: "idle".to_string(), posts_with_tag: 0 },
            ]
        );
        assert_eq!(service.popular_tags(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_tag() {
        let (_pool, service) = setup_test_service().await;
        let tag = service.create("temp").await.unwrap();

        service.delete(tag.id).await.expect("Failed to delete tag");

        assert!(service.get_by_id(tag.id).await.unwrap().is_none());
        assert!(matches!(
            service.delete(tag.id).await,
            Err(TagServiceError::NotFound(_))
        ));
    }

    // ========================================================================
    // Property tests
    // ========================================================================

    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        /// Popular tag counts equal the number of posts that reference each tag,
        /// and the list never grows past the requested size.
        #[test]
        fn property_popular_tag_counts_are_exact(
            assignments in prop::collection::vec(prop::collection::vec(any::<bool>(), 4), 0..8),
            limit in 1..6usize,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let result: Result<(), TestCaseError> = rt.block_on(async {
                let (pool, service) = setup_test_service().await;

                let mut tags = Vec::new();
                for i in 0..4 {
                    tags.push(service.create(&format!("tag{}", i)).await.unwrap());
                }

                let mut expected = [0i64; 4];
                for (n, flags) in assignments.iter().enumerate() {
                    let ids: Vec<i64> = flags
                        .iter()
                        .zip(&tags)
                        .filter(|(on, _)| **on)
                        .map(|(_, t)| t.id)
                        .collect();
                    for (i, on) in flags.iter().enumerate() {
                        if *on {
                            expected[i] += 1;
                        }
                    }
                    insert_tagged_post(&pool, &format!("post-{}", n), &ids).await;
                }

                let popular = service.popular_tags(limit).await.unwrap();
                prop_assert!(popular.len() <= limit);
                for window in popular.windows(2) {
                    prop_assert!(window[0].posts_with_tag >= window[1].posts_with_tag);
                }
                for summary in &popular {
                    let index = tags.iter().position(|t| t.title == summary.title).unwrap();
                    prop_assert_eq!(summary.posts_with_tag, expected[index]);
                }
                Ok(())
            });
            result?;
        }
    }
}
