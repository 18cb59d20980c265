//! Tag repository
//!
//! Database operations for tags.
//!
//! This module provides:
//! - `TagRepository` trait defining the interface for tag data access
//! - `SqlxTagRepository` implementing the trait for SQLite and MySQL
//!
//! Post counts are always global: a tag's count covers every post carrying
//! it, not only the posts a query happened to select.

use super::{dedup_ids, placeholders};
use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Tag, TagWithCount};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Create a new tag
    async fn create(&self, tag: &Tag) -> Result<Tag>;

    /// Get tag by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>>;

    /// Get tag by its stored (lowercase) title
    async fn get_by_title(&self, title: &str) -> Result<Option<Tag>>;

    /// List all tags ordered by title
    async fn list(&self) -> Result<Vec<Tag>>;

    /// Tags with their post counts, most used first.
    ///
    /// Ties break on title. Tags without posts count as zero.
    async fn get_with_counts(&self, limit: usize) -> Result<Vec<TagWithCount>>;

    /// Tags of every given post in one query, as `(post_id, tag)` pairs.
    ///
    /// Pairs are ordered by post, then by tag title.
    async fn tags_for_posts(&self, post_ids: &[i64]) -> Result<Vec<(i64, TagWithCount)>>;

    /// Count how many of the given IDs exist
    async fn count_existing(&self, ids: &[i64]) -> Result<i64>;

    /// Delete a tag. Returns false when no tag had this ID.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based tag repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxTagRepository {
    pool: DynDatabasePool,
}

impl SqlxTagRepository {
    /// Create a new SQLx tag repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn create(&self, tag: &Tag) -> Result<Tag> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_tag_sqlite(self.pool.sqlite()?, tag).await,
            DatabaseDriver::Mysql => create_tag_mysql(self.pool.mysql()?, tag).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_tag_by_id_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_tag_by_id_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn get_by_title(&self, title: &str) -> Result<Option<Tag>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_tag_by_title_sqlite(self.pool.sqlite()?, title).await,
            DatabaseDriver::Mysql => get_tag_by_title_mysql(self.pool.mysql()?, title).await,
        }
    }

    async fn list(&self) -> Result<Vec<Tag>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_tags_sqlite(self.pool.sqlite()?).await,
            DatabaseDriver::Mysql => list_tags_mysql(self.pool.mysql()?).await,
        }
    }

    async fn get_with_counts(&self, limit: usize) -> Result<Vec<TagWithCount>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_tags_with_counts_sqlite(self.pool.sqlite()?, limit).await
            }
            DatabaseDriver::Mysql => get_tags_with_counts_mysql(self.pool.mysql()?, limit).await,
        }
    }

    async fn tags_for_posts(&self, post_ids: &[i64]) -> Result<Vec<(i64, TagWithCount)>> {
        let ids = dedup_ids(post_ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        match self.pool.driver() {
            DatabaseDriver::Sqlite => tags_for_posts_sqlite(self.pool.sqlite()?, &ids).await,
            DatabaseDriver::Mysql => tags_for_posts_mysql(self.pool.mysql()?, &ids).await,
        }
    }

    async fn count_existing(&self, ids: &[i64]) -> Result<i64> {
        let ids = dedup_ids(ids);
        if ids.is_empty() {
            return Ok(0);
        }
        let sql = format!(
            "SELECT COUNT(*) AS count FROM tags WHERE id IN ({})",
            placeholders(ids.len())
        );
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let mut query = sqlx::query(&sql);
                for id in &ids {
                    query = query.bind(id);
                }
                let row = query
                    .fetch_one(self.pool.sqlite()?)
                    .await
                    .context("Failed to count tags")?;
                Ok(row.get("count"))
            }
            DatabaseDriver::Mysql => {
                let mut query = sqlx::query(&sql);
                for id in &ids {
                    query = query.bind(id);
                }
                let row = query
                    .fetch_one(self.pool.mysql()?)
                    .await
                    .context("Failed to count tags")?;
                Ok(row.get("count"))
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query("DELETE FROM tags WHERE id = ?")
                    .bind(id)
                    .execute(self.pool.sqlite()?)
                    .await
                    .context("Failed to delete tag")?
                    .rows_affected()
            }
            DatabaseDriver::Mysql => {
                sqlx::query("DELETE FROM tags WHERE id = ?")
                    .bind(id)
                    .execute(self.pool.mysql()?)
                    .await
                    .context("Failed to delete tag")?
                    .rows_affected()
            }
        };
        Ok(affected > 0)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_tag_sqlite(pool: &SqlitePool, tag: &Tag) -> Result<Tag> {
    let result = sqlx::query("INSERT INTO tags (title) VALUES (?)")
        .bind(&tag.title)
        .execute(pool)
        .await
        .context("Failed to create tag")?;

    Ok(Tag {
        id: result.last_insert_rowid(),
        title: tag.title.clone(),
    })
}

async fn get_tag_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Tag>> {
    let row = sqlx::query("SELECT id, title FROM tags WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get tag by ID")?;

    Ok(row.as_ref().map(row_to_tag_sqlite))
}

async fn get_tag_by_title_sqlite(pool: &SqlitePool, title: &str) -> Result<Option<Tag>> {
    let row = sqlx::query("SELECT id, title FROM tags WHERE title = ?")
        .bind(title)
        .fetch_optional(pool)
        .await
        .context("Failed to get tag by title")?;

    Ok(row.as_ref().map(row_to_tag_sqlite))
}

async fn list_tags_sqlite(pool: &SqlitePool) -> Result<Vec<Tag>> {
    let rows = sqlx::query("SELECT id, title FROM tags ORDER BY title")
        .fetch_all(pool)
        .await
        .context("Failed to list tags")?;

    Ok(rows.iter().map(row_to_tag_sqlite).collect())
}

async fn get_tags_with_counts_sqlite(pool: &SqlitePool, limit: usize) -> Result<Vec<TagWithCount>> {
    let rows = sqlx::query(
        r#"
        SELECT t.id, t.title, COUNT(pt.post_id) AS posts_count
        FROM tags t
        LEFT JOIN post_tags pt ON t.id = pt.tag_id
        GROUP BY t.id, t.title
        ORDER BY posts_count DESC, t.title ASC
        LIMIT ?
        "#,
    )
    .bind(limit as i64)
    .fetch_all(pool)
    .await
    .context("Failed to get tags with counts")?;

    Ok(rows
        .iter()
        .map(|row| TagWithCount::new(row_to_tag_sqlite(row), row.get("posts_count")))
        .collect())
}

async fn tags_for_posts_sqlite(
    pool: &SqlitePool,
    post_ids: &[i64],
) -> Result<Vec<(i64, TagWithCount)>> {
    let sql = tags_for_posts_sql(post_ids.len());
    let mut query = sqlx::query(&sql);
    for id in post_ids {
        query = query.bind(id);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to get tags for posts")?;

    Ok(rows
        .iter()
        .map(|row| {
            let post_id: i64 = row.get("post_id");
            let tag = TagWithCount::new(row_to_tag_sqlite(row), row.get("posts_count"));
            (post_id, tag)
        })
        .collect())
}

fn row_to_tag_sqlite(row: &sqlx::sqlite::SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        title: row.get("title"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_tag_mysql(pool: &MySqlPool, tag: &Tag) -> Result<Tag> {
    let result = sqlx::query("INSERT INTO tags (title) VALUES (?)")
        .bind(&tag.title)
        .execute(pool)
        .await
        .context("Failed to create tag")?;

    Ok(Tag {
        id: result.last_insert_id() as i64,
        title: tag.title.clone(),
    })
}

async fn get_tag_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Tag>> {
    let row = sqlx::query("SELECT id, title FROM tags WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get tag by ID")?;

    Ok(row.as_ref().map(row_to_tag_mysql))
}

async fn get_tag_by_title_mysql(pool: &MySqlPool, title: &str) -> Result<Option<Tag>> {
    let row = sqlx::query("SELECT id, title FROM tags WHERE title = ?")
        .bind(title)
        .fetch_optional(pool)
        .await
        .context("Failed to get tag by title")?;

    Ok(row.as_ref().map(row_to_tag_mysql))
}

async fn list_tags_mysql(pool: &MySqlPool) -> Result<Vec<Tag>> {
    let rows = sqlx::query("SELECT id, title FROM tags ORDER BY title")
        .fetch_all(pool)
        .await
        .context("Failed to list tags")?;

    Ok(rows.iter().map(row_to_tag_mysql).collect())
}

async fn get_tags_with_counts_mysql(pool: &MySqlPool, limit: usize) -> Result<Vec<TagWithCount>> {
    let rows = sqlx::query(
        r#"
        SELECT t.id, t.title, COUNT(pt.post_id) AS posts_count
        FROM tags t
        LEFT JOIN post_tags pt ON t.id = pt.tag_id
        GROUP BY t.id, t.title
        ORDER BY posts_count DESC, t.title ASC
        LIMIT ?
        "#,
    )
    .bind(limit as i64)
    .fetch_all(pool)
    .await
    .context("Failed to get tags with counts")?;

    Ok(rows
        .iter()
        .map(|row| TagWithCount::new(row_to_tag_mysql(row), row.get("posts_count")))
        .collect())
}

async fn tags_for_posts_mysql(
    pool: &MySqlPool,
    post_ids: &[i64],
) -> Result<Vec<(i64, TagWithCount)>> {
    let sql = tags_for_posts_sql(post_ids.len());
    let mut query = sqlx::query(&sql);
    for id in post_ids {
        query = query.bind(id);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to get tags for posts")?;

    Ok(rows
        .iter()
        .map(|row| {
            let post_id: i64 = row.get("post_id");
            let tag = TagWithCount::new(row_to_tag_mysql(row), row.get("posts_count"));
            (post_id, tag)
        })
        .collect())
}

fn row_to_tag_mysql(row: &sqlx::mysql::MySqlRow) -> Tag {
    Tag {
        id: row.get("id"),
        title: row.get("title"),
    }
}

/// Tags of a set of posts with each tag's global post count
fn tags_for_posts_sql(n: usize) -> String {
    format!(
        r#"
        SELECT pt.post_id, t.id, t.title,
               (SELECT COUNT(*) FROM post_tags c WHERE c.tag_id = t.id) AS posts_count
        FROM post_tags pt
        JOIN tags t ON t.id = pt.tag_id
        WHERE pt.post_id IN ({})
        ORDER BY pt.post_id, t.title
        "#,
        placeholders(n)
    )
}
