//! Comment repository
//!
//! Database operations for comments.
//!
//! Comments under a post read oldest first. The admin listing orders by ID
//! and can filter on a substring of the comment text.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Comment, CommentListItem, CommentWithAuthor, CreateCommentInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a new comment
    async fn create(&self, input: &CreateCommentInput) -> Result<Comment>;

    /// Comments of a post with their authors, oldest first
    async fn list_by_post(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>>;

    /// Admin listing ordered by ID, optionally filtered by text
    async fn list(&self, search: Option<&str>, offset: i64, limit: i64)
        -> Result<Vec<CommentListItem>>;

    /// Count comments matching the admin filter
    async fn count(&self, search: Option<&str>) -> Result<i64>;

    /// Delete a comment. Returns false when no comment had this ID.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, input: &CreateCommentInput) -> Result<Comment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_comment_sqlite(self.pool.sqlite()?, input).await,
            DatabaseDriver::Mysql => create_comment_mysql(self.pool.mysql()?, input).await,
        }
    }

    async fn list_by_post(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_comments_by_post_sqlite(self.pool.sqlite()?, post_id).await
            }
            DatabaseDriver::Mysql => list_comments_by_post_mysql(self.pool.mysql()?, post_id).await,
        }
    }

    async fn list(
        &self,
        search: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<CommentListItem>> {
        let pattern = like_pattern(search);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_comments_sqlite(self.pool.sqlite()?, &pattern, offset, limit).await
            }
            DatabaseDriver::Mysql => {
                list_comments_mysql(self.pool.mysql()?, &pattern, offset, limit).await
            }
        }
    }

    async fn count(&self, search: Option<&str>) -> Result<i64> {
        let pattern = like_pattern(search);
        let count: i64 = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query(r"SELECT COUNT(*) AS count FROM comments WHERE text LIKE ? ESCAPE '\'")
                    .bind(&pattern)
                    .fetch_one(self.pool.sqlite()?)
                    .await
                    .context("Failed to count comments")?
                    .get("count")
            }
            DatabaseDriver::Mysql => sqlx::query("SELECT COUNT(*) AS count FROM comments WHERE text LIKE ?")
                .bind(&pattern)
                .fetch_one(self.pool.mysql()?)
                .await
                .context("Failed to count comments")?
                .get("count"),
        };
        Ok(count)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query("DELETE FROM comments WHERE id = ?")
                .bind(id)
                .execute(self.pool.sqlite()?)
                .await
                .context("Failed to delete comment")?
                .rows_affected(),
            DatabaseDriver::Mysql => sqlx::query("DELETE FROM comments WHERE id = ?")
                .bind(id)
                .execute(self.pool.mysql()?)
                .await
                .context("Failed to delete comment")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }
}

/// `LIKE` pattern for a text search; no search matches everything
fn like_pattern(search: Option<&str>) -> String {
    match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => {
            let escaped = s
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{}%", escaped)
        }
        None => "%".to_string(),
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_comment_sqlite(pool: &SqlitePool, input: &CreateCommentInput) -> Result<Comment> {
    let published_at = input.published_at.unwrap_or_else(Utc::now);

    let result = sqlx::query(
        "INSERT INTO comments (post_id, author_id, text, published_at) VALUES (?, ?, ?, ?)",
    )
    .bind(input.post_id)
    .bind(input.author_id)
    .bind(&input.text)
    .bind(published_at)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_rowid(),
        post_id: input.post_id,
        author_id: input.author_id,
        text: input.text.clone(),
        published_at,
    })
}

async fn list_comments_by_post_sqlite(
    pool: &SqlitePool,
    post_id: i64,
) -> Result<Vec<CommentWithAuthor>> {
    let rows = sqlx::query(
        r#"
        SELECT c.id, c.post_id, c.author_id, c.text, c.published_at, u.username AS author_name
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.post_id = ?
        ORDER BY c.published_at ASC, c.id ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
    .context("Failed to list comments by post")?;

    Ok(rows
        .iter()
        .map(|row| CommentWithAuthor {
            comment: Comment {
                id: row.get("id"),
                post_id: row.get("post_id"),
                author_id: row.get("author_id"),
                text: row.get("text"),
                published_at: row.get("published_at"),
            },
            author_name: row.get("author_name"),
        })
        .collect())
}

async fn list_comments_sqlite(
    pool: &SqlitePool,
    pattern: &str,
    offset: i64,
    limit: i64,
) -> Result<Vec<CommentListItem>> {
    let rows = sqlx::query(
        r#"
        SELECT c.id, c.post_id, p.title AS post_title, u.username AS author, c.text, c.published_at
        FROM comments c
        JOIN posts p ON p.id = c.post_id
        JOIN users u ON u.id = c.author_id
        WHERE c.text LIKE ? ESCAPE '\'
        ORDER BY c.id ASC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(pattern)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list comments")?;

    Ok(rows
        .iter()
        .map(|row| CommentListItem {
            id: row.get("id"),
            post_id: row.get("post_id"),
            post_title: row.get("post_title"),
            author: row.get("author"),
            text: row.get("text"),
            published_at: row.get("published_at"),
        })
        .collect())
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_comment_mysql(pool: &MySqlPool, input: &CreateCommentInput) -> Result<Comment> {
    let published_at = input.published_at.unwrap_or_else(Utc::now);

    let result = sqlx::query(
        "INSERT INTO comments (post_id, author_id, text, published_at) VALUES (?, ?, ?, ?)",
    )
    .bind(input.post_id)
    .bind(input.author_id)
    .bind(&input.text)
    .bind(published_at)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_id() as i64,
        post_id: input.post_id,
        author_id: input.author_id,
        text: input.text.clone(),
        published_at,
    })
}

async fn list_comments_by_post_mysql(
    pool: &MySqlPool,
    post_id: i64,
) -> Result<Vec<CommentWithAuthor>> {
    let rows = sqlx::query(
        r#"
        SELECT c.id, c.post_id, c.author_id, c.text, c.published_at, u.username AS author_name
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.post_id = ?
        ORDER BY c.published_at ASC, c.id ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
    .context("Failed to list comments by post")?;

    Ok(rows
        .iter()
        .map(|row| CommentWithAuthor {
            comment: Comment {
                id: row.get("id"),
                post_id: row.get("post_id"),
                author_id: row.get("author_id"),
                text: row.get("text"),
                published_at: row.get("published_at"),
            },
            author_name: row.get("author_name"),
        })
        .collect())
}

async fn list_comments_mysql(
    pool: &MySqlPool,
    pattern: &str,
    offset: i64,
    limit: i64,
) -> Result<Vec<CommentListItem>> {
    // MySQL escapes LIKE wildcards with backslash by default
    let rows = sqlx::query(
        r#"
        SELECT c.id, c.post_id, p.title AS post_title, u.username AS author, c.text, c.published_at
        FROM comments c
        JOIN posts p ON p.id = c.post_id
        JOIN users u ON u.id = c.author_id
        WHERE c.text LIKE ?
        ORDER BY c.id ASC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(pattern)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list comments")?;

    Ok(rows
        .iter()
        .map(|row| CommentListItem {
            id: row.get("id"),
            post_id: row.get("post_id"),
            post_title: row.get("post_title"),
            author: row.get("author"),
            text: row.get("text"),
            published_at: row.get("published_at"),
        })
        .collect())
}
