//! Post repository
//!
//! Database operations for posts and their tag and like relations.
//!
//! This module provides:
//! - `PostRepository` trait defining the interface for post data access
//! - `SqlxPostRepository` implementing the trait for SQLite and MySQL
//!
//! Ranking queries return bare IDs in rank order; `fetch_rows` then loads
//! any set of IDs in a single query. Writes that touch relations run in a
//! transaction so a post never shows up with half of its tags.

use super::{dedup_ids, placeholders};
use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreatePostInput, Post, PostListItem, PostRow, UpdatePostInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlConnection, MySqlPool, Row, SqliteConnection, SqlitePool};
use std::sync::Arc;

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a post together with its tag and like relations
    async fn create(&self, input: &CreatePostInput) -> Result<Post>;

    /// Get post by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Get post by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// Apply an update. Returns `None` when the post does not exist.
    async fn update(&self, id: i64, input: &UpdatePostInput) -> Result<Option<Post>>;

    /// Delete a post. Returns false when no post had this ID.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Admin listing, newest first
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<PostListItem>>;

    /// Total number of posts
    async fn count(&self) -> Result<i64>;

    /// Check whether a slug is taken, optionally ignoring one post
    async fn exists_by_slug(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool>;

    /// IDs of the most liked posts.
    ///
    /// Only posts with at least one like are ranked. Ties break on ascending ID.
    async fn popular_ids(&self, limit: usize) -> Result<Vec<i64>>;

    /// IDs of the newest posts, ties broken on descending ID
    async fn fresh_ids(&self, limit: usize) -> Result<Vec<i64>>;

    /// IDs of the newest posts carrying a tag
    async fn fresh_ids_by_tag(&self, tag_id: i64, limit: usize) -> Result<Vec<i64>>;

    /// Load posts with author name and comment count in one query.
    ///
    /// Rows come back in no particular order; missing IDs are skipped.
    async fn fetch_rows(&self, ids: &[i64]) -> Result<Vec<PostRow>>;

    /// Record a like. Returns false when the user already liked the post.
    async fn add_like(&self, post_id: i64, user_id: i64) -> Result<bool>;

    /// Withdraw a like. Returns false when there was none.
    async fn remove_like(&self, post_id: i64, user_id: i64) -> Result<bool>;

    /// Number of users who liked a post
    async fn like_count(&self, post_id: i64) -> Result<i64>;
}

/// SQLx-based post repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, input: &CreatePostInput) -> Result<Post> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_post_sqlite(self.pool.sqlite()?, input).await,
            DatabaseDriver::Mysql => create_post_mysql(self.pool.mysql()?, input).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_post_by_id_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_post_by_id_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_post_by_slug_sqlite(self.pool.sqlite()?, slug).await,
            DatabaseDriver::Mysql => get_post_by_slug_mysql(self.pool.mysql()?, slug).await,
        }
    }

    async fn update(&self, id: i64, input: &UpdatePostInput) -> Result<Option<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_post_sqlite(self.pool.sqlite()?, id, input).await,
            DatabaseDriver::Mysql => update_post_mysql(self.pool.mysql()?, id, input).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        // post_tags, post_likes and comments go with it via ON DELETE CASCADE
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query("DELETE FROM posts WHERE id = ?")
                .bind(id)
                .execute(self.pool.sqlite()?)
                .await
                .context("Failed to delete post")?
                .rows_affected(),
            DatabaseDriver::Mysql => sqlx::query("DELETE FROM posts WHERE id = ?")
                .bind(id)
                .execute(self.pool.mysql()?)
                .await
                .context("Failed to delete post")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<PostListItem>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_posts_sqlite(self.pool.sqlite()?, offset, limit).await,
            DatabaseDriver::Mysql => list_posts_mysql(self.pool.mysql()?, offset, limit).await,
        }
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query("SELECT COUNT(*) AS count FROM posts")
                .fetch_one(self.pool.sqlite()?)
                .await
                .context("Failed to count posts")?
                .get("count"),
            DatabaseDriver::Mysql => sqlx::query("SELECT COUNT(*) AS count FROM posts")
                .fetch_one(self.pool.mysql()?)
                .await
                .context("Failed to count posts")?
                .get("count"),
        };
        Ok(count)
    }

    async fn exists_by_slug(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        // No real post has ID 0
        let exclude_id = exclude_id.unwrap_or(0);
        let count: i64 = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query("SELECT COUNT(*) AS count FROM posts WHERE slug = ? AND id != ?")
                    .bind(slug)
                    .bind(exclude_id)
                    .fetch_one(self.pool.sqlite()?)
                    .await
                    .context("Failed to check post slug existence")?;
                row.get("count")
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query("SELECT COUNT(*) AS count FROM posts WHERE slug = ? AND id != ?")
                    .bind(slug)
                    .bind(exclude_id)
                    .fetch_one(self.pool.mysql()?)
                    .await
                    .context("Failed to check post slug existence")?;
                row.get("count")
            }
        };
        Ok(count > 0)
    }

    async fn popular_ids(&self, limit: usize) -> Result<Vec<i64>> {
        let sql = r#"
            SELECT post_id AS id
            FROM post_likes
            GROUP BY post_id
            ORDER BY COUNT(*) DESC, post_id ASC
            LIMIT ?
        "#;
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(sql)
                    .bind(limit as i64)
                    .fetch_all(self.pool.sqlite()?)
                    .await
                    .context("Failed to rank popular posts")?;
                Ok(rows.iter().map(|row| row.get("id")).collect())
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(sql)
                    .bind(limit as i64)
                    .fetch_all(self.pool.mysql()?)
                    .await
                    .context("Failed to rank popular posts")?;
                Ok(rows.iter().map(|row| row.get("id")).collect())
            }
        }
    }

    async fn fresh_ids(&self, limit: usize) -> Result<Vec<i64>> {
        let sql = "SELECT id FROM posts ORDER BY published_at DESC, id DESC LIMIT ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(sql)
                    .bind(limit as i64)
                    .fetch_all(self.pool.sqlite()?)
                    .await
                    .context("Failed to rank fresh posts")?;
                Ok(rows.iter().map(|row| row.get("id")).collect())
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(sql)
                    .bind(limit as i64)
                    .fetch_all(self.pool.mysql()?)
                    .await
                    .context("Failed to rank fresh posts")?;
                Ok(rows.iter().map(|row| row.get("id")).collect())
            }
        }
    }

    async fn fresh_ids_by_tag(&self, tag_id: i64, limit: usize) -> Result<Vec<i64>> {
        let sql = r#"
            SELECT p.id
            FROM posts p
            JOIN post_tags pt ON pt.post_id = p.id
            WHERE pt.tag_id = ?
            ORDER BY p.published_at DESC, p.id DESC
            LIMIT ?
        "#;
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let rows = sqlx::query(sql)
                    .bind(tag_id)
                    .bind(limit as i64)
                    .fetch_all(self.pool.sqlite()?)
                    .await
                    .context("Failed to list posts by tag")?;
                Ok(rows.iter().map(|row| row.get("id")).collect())
            }
            DatabaseDriver::Mysql => {
                let rows = sqlx::query(sql)
                    .bind(tag_id)
                    .bind(limit as i64)
                    .fetch_all(self.pool.mysql()?)
                    .await
                    .context("Failed to list posts by tag")?;
                Ok(rows.iter().map(|row| row.get("id")).collect())
            }
        }
    }

    async fn fetch_rows(&self, ids: &[i64]) -> Result<Vec<PostRow>> {
        let ids = dedup_ids(ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        match self.pool.driver() {
            DatabaseDriver::Sqlite => fetch_rows_sqlite(self.pool.sqlite()?, &ids).await,
            DatabaseDriver::Mysql => fetch_rows_mysql(self.pool.mysql()?, &ids).await,
        }
    }

    async fn add_like(&self, post_id: i64, user_id: i64) -> Result<bool> {
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query("INSERT OR IGNORE INTO post_likes (post_id, user_id) VALUES (?, ?)")
                    .bind(post_id)
                    .bind(user_id)
                    .execute(self.pool.sqlite()?)
                    .await
                    .context("Failed to add like")?
                    .rows_affected()
            }
            DatabaseDriver::Mysql => {
                sqlx::query("INSERT IGNORE INTO post_likes (post_id, user_id) VALUES (?, ?)")
                    .bind(post_id)
                    .bind(user_id)
                    .execute(self.pool.mysql()?)
                    .await
                    .context("Failed to add like")?
                    .rows_affected()
            }
        };
        Ok(affected > 0)
    }

    async fn remove_like(&self, post_id: i64, user_id: i64) -> Result<bool> {
        let sql = "DELETE FROM post_likes WHERE post_id = ? AND user_id = ?";
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(sql)
                .bind(post_id)
                .bind(user_id)
                .execute(self.pool.sqlite()?)
                .await
                .context("Failed to remove like")?
                .rows_affected(),
            DatabaseDriver::Mysql => sqlx::query(sql)
                .bind(post_id)
                .bind(user_id)
                .execute(self.pool.mysql()?)
                .await
                .context("Failed to remove like")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }

    async fn like_count(&self, post_id: i64) -> Result<i64> {
        let sql = "SELECT COUNT(*) AS count FROM post_likes WHERE post_id = ?";
        let count: i64 = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(sql)
                .bind(post_id)
                .fetch_one(self.pool.sqlite()?)
                .await
                .context("Failed to count likes")?
                .get("count"),
            DatabaseDriver::Mysql => sqlx::query(sql)
                .bind(post_id)
                .fetch_one(self.pool.mysql()?)
                .await
                .context("Failed to count likes")?
                .get("count"),
        };
        Ok(count)
    }
}

/// A post-to-something link table
struct Link {
    table: &'static str,
    column: &'static str,
}

const TAG_LINK: Link = Link {
    table: "post_tags",
    column: "tag_id",
};

const LIKE_LINK: Link = Link {
    table: "post_likes",
    column: "user_id",
};

const POST_COLUMNS: &str = "id, title, text, slug, image, published_at, author_id";

/// Rows for a set of posts: author name and comment count ride along
fn fetch_rows_sql(n: usize) -> String {
    format!(
        r#"
        SELECT p.id, p.title, p.text, p.slug, p.image, p.published_at, p.author_id,
               u.username AS author_name,
               (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments_count
        FROM posts p
        JOIN users u ON u.id = p.author_id
        WHERE p.id IN ({})
        "#,
        placeholders(n)
    )
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_post_sqlite(pool: &SqlitePool, input: &CreatePostInput) -> Result<Post> {
    let published_at = input.published_at.unwrap_or_else(Utc::now);

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let result = sqlx::query(
        r#"
        INSERT INTO posts (title, text, slug, image, published_at, author_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.text)
    .bind(&input.slug)
    .bind(&input.image)
    .bind(published_at)
    .bind(input.author_id)
    .execute(&mut *tx)
    .await
    .context("Failed to create post")?;

    let id = result.last_insert_rowid();
    replace_links_sqlite(&mut tx, &TAG_LINK, id, &input.tag_ids).await?;
    replace_links_sqlite(&mut tx, &LIKE_LINK, id, &input.like_user_ids).await?;

    tx.commit().await.context("Failed to commit post")?;

    Ok(Post {
        id,
        title: input.title.clone(),
        text: input.text.clone(),
        slug: input.slug.clone(),
        image: input.image.clone(),
        published_at,
        author_id: input.author_id,
    })
}

async fn get_post_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by ID")?;

    Ok(row.as_ref().map(row_to_post_sqlite))
}

async fn get_post_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("SELECT {} FROM posts WHERE slug = ?", POST_COLUMNS))
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by slug")?;

    Ok(row.as_ref().map(row_to_post_sqlite))
}

async fn update_post_sqlite(
    pool: &SqlitePool,
    id: i64,
    input: &UpdatePostInput,
) -> Result<Option<Post>> {
    let Some(existing) = get_post_by_id_sqlite(pool, id).await? else {
        return Ok(None);
    };
    let updated = apply_update(existing, input);

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query(
        r#"
        UPDATE posts
        SET title = ?, text = ?, slug = ?, image = ?, published_at = ?, author_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&updated.title)
    .bind(&updated.text)
    .bind(&updated.slug)
    .bind(&updated.image)
    .bind(updated.published_at)
    .bind(updated.author_id)
    .bind(id)
    .execute(&mut *tx)
    .await
    .context("Failed to update post")?;

    if let Some(tag_ids) = &input.tag_ids {
        replace_links_sqlite(&mut tx, &TAG_LINK, id, tag_ids).await?;
    }
    if let Some(user_ids) = &input.like_user_ids {
        replace_links_sqlite(&mut tx, &LIKE_LINK, id, user_ids).await?;
    }

    tx.commit().await.context("Failed to commit post update")?;

    Ok(Some(updated))
}

async fn replace_links_sqlite(
    conn: &mut SqliteConnection,
    link: &Link,
    post_id: i64,
    ids: &[i64],
) -> Result<()> {
    sqlx::query(&format!("DELETE FROM {} WHERE post_id = ?", link.table))
        .bind(post_id)
        .execute(&mut *conn)
        .await
        .with_context(|| format!("Failed to clear {}", link.table))?;

    let insert = format!(
        "INSERT INTO {} (post_id, {}) VALUES (?, ?)",
        link.table, link.column
    );
    for id in dedup_ids(ids) {
        sqlx::query(&insert)
            .bind(post_id)
            .bind(id)
            .execute(&mut *conn)
            .await
            .with_context(|| format!("Failed to insert into {}", link.table))?;
    }

    Ok(())
}

async fn list_posts_sqlite(pool: &SqlitePool, offset: i64, limit: i64) -> Result<Vec<PostListItem>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, published_at
        FROM posts
        ORDER BY published_at DESC, id DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list posts")?;

    Ok(rows
        .iter()
        .map(|row| PostListItem {
            id: row.get("id"),
            title: row.get("title"),
            published_at: row.get("published_at"),
        })
        .collect())
}

async fn fetch_rows_sqlite(pool: &SqlitePool, ids: &[i64]) -> Result<Vec<PostRow>> {
    let sql = fetch_rows_sql(ids.len());
    let mut query = sqlx::query(&sql);
    for id in ids {
        query = query.bind(id);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to fetch post rows")?;

    Ok(rows
        .iter()
        .map(|row| PostRow {
            post: row_to_post_sqlite(row),
            author_name: row.get("author_name"),
            comments_count: row.get("comments_count"),
        })
        .collect())
}

fn row_to_post_sqlite(row: &sqlx::sqlite::SqliteRow) -> Post {
    Post {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        slug: row.get("slug"),
        image: row.get("image"),
        published_at: row.get("published_at"),
        author_id: row.get("author_id"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_post_mysql(pool: &MySqlPool, input: &CreatePostInput) -> Result<Post> {
    let published_at = input.published_at.unwrap_or_else(Utc::now);

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let result = sqlx::query(
        r#"
        INSERT INTO posts (title, text, slug, image, published_at, author_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.text)
    .bind(&input.slug)
    .bind(&input.image)
    .bind(published_at)
    .bind(input.author_id)
    .execute(&mut *tx)
    .await
    .context("Failed to create post")?;

    let id = result.last_insert_id() as i64;
    replace_links_mysql(&mut tx, &TAG_LINK, id, &input.tag_ids).await?;
    replace_links_mysql(&mut tx, &LIKE_LINK, id, &input.like_user_ids).await?;

    tx.commit().await.context("Failed to commit post")?;

    Ok(Post {
        id,
        title: input.title.clone(),
        text: input.text.clone(),
        slug: input.slug.clone(),
        image: input.image.clone(),
        published_at,
        author_id: input.author_id,
    })
}

async fn get_post_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by ID")?;

    Ok(row.as_ref().map(row_to_post_mysql))
}

async fn get_post_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("SELECT {} FROM posts WHERE slug = ?", POST_COLUMNS))
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by slug")?;

    Ok(row.as_ref().map(row_to_post_mysql))
}

async fn update_post_mysql(
    pool: &MySqlPool,
    id: i64,
    input: &UpdatePostInput,
) -> Result<Option<Post>> {
    let Some(existing) = get_post_by_id_mysql(pool, id).await? else {
        return Ok(None);
    };
    let updated = apply_update(existing, input);

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query(
        r#"
        UPDATE posts
        SET title = ?, text = ?, slug = ?, image = ?, published_at = ?, author_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&updated.title)
    .bind(&updated.text)
    .bind(&updated.slug)
    .bind(&updated.image)
    .bind(updated.published_at)
    .bind(updated.author_id)
    .bind(id)
    .execute(&mut *tx)
    .await
    .context("Failed to update post")?;

    if let Some(tag_ids) = &input.tag_ids {
        replace_links_mysql(&mut tx, &TAG_LINK, id, tag_ids).await?;
    }
    if let Some(user_ids) = &input.like_user_ids {
        replace_links_mysql(&mut tx, &LIKE_LINK, id, user_ids).await?;
    }

    tx.commit().await.context("Failed to commit post update")?;

    Ok(Some(updated))
}

async fn replace_links_mysql(
    conn: &mut MySqlConnection,
    link: &Link,
    post_id: i64,
    ids: &[i64],
) -> Result<()> {
    sqlx::query(&format!("DELETE FROM {} WHERE post_id = ?", link.table))
        .bind(post_id)
        .execute(&mut *conn)
        .await
        .with_context(|| format!("Failed to clear {}", link.table))?;

    let insert = format!(
        "INSERT INTO {} (post_id, {}) VALUES (?, ?)",
        link.table, link.column
    );
    for id in dedup_ids(ids) {
        sqlx::query(&insert)
            .bind(post_id)
            .bind(id)
            .execute(&mut *conn)
            .await
            .with_context(|| format!("Failed to insert into {}", link.table))?;
    }

    Ok(())
}

async fn list_posts_mysql(pool: &MySqlPool, offset: i64, limit: i64) -> Result<Vec<PostListItem>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, published_at
        FROM posts
        ORDER BY published_at DESC, id DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to list posts")?;

    Ok(rows
        .iter()
        .map(|row| PostListItem {
            id: row.get("id"),
            title: row.get("title"),
            published_at: row.get("published_at"),
        })
        .collect())
}

async fn fetch_rows_mysql(pool: &MySqlPool, ids: &[i64]) -> Result<Vec<PostRow>> {
    let sql = fetch_rows_sql(ids.len());
    let mut query = sqlx::query(&sql);
    for id in ids {
        query = query.bind(id);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to fetch post rows")?;

    Ok(rows
        .iter()
        .map(|row| PostRow {
            post: row_to_post_mysql(row),
            author_name: row.get("author_name"),
            comments_count: row.get("comments_count"),
        })
        .collect())
}

fn row_to_post_mysql(row: &sqlx::mysql::MySqlRow) -> Post {
    Post {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        slug: row.get("slug"),
        image: row.get("image"),
        published_at: row.get("published_at"),
        author_id: row.get("author_id"),
    }
}

/// Merge an update into the stored post
fn apply_update(existing: Post, input: &UpdatePostInput) -> Post {
    Post {
        id: existing.id,
        title: input.title.clone().unwrap_or(existing.title),
        text: input.text.clone().unwrap_or(existing.text),
        slug: input.slug.clone().unwrap_or(existing.slug),
        image: input.image.clone().unwrap_or(existing.image),
        published_at: input.published_at.unwrap_or(existing.published_at),
        author_id: input.author_id.unwrap_or(existing.author_id),
    }
}
