//! Post repository
//!
//! Database operations for posts. Reads join the author's username so
//! list and detail views carry it without a second query.

use crate::models::{AuthorInfo, Post, PostWithAuthor};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a new post
    async fn create(&self, post: &Post) -> Result<Post>;

    /// Get a post by ID with the author joined in
    async fn get_by_id(&self, id: i64) -> Result<Option<PostWithAuthor>>;

    /// List the most recent posts, newest first
    async fn list_recent(&self, limit: i64) -> Result<Vec<PostWithAuthor>>;

    /// Update an existing post
    async fn update(&self, post: &Post) -> Result<Post>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: SqlitePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

const SELECT_WITH_AUTHOR: &str = r#"
    SELECT p.id, p.title, p.summary, p.content, p.cover,
           p.created_at, p.updated_at,
           u.id AS author_id, u.username AS author_username
    FROM posts p
    JOIN users u ON u.id = p.author_id
"#;

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, post: &Post) -> Result<Post> {
        let result = sqlx::query(
            r#"
            INSERT INTO posts (title, summary, content, cover, author_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.title)
        .bind(&post.summary)
        .bind(&post.content)
        .bind(&post.cover)
        .bind(post.author_id)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to create post")?;

        let mut created = post.clone();
        created.id = result.last_insert_rowid();
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<PostWithAuthor>> {
        let query = format!("{} WHERE p.id = ?", SELECT_WITH_AUTHOR);

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get post by ID")?;

        Ok(row.map(|row| row_to_post_with_author(&row)))
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<PostWithAuthor>> {
        let query = format!(
            "{} ORDER BY p.created_at DESC, p.id DESC LIMIT ?",
            SELECT_WITH_AUTHOR
        );

        let rows = sqlx::query(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list posts")?;

        Ok(rows.iter().map(row_to_post_with_author).collect())
    }

    async fn update(&self, post: &Post) -> Result<Post> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = ?, summary = ?, content = ?, cover = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&post.title)
        .bind(&post.summary)
        .bind(&post.content)
        .bind(&post.cover)
        .bind(post.updated_at)
        .bind(post.id)
        .execute(&self.pool)
        .await
        .context("Failed to update post")?;

        if result.rows_affected() == 0 {
            anyhow::bail!("Post {} not found for update", post.id);
        }

        Ok(post.clone())
    }
}

fn row_to_post_with_author(row: &sqlx::sqlite::SqliteRow) -> PostWithAuthor {
    PostWithAuthor {
        id: row.get("id"),
        title: row.get("title"),
        summary: row.get("summary"),
        content: row.get("content"),
        cover: row.get("cover"),
        author: AuthorInfo {
            id: row.get("author_id"),
            username: row.get("author_username"),
        },
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::User;
    use crate::services::password::hash_password;

    async fn setup_test_repo() -> (SqlxPostRepository, i64) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let user_repo = SqlxUserRepository::new(pool.clone());
        let author = user_repo
            .create(&User::new(
                "author".to_string(),
                hash_password("pw").expect("Failed to hash password"),
            ))
            .await
            .expect("Failed to create author");

        (SqlxPostRepository::new(pool), author.id)
    }

    fn test_post(title: &str, author_id: i64) -> Post {
        Post::new(
            title.to_string(),
            "summary".to_string(),
            "content".to_string(),
            None,
            author_id,
        )
    }

    #[tokio::test]
    async fn test_create_post() {
        let (repo, author_id) = setup_test_repo().await;

        let created = repo
            .create(&test_post("Hello", author_id))
            .await
            .expect("Failed to create post");

        assert!(created.id > 0);
        assert_eq!(created.title, "Hello");
        assert_eq!(created.author_id, author_id);
    }

    #[tokio::test]
    async fn test_get_by_id_joins_author() {
        let (repo, author_id) = setup_test_repo().await;
        let created = repo
            .create(&test_post("Hello", author_id))
            .await
            .expect("Failed to create post");

        let found = repo
            .get_by_id(created.id)
            .await
            .expect("Failed to get post")
            .expect("Post not found");

        assert_eq!(found.id, created.id);
        assert_eq!(found.author.id, author_id);
        assert_eq!(found.author.username, "author");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let (repo, _) = setup_test_repo().await;

        let found = repo.get_by_id(999).await.expect("Failed to get post");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_list_recent_order_and_limit() {
        let (repo, author_id) = setup_test_repo().await;

        for i in 0..5 {
            repo.create(&test_post(&format!("Post {}", i), author_id))
                .await
                .expect("Failed to create post");
        }

        let posts = repo.list_recent(3).await.expect("Failed to list posts");

        assert_eq!(posts.len(), 3);
        // Equal timestamps tie-break on id, so newest insert comes first
        assert_eq!(posts[0].title, "Post 4");
        assert_eq!(posts[1].title, "Post 3");
        assert_eq!(posts[2].title, "Post 2");
    }

    #[tokio::test]
    async fn test_update_post() {
        let (repo, author_id) = setup_test_repo().await;
        let created = repo
            .create(&test_post("Before", author_id))
            .await
            .expect("Failed to create post");

        let mut edited = created.clone();
        edited.title = "After".to_string();
        edited.cover = Some("uploads/x.png".to_string());
        edited.updated_at = chrono::Utc::now();

        repo.update(&edited).await.expect("Failed to update post");

        let found = repo
            .get_by_id(created.id)
            .await
            .expect("Failed to get post")
            .expect("Post not found");

        assert_eq!(found.title, "After");
        assert_eq!(found.cover.as_deref(), Some("uploads/x.png"));
    }

    #[tokio::test]
    async fn test_update_missing_post_errors() {
        let (repo, author_id) = setup_test_repo().await;

        let mut ghost = test_post("Ghost", author_id);
        ghost.id = 999;

        let result = repo.update(&ghost).await;
        assert!(result.is_err());
    }
}
