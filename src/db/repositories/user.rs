//! User repository
//!
//! Database operations for user accounts.

use crate::models::User;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: &User) -> Result<User>;

    /// Get user by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: SqlitePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create user")?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by ID")?;

        Ok(row.map(|row| row_to_user(&row)))
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by username")?;

        Ok(row.map(|row| row_to_user(&row)))
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use crate::services::password::hash_password;

    async fn setup_test_repo() -> SqlxUserRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxUserRepository::new(pool)
    }

    fn create_test_user(username: &str) -> User {
        User::new(
            username.to_string(),
            hash_password("test_password").expect("Failed to hash password"),
        )
    }

    #[tokio::test]
    async fn test_create_user() {
        let repo = setup_test_repo().await;
        let user = create_test_user("testuser");

        let created = repo.create(&user).await.expect("Failed to create user");

        assert!(created.id > 0);
        assert_eq!(created.username, "testuser");
    }

    #[tokio::test]
    async fn test_get_user_by_id() {
        let repo = setup_test_repo().await;
        let created = repo
            .create(&create_test_user("testuser"))
            .await
            .expect("Failed to create user");

        let found = repo
            .get_by_id(created.id)
            .await
            .expect("Failed to get user")
            .expect("User not found");

        assert_eq!(found.id, created.id);
        assert_eq!(found.username, "testuser");
    }

    #[tokio::test]
    async fn test_get_user_by_id_not_found() {
        let repo = setup_test_repo().await;

        let found = repo.get_by_id(999).await.expect("Failed to get user");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_get_user_by_username() {
        let repo = setup_test_repo().await;
        repo.create(&create_test_user("findme"))
            .await
            .expect("Failed to create user");

        let found = repo
            .get_by_username("findme")
            .await
            .expect("Failed to get user")
            .expect("User not found");

        assert_eq!(found.username, "findme");
    }

    #[tokio::test]
    async fn test_get_user_by_username_not_found() {
        let repo = setup_test_repo().await;

        let found = repo
            .get_by_username("nonexistent")
            .await
            .expect("Failed to get user");

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_unique_username_constraint() {
        let repo = setup_test_repo().await;

        repo.create(&create_test_user("duplicate"))
            .await
            .expect("Failed to create first user");

        let result = repo.create(&create_test_user("duplicate")).await;
        assert!(result.is_err(), "Should fail due to duplicate username");
    }

    #[tokio::test]
    async fn test_password_hash_stored_correctly() {
        let repo = setup_test_repo().await;
        let hash = hash_password("my_secure_password").expect("Failed to hash password");
        let user = User::new("hashtest".to_string(), hash.clone());

        let created = repo.create(&user).await.expect("Failed to create user");
        let found = repo
            .get_by_id(created.id)
            .await
            .expect("Failed to get user")
            .expect("User not found");

        assert_eq!(found.password_hash, hash);
        assert!(found.password_hash.starts_with("$argon2id$"));
    }
}
