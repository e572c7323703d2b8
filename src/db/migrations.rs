//! Database migrations
//!
//! Code-based migrations embedded in the binary as SQL strings, so a
//! single executable can bootstrap its own schema.
//!
//! Each migration is a `Migration` struct with a unique version, a
//! human-readable name, and the SQL to apply. Applied versions are
//! recorded in the `schema_migrations` table and skipped on restart.

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

/// A single schema migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (unique and sequential)
    pub version: i32,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements to apply
    pub up: &'static str,
}

/// All migrations, in order.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_users",
        up: r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username VARCHAR(50) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_users_username ON users(username);
        "#,
    },
    Migration {
        version: 2,
        name: "create_posts",
        up: r#"
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                summary TEXT NOT NULL DEFAULT '',
                content TEXT NOT NULL DEFAULT '',
                cover TEXT,
                author_id INTEGER NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_posts_author_id ON posts(author_id);
            CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at);
        "#,
    },
];

/// Run all pending migrations against the given pool.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    create_migrations_table(pool).await?;

    let applied = applied_versions(pool).await?;

    for migration in MIGRATIONS {
        if applied.contains(&(migration.version as i64)) {
            continue;
        }

        tracing::info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );

        // Migrations may contain multiple statements
        for statement in migration.up.split(';') {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            sqlx::query(statement).execute(pool).await.with_context(|| {
                format!(
                    "Failed to apply migration {} ({})",
                    migration.version, migration.name
                )
            })?;
        }

        sqlx::query("INSERT INTO schema_migrations (version, name) VALUES (?, ?)")
            .bind(migration.version)
            .bind(migration.name)
            .execute(pool)
            .await
            .with_context(|| {
                format!("Failed to record migration {}", migration.version)
            })?;
    }

    Ok(())
}

async fn create_migrations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create schema_migrations table")?;

    Ok(())
}

async fn applied_versions(pool: &SqlitePool) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT version FROM schema_migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .context("Failed to read applied migrations")?;

    Ok(rows.iter().map(|row| row.get("version")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    #[tokio::test]
    async fn test_migrations_create_tables() {
        let pool = create_test_pool().await.expect("Failed to create test pool");

        run_migrations(&pool).await.expect("Failed to run migrations");

        // Both tables should exist and be queryable
        sqlx::query("SELECT id, username, password_hash, created_at FROM users")
            .fetch_all(&pool)
            .await
            .expect("users table should exist");

        sqlx::query("SELECT id, title, summary, content, cover, author_id FROM posts")
            .fetch_all(&pool)
            .await
            .expect("posts table should exist");
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = create_test_pool().await.expect("Failed to create test pool");

        run_migrations(&pool).await.expect("First run should succeed");
        run_migrations(&pool).await.expect("Second run should succeed");

        let applied = applied_versions(&pool).await.expect("Failed to read versions");
        assert_eq!(applied.len(), MIGRATIONS.len());
    }

    #[tokio::test]
    async fn test_versions_are_unique_and_ordered() {
        for pair in MIGRATIONS.windows(2) {
            assert!(pair[0].version < pair[1].version);
        }
    }
}
