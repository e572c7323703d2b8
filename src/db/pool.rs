//! Database connection pool
//!
//! Creates the SQLite connection pool from configuration. The database
//! file (and its parent directory) are created on first start.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;

/// Create a SQLite connection pool based on configuration.
///
/// Accepts either a plain file path, a `sqlite:` URL, or `:memory:`.
/// For file-based databases the parent directory is created and the
/// file is opened in read-write-create mode.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    let url = config.url.as_str();

    // Ensure the database directory exists for file-based SQLite
    if !url.starts_with(":memory:") && !url.starts_with("sqlite::memory:") {
        let path = url.trim_start_matches("sqlite:");
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {:?}", parent)
                })?;
            }
        }
    }

    let connection_url = if url.starts_with("sqlite:") {
        if url.contains('?') {
            url.to_string()
        } else {
            format!("{}?mode=rwc", url)
        }
    } else if url == ":memory:" {
        "sqlite::memory:".to_string()
    } else {
        format!("sqlite:{}?mode=rwc", url)
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .connect(&connection_url)
        .await
        .with_context(|| format!("Failed to connect to SQLite database: {}", url))?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .context("Failed to enable foreign keys")?;

    Ok(pool)
}

/// Create an in-memory SQLite pool for tests.
///
/// The pool is capped at a single connection so every query sees the
/// same in-memory database.
pub async fn create_test_pool() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .context("Failed to create in-memory SQLite pool")?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .context("Failed to enable foreign keys")?;

    Ok(pool)
}
