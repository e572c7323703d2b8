//! Post service
//!
//! Implements business logic for posts:
//! - Creation with an author reference
//! - Listing the most recent posts with author username joined in
//! - Update restricted to the post's author

use crate::db::repositories::PostRepository;
use crate::models::{CreatePostInput, Post, PostWithAuthor, UpdatePostInput};
use anyhow::Context;
use std::sync::Arc;

/// Number of posts returned by the public listing
pub const RECENT_POSTS_LIMIT: i64 = 20;

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Post not found
    #[error("Post not found: {0}")]
    NotFound(i64),

    /// Caller is not the post's author
    #[error("Only the author can edit this post")]
    Forbidden,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Post service for CRUD with the ownership check
pub struct PostService {
    post_repo: Arc<dyn PostRepository>,
}

impl PostService {
    /// Create a new post service with the given repository
    pub fn new(post_repo: Arc<dyn PostRepository>) -> Self {
        Self { post_repo }
    }

    /// Create a post authored by `author_id`.
    pub async fn create(
        &self,
        input: CreatePostInput,
        author_id: i64,
    ) -> Result<Post, PostServiceError> {
        if input.title.trim().is_empty() {
            return Err(PostServiceError::ValidationError(
                "Title cannot be empty".to_string(),
            ));
        }

        let post = Post::new(
            input.title,
            input.summary,
            input.content,
            input.cover,
            author_id,
        );

        let created = self
            .post_repo
            .create(&post)
            .await
            .context("Failed to create post")?;

        Ok(created)
    }

    /// Get a post by ID with author populated.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<PostWithAuthor>, PostServiceError> {
        let post = self
            .post_repo
            .get_by_id(id)
            .await
            .context("Failed to get post")?;

        Ok(post)
    }

    /// List the most recent posts, newest first, author populated.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<PostWithAuthor>, PostServiceError> {
        let posts = self
            .post_repo
            .list_recent(limit)
            .await
            .context("Failed to list posts")?;

        Ok(posts)
    }

    /// Update a post on behalf of `caller_id`.
    ///
    /// Fails with `NotFound` for an unknown id and `Forbidden` when the
    /// caller is not the author. Overwrites title/summary/content; the
    /// cover is replaced only when the input carries one. `created_at`
    /// is never touched.
    pub async fn update(
        &self,
        id: i64,
        caller_id: i64,
        input: UpdatePostInput,
    ) -> Result<Post, PostServiceError> {
        let existing = self
            .post_repo
            .get_by_id(id)
            .await
            .context("Failed to get post")?
            .ok_or(PostServiceError::NotFound(id))?;

        if existing.author.id != caller_id {
            return Err(PostServiceError::Forbidden);
        }

        if input.title.trim().is_empty() {
            return Err(PostServiceError::ValidationError(
                "Title cannot be empty".to_string(),
            ));
        }

        let cover = input.cover.or(existing.cover);
        let post = Post {
            id,
            title: input.title,
            summary: input.summary,
            content: input.content,
            cover,
            author_id: existing.author.id,
            created_at: existing.created_at,
            updated_at: chrono::Utc::now(),
        };

        let updated = self
            .post_repo
            .update(&post)
            .await
            .context("Failed to update post")?;

        Ok(updated)
    }
}
