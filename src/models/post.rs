//! Post model
//!
//! This module provides:
//! - `Post` entity representing a blog post
//! - Input types for creating and updating posts
//! - `PostWithAuthor` for list/detail views with the author joined in

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// Post title
    pub title: String,
    /// Short summary shown in listings
    pub summary: String,
    /// Full content
    pub content: String,
    /// Path of the uploaded cover image, relative to the upload root
    pub cover: Option<String>,
    /// Author user ID
    pub author_id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post with the given fields
    pub fn new(
        title: String,
        summary: String,
        content: String,
        cover: Option<String>,
        author_id: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Set by database
            title,
            summary,
            content,
            cover,
            author_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a new post
#[derive(Debug, Clone, Default)]
pub struct CreatePostInput {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub cover: Option<String>,
}

/// Input for updating an existing post
///
/// `cover` is only overwritten when a new file was uploaded; `None` keeps
/// the existing cover.
#[derive(Debug, Clone, Default)]
pub struct UpdatePostInput {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub cover: Option<String>,
}

/// Public fields of a post's author, joined in for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorInfo {
    pub id: i64,
    pub username: String,
}

/// A post with its author's public fields populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostWithAuthor {
    pub id: i64,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub cover: Option<String>,
    pub author: AuthorInfo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_new() {
        let post = Post::new(
            "Title".to_string(),
            "Summary".to_string(),
            "Content".to_string(),
            Some("uploads/cover.png".to_string()),
            42,
        );

        assert_eq!(post.id, 0);
        assert_eq!(post.author_id, 42);
        assert_eq!(post.cover.as_deref(), Some("uploads/cover.png"));
        assert_eq!(post.created_at, post.updated_at);
    }

    #[test]
    fn test_post_with_author_serialization() {
        let now = Utc::now();
        let post = PostWithAuthor {
            id: 1,
            title: "Hello".to_string(),
            summary: "World".to_string(),
            content: "Body".to_string(),
            cover: None,
            author: AuthorInfo {
                id: 2,
                username: "alice".to_string(),
            },
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["author"]["username"], "alice");
        assert_eq!(json["author"]["id"], 2);
    }
}
