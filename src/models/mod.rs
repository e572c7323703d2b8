//! Data models
//!
//! This module contains the data structures used throughout Inkpost:
//! - Database entities (User, Post)
//! - Input types for creating and updating posts
//! - Joined views for display (PostWithAuthor)

mod post;
mod user;

pub use post::{AuthorInfo, CreatePostInput, Post, PostWithAuthor, UpdatePostInput};
pub use user::User;
