//! Database layer
//!
//! SQLite access through sqlx: pool creation, code-embedded migrations,
//! and the repository implementations.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};
