//! Repository layer
//!
//! Repository traits and their sqlx implementations. Services depend on
//! the traits (`Arc<dyn ...>`) so the storage backend stays swappable.

pub mod post;
pub mod user;

pub use post::{PostRepository, SqlxPostRepository};
pub use user::{SqlxUserRepository, UserRepository};
