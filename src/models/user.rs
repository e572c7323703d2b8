//! User model
//!
//! Defines the User entity. Users are created at registration and are
//! immutable thereafter; the password is stored only as an Argon2id hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity representing a registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Password hash (argon2), never serialized in responses
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given username and pre-hashed password.
    ///
    /// Note: the password must already be hashed; use
    /// `services::password::hash_password()`.
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: 0, // Set by the database
            username,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new() {
        let user = User::new("alice".to_string(), "hashed_password".to_string());

        assert_eq!(user.id, 0);
        assert_eq!(user.username, "alice");
        assert_eq!(user.password_hash, "hashed_password");
    }

    #[test]
    fn test_user_serialization_skips_hash() {
        let user = User::new("bob".to_string(), "argon2-hash-here".to_string());
        let json = serde_json::to_string(&user).unwrap();

        assert!(json.contains("bob"));
        assert!(!json.contains("argon2-hash-here"));
        assert!(!json.contains("password_hash"));
    }
}
