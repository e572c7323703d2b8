//! User service
//!
//! Implements business logic for accounts:
//! - Registration (hash the password, enforce username uniqueness)
//! - Login (credential check with a single generic failure)

use crate::db::repositories::UserRepository;
use crate::models::User;
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use std::sync::Arc;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Username already taken
    #[error("Username '{0}' is already taken")]
    DuplicateUsername(String),

    /// Invalid credentials.
    ///
    /// Returned both for an unknown username and a wrong password, so a
    /// caller cannot probe which usernames exist.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User service for registration and credential checks
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
}

impl UserService {
    /// Create a new user service with the given repository
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    /// Register a new user.
    ///
    /// Hashes the password and stores the account. Fails with
    /// `DuplicateUsername` if the username is taken and `ValidationError`
    /// on empty input.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, UserServiceError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Password cannot be empty".to_string(),
            ));
        }

        if self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::DuplicateUsername(username.to_string()));
        }

        let password_hash = hash_password(password).context("Failed to hash password")?;
        let user = User::new(username.to_string(), password_hash);

        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        Ok(created)
    }

    /// Check credentials and return the matching user.
    ///
    /// Unknown username and wrong password both return
    /// `InvalidCredentials` so the two cases are indistinguishable.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, UserServiceError> {
        let user = self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to get user by username")?
            .ok_or(UserServiceError::InvalidCredentials)?;

        let password_valid = verify_password(password, &user.password_hash)
            .context("Failed to verify password")?;

        if !password_valid {
            return Err(UserServiceError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        let user = self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user by ID")?;

        Ok(user)
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, UserServiceError> {
        let user = self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to get user by username")?;

        Ok(user)
    }
}
