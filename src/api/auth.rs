//! Authentication API endpoints
//!
//! Handles HTTP requests for accounts and sessions:
//! - POST /register - User registration
//! - POST /login - User login (sets the session cookie)
//! - POST /logout - User logout (clears the session cookie)
//! - GET /profile - Current user info

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{
    ApiError, AppState, AuthenticatedUser, CLEAR_TOKEN_COOKIE, TOKEN_COOKIE,
};
use crate::services::UserServiceError;

/// Request body for registration and login
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Response carrying the public fields of a user
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
}

impl From<crate::models::User> for UserResponse {
    fn from(user: crate::models::User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

/// Response for logout
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /register - User registration
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .user_service
        .register(&body.username, &body.password)
        .await
        .map_err(|e| match e {
            UserServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            UserServiceError::DuplicateUsername(_) => {
                ApiError::new("CONFLICT", "Username is already taken")
            }
            _ => ApiError::internal_error(e.to_string()),
        })?;

    Ok(Json(UserResponse::from(user)))
}

/// POST /login - User login
///
/// Verifies the credentials, issues a session token, and sets it as an
/// HttpOnly cookie. Unknown usernames and wrong passwords produce the
/// same 400 response.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .user_service
        .login(&body.username, &body.password)
        .await
        .map_err(|e| match e {
            UserServiceError::InvalidCredentials => {
                ApiError::validation_error("Invalid username or password")
            }
            _ => ApiError::internal_error(e.to_string()),
        })?;

    let token = state
        .token_codec
        .issue(user.id, &user.username)
        .map_err(|e| ApiError::internal_error(format!("Failed to issue token: {}", e)))?;

    let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", TOKEN_COOKIE, token);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie)
            .map_err(|e| ApiError::internal_error(format!("Invalid cookie value: {}", e)))?,
    );

    tracing::info!(user_id = user.id, username = %user.username, "User logged in");

    Ok((headers, Json(UserResponse::from(user))))
}

/// POST /logout - User logout
///
/// Sessions are stateless, so logout just tells the client to discard
/// the cookie; the token itself stays valid.
pub async fn logout() -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_static(CLEAR_TOKEN_COOKIE),
    );

    (
        headers,
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
}

/// GET /profile - Current user info
///
/// Requires authentication. Returns the account matching the verified
/// token; a token for a since-deleted account yields 401.
pub async fn profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, ApiError> {
    let account = state
        .user_service
        .get_by_id(user.0.id)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

    Ok(Json(UserResponse::from(account)))
}
