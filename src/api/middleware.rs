//! API middleware
//!
//! Contains:
//! - Shared application state
//! - The API error envelope and its status mapping
//! - Authentication middleware (session token validation)

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::UploadConfig;
use crate::services::{AuthClaims, PostService, TokenCodec, UserService};

/// Name of the session cookie
pub const TOKEN_COOKIE: &str = "token";

/// Set-Cookie value that discards the session cookie
pub const CLEAR_TOKEN_COOKIE: &str = "token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0";

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub post_service: Arc<PostService>,
    pub token_codec: Arc<TokenCodec>,
    pub upload_config: Arc<UploadConfig>,
}

/// Authenticated identity extracted from a verified session token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub AuthClaims);

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

/// Extract the session token from the request.
///
/// Checks the `Authorization: Bearer` header first, then the `token`
/// cookie.
fn extract_session_token(request: &Request) -> Option<String> {
    if let Some(auth_header) = request.headers().get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookie_header) = request.headers().get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(token) = cookie.strip_prefix("token=") {
                    return Some(token.to_string());
                }
            }
        }
    }

    None
}

/// Authentication middleware.
///
/// Verifies the session token and stores the decoded identity in the
/// request extensions. A missing or invalid token yields 401, and the
/// response also clears the cookie so a stale client stops resending it.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_session_token(&request)
        .ok_or_else(|| unauthorized_cleared("Missing authentication token"))?;

    let claims = state.token_codec.verify(&token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected session token");
        unauthorized_cleared("Invalid session token")
    })?;

    request.extensions_mut().insert(AuthenticatedUser(claims));
    Ok(next.run(request).await)
}

fn unauthorized_cleared(message: &str) -> Response {
    let mut response = ApiError::unauthorized(message).into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_static(CLEAR_TOKEN_COOKIE),
    );
    response
}

// Extractor for AuthenticatedUser from request extensions
impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_header(name: header::HeaderName, value: &str) -> Request {
        axum::http::Request::builder()
            .header(name, value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_extract_token_from_bearer_header() {
        let request = request_with_header(header::AUTHORIZATION, "Bearer abc.def.ghi");
        assert_eq!(
            extract_session_token(&request).as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn test_extract_token_from_cookie() {
        let request = request_with_header(header::COOKIE, "theme=dark; token=abc.def.ghi");
        assert_eq!(
            extract_session_token(&request).as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn test_extract_token_missing() {
        let request = axum::http::Request::builder().body(Body::empty()).unwrap();
        assert!(extract_session_token(&request).is_none());
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (ApiError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (ApiError::forbidden("x"), StatusCode::FORBIDDEN),
            (ApiError::not_found("x"), StatusCode::NOT_FOUND),
            (ApiError::validation_error("x"), StatusCode::BAD_REQUEST),
            (ApiError::new("CONFLICT", "x"), StatusCode::CONFLICT),
            (
                ApiError::internal_error("x"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_error_envelope_shape() {
        let error = ApiError::validation_error("Title cannot be empty");
        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["message"], "Title cannot be empty");
        assert!(json["error"].get("details").is_none());
    }
}
