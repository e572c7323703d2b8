//! Post API endpoints
//!
//! Handles HTTP requests for posts:
//! - POST /post - Create a post (multipart, cover file required)
//! - PUT /post - Update a post (multipart, cover file optional)
//! - GET /posts - List the 20 most recent posts
//! - GET /post/{id} - Get a single post

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::config::UploadConfig;
use crate::models::{CreatePostInput, PostWithAuthor, UpdatePostInput};
use crate::services::post::RECENT_POSTS_LIMIT;
use crate::services::PostServiceError;

/// A saved cover file
struct SavedCover {
    /// Path stored on the post and used as the public URL
    url_path: String,
}

/// Multipart form fields for creating or updating a post
#[derive(Default)]
struct PostForm {
    id: Option<i64>,
    title: String,
    summary: String,
    content: String,
    cover: Option<SavedCover>,
}

/// GET /posts - List recent posts
///
/// Public. Returns at most 20 posts, newest first, with the author's
/// username populated.
pub async fn list_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<PostWithAuthor>>, ApiError> {
    let posts = state
        .post_service
        .list_recent(RECENT_POSTS_LIMIT)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(posts))
}

/// GET /post/{id} - Get a single post
///
/// Public. Returns the post with its author populated, or 404.
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PostWithAuthor>, ApiError> {
    let post = state
        .post_service
        .get_by_id(id)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?
        .ok_or_else(|| ApiError::not_found(format!("Post not found: {}", id)))?;

    Ok(Json(post))
}

/// POST /post - Create a post
///
/// Requires authentication. Accepts multipart/form-data with text
/// fields `title`, `summary`, `content` and a required file field
/// `file` holding the cover image.
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = parse_post_form(multipart, &state.upload_config).await?;

    let cover = form
        .cover
        .ok_or_else(|| ApiError::validation_error("No file uploaded"))?;

    let input = CreatePostInput {
        title: form.title,
        summary: form.summary,
        content: form.content,
        cover: Some(cover.url_path),
    };

    let post = state
        .post_service
        .create(input, user.0.id)
        .await
        .map_err(map_post_error)?;

    tracing::info!(post_id = post.id, author_id = user.0.id, "Post created");

    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /post - Update a post
///
/// Requires authentication and post ownership. Accepts the same
/// multipart form as creation plus an `id` field; the file field is
/// optional and the existing cover is kept when it is absent.
pub async fn update_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    multipart: Multipart,
) -> Result<Json<crate::models::Post>, ApiError> {
    let form = parse_post_form(multipart, &state.upload_config).await?;

    let id = form
        .id
        .ok_or_else(|| ApiError::validation_error("Missing post id"))?;

    let input = UpdatePostInput {
        title: form.title,
        summary: form.summary,
        content: form.content,
        cover: form.cover.map(|c| c.url_path),
    };

    let post = state
        .post_service
        .update(id, user.0.id, input)
        .await
        .map_err(map_post_error)?;

    Ok(Json(post))
}

fn map_post_error(e: PostServiceError) -> ApiError {
    match e {
        PostServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        PostServiceError::NotFound(id) => ApiError::not_found(format!("Post not found: {}", id)),
        PostServiceError::Forbidden => {
            ApiError::forbidden("You don't have permission to edit this post")
        }
        PostServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

/// Read the multipart form, saving the cover file if one was sent.
async fn parse_post_form(
    mut multipart: Multipart,
    config: &UploadConfig,
) -> Result<PostForm, ApiError> {
    let mut form = PostForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation_error(format!("Failed to read multipart: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "id" => {
                let text = read_text_field(field, "id").await?;
                let id = text
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| ApiError::validation_error("Invalid post id"))?;
                form.id = Some(id);
            }
            "title" => form.title = read_text_field(field, "title").await?,
            "summary" => form.summary = read_text_field(field, "summary").await?,
            "content" => form.content = read_text_field(field, "content").await?,
            "file" => form.cover = Some(save_cover(field, config).await?),
            _ => {} // Unknown fields are ignored
        }
    }

    Ok(form)
}

async fn read_text_field(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::validation_error(format!("Failed to read field '{}': {}", name, e)))
}

/// Validate and persist an uploaded cover image.
///
/// The file is stored under the upload directory with a fresh UUID name
/// keeping the original extension, so uploads cannot collide or
/// overwrite each other.
async fn save_cover(
    field: axum::extract::multipart::Field<'_>,
    config: &UploadConfig,
) -> Result<SavedCover, ApiError> {
    let filename = field
        .file_name()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let content_type = field
        .content_type()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    if !config.is_type_allowed(&content_type) {
        return Err(ApiError::validation_error(format!(
            "Invalid file type: {}. Allowed types: {:?}",
            content_type, config.allowed_types
        )));
    }

    let data = field
        .bytes()
        .await
        .map_err(|e| ApiError::validation_error(format!("Failed to read file: {}", e)))?;

    if data.len() as u64 > config.max_file_size {
        return Err(ApiError::validation_error(format!(
            "File too large. Maximum size: {} bytes ({} MB)",
            config.max_file_size,
            config.max_file_size / 1024 / 1024
        )));
    }

    ensure_upload_dir(&config.path).await?;

    let ext = get_extension(&filename, &content_type);
    let new_filename = format!("{}.{}", Uuid::new_v4(), ext);
    let file_path = config.path.join(&new_filename);

    fs::write(&file_path, &data)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to save file: {}", e)))?;

    Ok(SavedCover {
        url_path: format!("uploads/{}", new_filename),
    })
}

/// Ensure upload directory exists
async fn ensure_upload_dir(path: &PathBuf) -> Result<(), ApiError> {
    if !path.exists() {
        fs::create_dir_all(path)
            .await
            .map_err(|e| ApiError::internal_error(format!("Failed to create upload dir: {}", e)))?;
    }
    Ok(())
}

/// Get file extension from filename or content type
fn get_extension(filename: &str, content_type: &str) -> String {
    if let Some(ext) = filename.rsplit('.').next() {
        if ext != filename && !ext.is_empty() && ext.len() < 10 {
            return ext.to_lowercase();
        }
    }

    match content_type {
        "image/jpeg" => "jpg".to_string(),
        "image/png" => "png".to_string(),
        "image/gif" => "gif".to_string(),
        "image/webp" => "webp".to_string(),
        _ => "bin".to_string(),
    }
}
