//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP endpoints:
//! - Auth endpoints (register, login, logout, profile)
//! - Post endpoints (create, update, list, detail)
//! - Static serving of uploaded cover images

pub mod auth;
pub mod middleware;
pub mod posts;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Build the complete router with middleware.
///
/// All routes live at the top level (no `/api` prefix); uploaded covers
/// are served under `/uploads`.
pub fn build_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    // CORS allows credentials so the browser sends the session cookie
    let cors = CorsLayer::new()
        .allow_origin(
            cors_origin
                .parse::<HeaderValue>()
                .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", cors_origin, e))?,
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    // Protected routes (need a valid session token)
    let protected_routes = Router::new()
        .route("/profile", get(auth::profile))
        .route("/post", post(posts::create_post))
        .route("/post", put(posts::update_post))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    let router = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/posts", get(posts::list_posts))
        .route("/post/{id}", get(posts::get_post))
        .merge(protected_routes)
        .nest_service(
            "/uploads",
            ServeDir::new(state.upload_config.path.clone()),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}
