//! Inkpost - a minimal blogging backend

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inkpost::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{SqlxPostRepository, SqlxUserRepository},
    },
    services::{PostService, TokenCodec, UserService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkpost=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Inkpost...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    if config.auth.is_default_secret() {
        tracing::warn!(
            "Using the built-in development signing secret; set INKPOST_AUTH_SECRET in production"
        );
    }
    // Session tokens never expire once issued; rotate the secret to revoke them
    tracing::warn!("Session tokens carry no expiry and stay valid until the secret changes");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create repositories and services
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let post_repo = SqlxPostRepository::boxed(pool.clone());

    let user_service = Arc::new(UserService::new(user_repo));
    let post_service = Arc::new(PostService::new(post_repo));
    let token_codec = Arc::new(TokenCodec::new(&config.auth.secret));

    let state = AppState {
        user_service,
        post_service,
        token_codec,
        upload_config: Arc::new(config.upload.clone()),
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin)?;

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
