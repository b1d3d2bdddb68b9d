//! Axum server wiring for Tidegate.
//!
//! Builds the router with its shared state and runs the listener. Router
//! construction is separate from serving so tests can drive the full request
//! pipeline without binding a socket.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tidegate_core::{ApiKeyGate, Category, MediaLibrary, RateLimiter, TidegateConfig};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::handlers::{
    serve_files, serve_movies, serve_music, serve_tv, stream_media, welcome,
};

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<TidegateConfig>,
    pub library: Arc<MediaLibrary>,
    pub auth: Arc<ApiKeyGate>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Builds state from configuration.
    pub fn new(config: TidegateConfig) -> Self {
        let library = MediaLibrary::new(config.library.root.clone());
        let auth = ApiKeyGate::new(config.server.api_key.clone());
        let rate_limiter = RateLimiter::new(&config.rate_limit);

        Self {
            config: Arc::new(config),
            library: Arc::new(library),
            auth: Arc::new(auth),
            rate_limiter: Arc::new(rate_limiter),
        }
    }
}

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        // Range streaming endpoint
        .route("/stream/{category}/{filename}", get(stream_media))
        // Whole-file companion routes
        .route("/music/{*filename}", get(serve_music))
        .route("/tv/{*filename}", get(serve_tv))
        .route("/movies/{*filename}", get(serve_movies))
        .route("/files/{*filename}", get(serve_files))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs the server until the listener fails.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or serving fails.
pub async fn run_server(config: TidegateConfig) -> std::io::Result<()> {
    let bind_addr = SocketAddr::new(config.server.host, config.server.port);
    let state = AppState::new(config);

    for category in Category::ALL {
        info!(
            "serving {category} from {}",
            state.library.category_root(category).display()
        );
    }

    let app = build_router(state);

    info!("Tidegate media server running on http://{bind_addr}");
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
