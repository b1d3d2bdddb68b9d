//! HTTP request handlers.

pub mod files;
pub mod streaming;
pub mod utils;

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};

use crate::error::ApiError;
use crate::server::AppState;

pub use files::{serve_files, serve_movies, serve_music, serve_tv};
pub use streaming::stream_media;

/// `GET /` - welcome route, rate-limited but not credential-gated.
pub async fn welcome(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<&'static str, ApiError> {
    state.rate_limiter.check(addr.ip())?;
    Ok("Welcome to the Tidegate media server!")
}
