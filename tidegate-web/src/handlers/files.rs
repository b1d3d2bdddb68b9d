//! Whole-file companion routes.
//!
//! One route per category (`/music`, `/tv`, `/movies`, `/files`) serving
//! complete files behind the same rate limiter and auth gate as the
//! streaming route, with no range logic. The wildcard segment admits nested
//! paths; containment is still the resolver's problem.

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::Response;
use tidegate_core::{ByteRange, Category, FileSlice};
use tracing::{debug, warn};

use super::utils::{api_key, validate_filename_shape};
use crate::error::ApiError;
use crate::server::AppState;

/// `GET /music/{*filename}`
pub async fn serve_music(
    state: State<AppState>,
    addr: ConnectInfo<SocketAddr>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    serve_full_file(state, addr, Category::Music, filename, headers).await
}

/// `GET /tv/{*filename}`
pub async fn serve_tv(
    state: State<AppState>,
    addr: ConnectInfo<SocketAddr>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    serve_full_file(state, addr, Category::Tv, filename, headers).await
}

/// `GET /movies/{*filename}`
pub async fn serve_movies(
    state: State<AppState>,
    addr: ConnectInfo<SocketAddr>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    serve_full_file(state, addr, Category::Movies, filename, headers).await
}

/// `GET /files/{*filename}`
pub async fn serve_files(
    state: State<AppState>,
    addr: ConnectInfo<SocketAddr>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    serve_full_file(state, addr, Category::Files, filename, headers).await
}

async fn serve_full_file(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    category: Category,
    filename: String,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    state.rate_limiter.check(addr.ip())?;

    if let Err(e) = state.auth.authorize(api_key(&headers)) {
        debug!("rejected file request from {}: {e}", addr.ip());
        return Err(e.into());
    }

    validate_filename_shape(&filename)?;

    let resolved = match state.library.resolve(category, &filename).await {
        Ok(resolved) => resolved,
        Err(e @ tidegate_core::LibraryError::OutsideRoot) => {
            warn!(
                "traversal attempt from {}: {category}/{filename:?}",
                addr.ip()
            );
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    let content_type = mime_guess::from_path(&resolved.path).first_or_octet_stream();

    let builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, resolved.size.to_string())
        .header(header::CACHE_CONTROL, "public, max-age=86400");

    if resolved.size == 0 {
        return builder.body(Body::empty()).map_err(|_| ApiError::Internal);
    }

    let range = ByteRange {
        start: 0,
        end: resolved.size - 1,
    };
    let slice = FileSlice::open(
        &resolved.path,
        range,
        state.config.streaming.read_buffer_bytes,
    )
    .await?;

    builder
        .body(Body::from_stream(slice.into_stream()))
        .map_err(|_| ApiError::Internal)
}
