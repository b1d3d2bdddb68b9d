//! Partial-content streaming handler.
//!
//! The request pipeline is a fixed sequence with early return at every stage:
//! rate limit, authentication, shape validation, path resolution, range
//! parsing, then the bounded read. The stage order is known at compile time,
//! so the stages are plain sequential calls rather than a middleware stack.

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::Response;
use tidegate_core::{Category, FileSlice, parse_range};
use tracing::{debug, info, warn};

use super::utils::{api_key, range_header, validate_category_shape, validate_filename_shape};
use crate::error::ApiError;
use crate::server::AppState;

/// `GET /stream/{category}/{filename}` - serve one bounded byte range.
pub async fn stream_media(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path((category, filename)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    state.rate_limiter.check(addr.ip())?;

    if let Err(e) = state.auth.authorize(api_key(&headers)) {
        debug!("rejected stream request from {}: {e}", addr.ip());
        return Err(e.into());
    }

    validate_category_shape(&category)?;
    validate_filename_shape(&filename)?;

    let category: Category = category.parse().map_err(|e| {
        debug!("unknown category requested: {category}");
        ApiError::from(e)
    })?;

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

    let range = parse_range(
        range_header(&headers),
        resolved.size,
        state.config.streaming.max_chunk_bytes,
    )?;

    let content_type = mime_guess::from_path(&resolved.path).first_or_octet_stream();
    let slice = FileSlice::open(
        &resolved.path,
        range,
        state.config.streaming.read_buffer_bytes,
    )
    .await?;

    info!(
        "streaming {}: {} ({} bytes)",
        category,
        range.content_range(resolved.size),
        range.content_length()
    );

    Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(header::CONTENT_RANGE, range.content_range(resolved.size))
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CONTENT_LENGTH, range.content_length().to_string())
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .body(Body::from_stream(slice.into_stream()))
        .map_err(|_| ApiError::Internal)
}
