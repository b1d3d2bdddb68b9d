//! Shared fixtures for integration tests.

use std::net::SocketAddr;
use std::path::Path;

use axum::Router;
use axum::body::Body;
use axum::extract::connect_info::ConnectInfo;
use axum::http::Request;
use tempfile::TempDir;
use tidegate_core::TidegateConfig;
use tidegate_web::{AppState, build_router};

/// Shared secret used by every test fixture.
pub const TEST_API_KEY: &str = "test-secret";

/// Builds a router over a temp library populated by `populate`.
///
/// The TempDir must stay alive for the duration of the test.
pub fn test_app(populate: impl FnOnce(&Path)) -> (TempDir, Router) {
    let temp = TempDir::new().unwrap();
    populate(temp.path());

    let config = TidegateConfig::for_testing(temp.path().to_path_buf());
    let state = AppState::new(config);
    (temp, build_router(state))
}

/// Builds a router with a custom request cap for limiter tests.
pub fn test_app_with_cap(populate: impl FnOnce(&Path), max_requests: u32) -> (TempDir, Router) {
    let temp = TempDir::new().unwrap();
    populate(temp.path());

    let mut config = TidegateConfig::for_testing(temp.path().to_path_buf());
    config.rate_limit.max_requests = max_requests;
    let state = AppState::new(config);
    (temp, build_router(state))
}

/// Standard library fixture: a 5,000,000-byte movie with a known pattern,
/// plus a small music file.
pub fn populate_library(root: &Path) {
    let movies = root.join("movies");
    std::fs::create_dir_all(&movies).unwrap();
    std::fs::write(movies.join("movie.mp4"), pattern_bytes(5_000_000)).unwrap();

    let music = root.join("music");
    std::fs::create_dir_all(&music).unwrap();
    std::fs::write(music.join("song.mp3"), pattern_bytes(1024)).unwrap();

    // A sibling of the category roots that must never be reachable.
    std::fs::write(root.join("secret.txt"), b"top secret").unwrap();
}

/// Deterministic byte pattern so body slices can be checked by content.
pub fn pattern_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Builds a GET request with the connection info the handlers extract.
pub fn request(uri: &str, api_key: Option<&str>, range: Option<&str>) -> Request<Body> {
    request_from(uri, api_key, range, client_addr(1))
}

/// Same as [`request`] with an explicit client address, for limiter tests.
pub fn request_from(
    uri: &str,
    api_key: Option<&str>,
    range: Option<&str>,
    addr: SocketAddr,
) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).extension(ConnectInfo(addr));

    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    if let Some(range) = range {
        builder = builder.header("range", range);
    }

    builder.body(Body::empty()).unwrap()
}

/// A distinct client address per test identity.
pub fn client_addr(id: u8) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, id], 54321))
}
