//! Tests for the whole-file companion routes.

use axum::body::to_bytes;
use axum::http::StatusCode;
use tower::ServiceExt;

use crate::common::{TEST_API_KEY, pattern_bytes, populate_library, request, test_app};

#[tokio::test]
async fn test_whole_file_served_without_range_logic() {
    let (_lib, app) = test_app(populate_library);

    let response = app
        .oneshot(request("/music/song.mp3", Some(TEST_API_KEY), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers.get("content-length").unwrap(), "1024");
    assert_eq!(headers.get("content-type").unwrap(), "audio/mpeg");
    assert_eq!(
        headers.get("cache-control").unwrap(),
        "public, max-age=86400"
    );
    assert!(headers.get("content-range").is_none());

    let body = to_bytes(response.into_body(), 4096).await.unwrap();
    assert_eq!(&body[..], &pattern_bytes(1024)[..]);
}

#[tokio::test]
async fn test_whole_file_ignores_range_header() {
    let (_lib, app) = test_app(populate_library);

    let response = app
        .oneshot(request(
            "/music/song.mp3",
            Some(TEST_API_KEY),
            Some("bytes=100-"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-length").unwrap(), "1024");
}

#[tokio::test]
async fn test_whole_file_requires_credential() {
    let (_lib, app) = test_app(populate_library);

    let response = app
        .oneshot(request("/music/song.mp3", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_nested_path_served() {
    let (_lib, app) = test_app(|root| {
        let albums = root.join("music").join("albums");
        std::fs::create_dir_all(&albums).unwrap();
        std::fs::write(albums.join("track01.mp3"), pattern_bytes(64)).unwrap();
    });

    let response = app
        .oneshot(request(
            "/music/albums/track01.mp3",
            Some(TEST_API_KEY),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-length").unwrap(), "64");
}

#[tokio::test]
async fn test_traversal_on_wildcard_route_is_403() {
    let (_lib, app) = test_app(populate_library);

    let response = app
        .oneshot(request("/music/../secret.txt", Some(TEST_API_KEY), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_whole_file_is_404() {
    let (_lib, app) = test_app(populate_library);

    let response = app
        .oneshot(request("/music/absent.mp3", Some(TEST_API_KEY), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_file_served_with_zero_length() {
    let (_lib, app) = test_app(|root| {
        let files = root.join("files");
        std::fs::create_dir_all(&files).unwrap();
        std::fs::write(files.join("empty.bin"), b"").unwrap();
    });

    let response = app
        .oneshot(request("/files/empty.bin", Some(TEST_API_KEY), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-length").unwrap(), "0");

    let body = to_bytes(response.into_body(), 16).await.unwrap();
    assert!(body.is_empty());
}
