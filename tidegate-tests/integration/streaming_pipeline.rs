//! End-to-end tests for the range-streaming route.

use axum::body::to_bytes;
use axum::http::StatusCode;
use tower::ServiceExt;

use crate::common::{TEST_API_KEY, pattern_bytes, populate_library, request, test_app};

#[tokio::test]
async fn test_interior_range_served_with_partial_content_framing() {
    let (_lib, app) = test_app(populate_library);

    let response = app
        .oneshot(request(
            "/stream/movies/movie.mp4",
            Some(TEST_API_KEY),
            Some("bytes=2000000-"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);

    let headers = response.headers();
    assert_eq!(
        headers.get("content-range").unwrap(),
        "bytes 2000000-2999999/5000000"
    );
    assert_eq!(headers.get("accept-ranges").unwrap(), "bytes");
    assert_eq!(headers.get("content-length").unwrap(), "1000000");
    assert_eq!(headers.get("content-type").unwrap(), "video/mp4");

    let body = to_bytes(response.into_body(), 2_000_000).await.unwrap();
    assert_eq!(body.len(), 1_000_000);
    let expected = pattern_bytes(3_000_000)[2_000_000..].to_vec();
    assert_eq!(&body[..], &expected[..]);
}

#[tokio::test]
async fn test_final_byte_range() {
    let (_lib, app) = test_app(populate_library);

    let response = app
        .oneshot(request(
            "/stream/movies/movie.mp4",
            Some(TEST_API_KEY),
            Some("bytes=4999999-"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response.headers().get("content-range").unwrap(),
        "bytes 4999999-4999999/5000000"
    );
    assert_eq!(response.headers().get("content-length").unwrap(), "1");

    let body = to_bytes(response.into_body(), 16).await.unwrap();
    assert_eq!(body.len(), 1);
    assert_eq!(body[0], (4_999_999u64 % 251) as u8);
}

#[tokio::test]
async fn test_missing_range_header_is_416() {
    let (_lib, app) = test_app(populate_library);

    let response = app
        .oneshot(request(
            "/stream/movies/movie.mp4",
            Some(TEST_API_KEY),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    let body = to_bytes(response.into_body(), 1024).await.unwrap();
    assert_eq!(&body[..], b"Range header required");
}

#[tokio::test]
async fn test_range_past_end_of_file_is_416() {
    let (_lib, app) = test_app(populate_library);

    let response = app
        .oneshot(request(
            "/stream/movies/movie.mp4",
            Some(TEST_API_KEY),
            Some("bytes=5000000-"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
}

#[tokio::test]
async fn test_missing_file_is_404() {
    let (_lib, app) = test_app(populate_library);

    let response = app
        .oneshot(request(
            "/stream/movies/nofile.mp4",
            Some(TEST_API_KEY),
            Some("bytes=0-"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_traversal_is_403() {
    let (_lib, app) = test_app(populate_library);

    let response = app
        .oneshot(request(
            "/stream/movies/..%2Fsecret.txt",
            Some(TEST_API_KEY),
            Some("bytes=0-"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = to_bytes(response.into_body(), 1024).await.unwrap();
    assert_eq!(&body[..], b"Forbidden");
}

#[tokio::test]
async fn test_unknown_category_is_404() {
    let (_lib, app) = test_app(populate_library);

    // Alphanumeric but not an enumerated category; must not leak whether a
    // directory of that name exists.
    let response = app
        .oneshot(request(
            "/stream/movies2/movie.mp4",
            Some(TEST_API_KEY),
            Some("bytes=0-"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_category_is_400() {
    let (_lib, app) = test_app(populate_library);

    let response = app
        .oneshot(request(
            "/stream/mov%21es/movie.mp4",
            Some(TEST_API_KEY),
            Some("bytes=0-"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = to_bytes(response.into_body(), 1024).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json.get("errors").is_some());
}

#[tokio::test]
async fn test_lenient_range_parse_end_offset_folds_into_start() {
    let (_lib, app) = test_app(populate_library);

    // "bytes=1-0" reads as start 10; the explicit end offset is not honored.
    let response = app
        .oneshot(request(
            "/stream/movies/movie.mp4",
            Some(TEST_API_KEY),
            Some("bytes=1-0"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response.headers().get("content-range").unwrap(),
        "bytes 10-1000009/5000000"
    );
}
