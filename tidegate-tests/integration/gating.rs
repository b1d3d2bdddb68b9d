//! Authentication and rate limiting across routes.

use axum::body::to_bytes;
use axum::http::StatusCode;
use tower::ServiceExt;

use crate::common::{
    TEST_API_KEY, client_addr, populate_library, request, request_from, test_app,
    test_app_with_cap,
};

#[tokio::test]
async fn test_missing_api_key_is_401() {
    let (_lib, app) = test_app(populate_library);

    let response = app
        .oneshot(request("/stream/movies/movie.mp4", None, Some("bytes=0-")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = to_bytes(response.into_body(), 1024).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        json["error"],
        "Unauthorized: Invalid or missing API key"
    );
}

#[tokio::test]
async fn test_wrong_api_key_is_401() {
    let (_lib, app) = test_app(populate_library);

    let response = app
        .oneshot(request(
            "/stream/movies/movie.mp4",
            Some("wrong-secret"),
            Some("bytes=0-"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_checked_before_shape_validation() {
    let (_lib, app) = test_app(populate_library);

    // Malformed category with a bad credential: the credential failure wins.
    let response = app
        .oneshot(request("/stream/mov%21es/movie.mp4", None, Some("bytes=0-")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cap_allows_hundred_then_limits() {
    let (_lib, app) = test_app(populate_library);
    let client = client_addr(7);

    for i in 1..=100 {
        let response = app
            .clone()
            .oneshot(request_from("/", None, None, client))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "request {i} should pass");
    }

    let response = app
        .oneshot(request_from("/", None, None, client))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));

    let body = to_bytes(response.into_body(), 1024).await.unwrap();
    assert_eq!(&body[..], b"Too many requests, please try again later.");
}

#[tokio::test]
async fn test_rate_limit_is_per_identity() {
    let (_lib, app) = test_app_with_cap(populate_library, 1);

    let first = app
        .clone()
        .oneshot(request_from("/", None, None, client_addr(1)))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let limited = app
        .clone()
        .oneshot(request_from("/", None, None, client_addr(1)))
        .await
        .unwrap();
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);

    let other_client = app
        .oneshot(request_from("/", None, None, client_addr(2)))
        .await
        .unwrap();
    assert_eq!(other_client.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_checked_before_auth() {
    let (_lib, app) = test_app_with_cap(populate_library, 1);
    let client = client_addr(3);

    let first = app
        .clone()
        .oneshot(request_from(
            "/stream/movies/movie.mp4",
            Some(TEST_API_KEY),
            Some("bytes=0-"),
            client,
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::PARTIAL_CONTENT);

    // A valid credential does not bypass the limiter.
    let second = app
        .oneshot(request_from(
            "/stream/movies/movie.mp4",
            Some(TEST_API_KEY),
            Some("bytes=0-"),
            client,
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_streaming_route_counts_against_the_same_window() {
    let (_lib, app) = test_app_with_cap(populate_library, 2);
    let client = client_addr(4);

    let stream = app
        .clone()
        .oneshot(request_from(
            "/stream/movies/movie.mp4",
            Some(TEST_API_KEY),
            Some("bytes=0-"),
            client,
        ))
        .await
        .unwrap();
    assert_eq!(stream.status(), StatusCode::PARTIAL_CONTENT);

    let welcome = app
        .clone()
        .oneshot(request_from("/", None, None, client))
        .await
        .unwrap();
    assert_eq!(welcome.status(), StatusCode::OK);

    let limited = app
        .oneshot(request_from("/", None, None, client))
        .await
        .unwrap();
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
}
