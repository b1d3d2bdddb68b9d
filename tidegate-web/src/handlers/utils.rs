//! Shared helpers for request handlers.

use axum::http::{HeaderMap, header};

use crate::error::ApiError;

/// Header carrying the shared-secret credential.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Extracts the presented API key, if any.
pub fn api_key(headers: &HeaderMap) -> Option<&str> {
    headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok())
}

/// Extracts the `Range` header value, if present and valid UTF-8.
pub fn range_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::RANGE).and_then(|v| v.to_str().ok())
}

/// Basic shape check for the category route segment.
///
/// Categories are plain alphanumeric route names; anything else is malformed
/// before it is ever looked up.
pub fn validate_category_shape(category: &str) -> Result<(), ApiError> {
    if !category.is_empty() && category.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ApiError::BadRequest {
            detail: "category must be alphanumeric".to_string(),
        })
    }
}

/// Basic shape check for a client-supplied filename.
///
/// Containment is the resolver's job; this only rejects values that are not
/// plausible filenames at all.
pub fn validate_filename_shape(filename: &str) -> Result<(), ApiError> {
    if filename.is_empty() || filename.contains('\0') {
        return Err(ApiError::BadRequest {
            detail: "invalid filename".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_category_shape() {
        assert!(validate_category_shape("movies").is_ok());
        assert!(validate_category_shape("movies2").is_ok());
        assert!(validate_category_shape("").is_err());
        assert!(validate_category_shape("mov ies").is_err());
        assert!(validate_category_shape("movies/..").is_err());
    }

    #[test]
    fn test_filename_shape() {
        assert!(validate_filename_shape("movie.mp4").is_ok());
        // Traversal sequences pass shape validation; the resolver rejects
        // them with 403 instead of 400.
        assert!(validate_filename_shape("../movie.mp4").is_ok());
        assert!(validate_filename_shape("").is_err());
        assert!(validate_filename_shape("bad\0name").is_err());
    }

    #[test]
    fn test_api_key_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(api_key(&headers), None);

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("secret"));
        assert_eq!(api_key(&headers), Some("secret"));
    }
}
