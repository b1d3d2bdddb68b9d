//! Tidegate Core - Media library, gating, and streaming functionality
//!
//! This crate provides the building blocks for an authenticated, rate-limited
//! media server: configuration management, traversal-safe path resolution,
//! byte-range parsing, shared-secret authentication, per-client rate
//! limiting, bounded file streaming, and offline batch conversion.

pub mod auth;
pub mod config;
pub mod library;
pub mod range;
pub mod rate_limit;
pub mod stream;
pub mod tracing_setup;
pub mod transcoding;

// Re-export main types for convenient access
pub use auth::{ApiKeyGate, AuthError};
pub use config::{ConfigError, TidegateConfig};
pub use library::{Category, LibraryError, MediaLibrary, ResolvedMedia};
pub use range::{ByteRange, RangeError, parse_range};
pub use rate_limit::{RateLimitError, RateLimiter};
pub use stream::{FileSlice, StreamError};
pub use transcoding::{ConversionOutcome, ConvertOptions, MediaConverter, TranscodeError};

/// Core errors that can bubble up from any Tidegate subsystem.
#[derive(Debug, thiserror::Error)]
pub enum TidegateError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("library error: {0}")]
    Library(#[from] LibraryError),

    #[error("range error: {0}")]
    Range(#[from] RangeError),

    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("rate limit error: {0}")]
    RateLimit(#[from] RateLimitError),

    #[error("streaming error: {0}")]
    Stream(#[from] StreamError),

    #[error("conversion error: {0}")]
    Transcode(#[from] TranscodeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TidegateError>;
