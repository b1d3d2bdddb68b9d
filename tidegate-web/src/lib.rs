//! Tidegate Web - HTTP server
//!
//! Authenticated, rate-limited HTTP access to the media library: a
//! partial-content streaming route for seekable playback plus whole-file
//! companion routes, all sharing the same gating pipeline.

pub mod error;
pub mod handlers;
pub mod server;

// Re-export main types
pub use error::ApiError;
pub use server::{AppState, build_router, run_server};
