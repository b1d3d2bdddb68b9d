//! Integration tests for Tidegate
//!
//! These tests drive the full router through every stage of the request
//! pipeline: rate limiting, authentication, path resolution, range parsing,
//! and response framing.

#[path = "integration/common.rs"]
mod common;

#[path = "integration/streaming_pipeline.rs"]
mod streaming_pipeline;

#[path = "integration/gating.rs"]
mod gating;

#[path = "integration/whole_file.rs"]
mod whole_file;
