//! Centralized configuration for Tidegate.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

/// Central configuration for all Tidegate components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone)]
pub struct TidegateConfig {
    pub server: ServerConfig,
    pub library: LibraryConfig,
    pub rate_limit: RateLimitConfig,
    pub streaming: StreamingConfig,
    pub conversion: ConversionConfig,
}

/// HTTP server binding and credential configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the listener to
    pub host: IpAddr,
    /// Port to bind the listener to
    pub port: u16,
    /// Shared secret clients must present in the `x-api-key` header
    pub api_key: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            api_key: String::new(),
        }
    }
}

/// Media library location configuration.
///
/// Each served category lives in its own directory directly under `root`.
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Base directory containing one subdirectory per category
    pub root: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

/// Per-client request volume limits.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Length of the counting window
    pub window: Duration,
    /// Requests allowed per identity within one window
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(15 * 60),
            max_requests: 100,
        }
    }
}

/// Byte-range streaming configuration.
#[derive(Debug, Clone)]
pub struct StreamingConfig {
    /// Upper bound on the number of bytes served per range request
    pub max_chunk_bytes: u64,
    /// Read size for each file I/O operation while streaming
    pub read_buffer_bytes: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            max_chunk_bytes: 1_000_000,
            read_buffer_bytes: 65536, // 64 KiB
        }
    }
}

/// Offline batch conversion configuration.
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Name or path of the ffmpeg binary to invoke
    pub ffmpeg_binary: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            ffmpeg_binary: "ffmpeg".to_string(),
        }
    }
}

/// Errors raised while loading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API_KEY environment variable is required but not set")]
    MissingApiKey,

    #[error("invalid value for {variable}: {value}")]
    InvalidValue { variable: String, value: String },
}

impl TidegateConfig {
    /// Creates configuration from the environment.
    ///
    /// `API_KEY` is mandatory; the server refuses to start without a shared
    /// secret. Everything else falls back to defaults when unset.
    ///
    /// # Errors
    ///
    /// - `ConfigError::MissingApiKey` - `API_KEY` is absent or empty
    /// - `ConfigError::InvalidValue` - an override variable fails to parse
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self {
            server: ServerConfig::default(),
            library: LibraryConfig::default(),
            rate_limit: RateLimitConfig::default(),
            streaming: StreamingConfig::default(),
            conversion: ConversionConfig::default(),
        };

        match std::env::var("API_KEY") {
            Ok(key) if !key.is_empty() => config.server.api_key = key,
            _ => return Err(ConfigError::MissingApiKey),
        }

        if let Ok(port) = std::env::var("PORT") {
            config.server.port = parse_var("PORT", &port)?;
        }

        if let Ok(host) = std::env::var("TIDEGATE_HOST") {
            config.server.host = parse_var("TIDEGATE_HOST", &host)?;
        }

        if let Ok(root) = std::env::var("TIDEGATE_LIBRARY_ROOT") {
            config.library.root = PathBuf::from(root);
        }

        if let Ok(secs) = std::env::var("TIDEGATE_RATE_WINDOW_SECS") {
            let secs: u64 = parse_var("TIDEGATE_RATE_WINDOW_SECS", &secs)?;
            config.rate_limit.window = Duration::from_secs(secs);
        }

        if let Ok(max) = std::env::var("TIDEGATE_RATE_MAX_REQUESTS") {
            config.rate_limit.max_requests = parse_var("TIDEGATE_RATE_MAX_REQUESTS", &max)?;
        }

        if let Ok(ffmpeg) = std::env::var("TIDEGATE_FFMPEG") {
            config.conversion.ffmpeg_binary = ffmpeg;
        }

        Ok(config)
    }

    /// Creates a configuration suitable for tests.
    ///
    /// Uses a fixed secret and a tight rate window so limiter behavior can
    /// be exercised without waiting out real intervals.
    pub fn for_testing(library_root: PathBuf) -> Self {
        Self {
            server: ServerConfig {
                api_key: "test-secret".to_string(),
                ..ServerConfig::default()
            },
            library: LibraryConfig { root: library_root },
            rate_limit: RateLimitConfig::default(),
            streaming: StreamingConfig::default(),
            conversion: ConversionConfig::default(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(variable: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        variable: variable.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = TidegateConfig::for_testing(PathBuf::from("/tmp"));

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.rate_limit.window, Duration::from_secs(900));
        assert_eq!(config.streaming.max_chunk_bytes, 1_000_000);
        assert_eq!(config.streaming.read_buffer_bytes, 65536);
        assert_eq!(config.conversion.ffmpeg_binary, "ffmpeg");
    }

    // Environment scenarios share process-global state, so they run as one
    // sequential test rather than racing in parallel.
    #[test]
    fn test_env_loading() {
        unsafe {
            std::env::remove_var("API_KEY");
        }
        assert!(matches!(
            TidegateConfig::from_env(),
            Err(ConfigError::MissingApiKey)
        ));

        unsafe {
            std::env::set_var("API_KEY", "hunter2");
            std::env::set_var("PORT", "8080");
            std::env::set_var("TIDEGATE_LIBRARY_ROOT", "/srv/media");
            std::env::set_var("TIDEGATE_RATE_MAX_REQUESTS", "250");
        }

        let config = TidegateConfig::from_env().unwrap();
        assert_eq!(config.server.api_key, "hunter2");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.library.root, PathBuf::from("/srv/media"));
        assert_eq!(config.rate_limit.max_requests, 250);

        unsafe {
            std::env::set_var("PORT", "not-a-port");
        }
        assert!(matches!(
            TidegateConfig::from_env(),
            Err(ConfigError::InvalidValue { .. })
        ));

        // Cleanup
        unsafe {
            std::env::remove_var("API_KEY");
            std::env::remove_var("PORT");
            std::env::remove_var("TIDEGATE_LIBRARY_ROOT");
            std::env::remove_var("TIDEGATE_RATE_MAX_REQUESTS");
        }
    }
}
