//! Server configuration
//!
//! Configuration is loaded from environment variables over built-in defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::overlay::RetryPolicy;

/// Main server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,

    /// Overlay generation service configuration
    pub overlay_service: OverlayServiceConfig,

    /// Session configuration
    pub session: SessionConfig,

    /// Static file serving configuration
    pub static_files: StaticFilesConfig,
}

/// Overlay generation service configuration
#[derive(Debug, Clone)]
pub struct OverlayServiceConfig {
    /// Endpoint receiving the JSON overlay request
    pub url: String,
    /// Bearer token sent with each request (optional)
    pub api_key: Option<String>,
    /// Transport timeout for one call
    pub request_timeout: Duration,
    /// Total attempts per invocation (1 = no retry)
    pub retry_max_attempts: u32,
    /// Delay before the first retry
    pub retry_backoff: Duration,
}

/// Session-related configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Idle time after which a session is removed
    pub idle_ttl: Duration,
    /// How often idle sessions are swept
    pub cleanup_interval: Duration,
}

/// Static file serving configuration
#[derive(Debug, Clone, Default)]
pub struct StaticFilesConfig {
    /// Directory holding the built kiosk front-end (optional)
    pub dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            overlay_service: OverlayServiceConfig::default(),
            session: SessionConfig::default(),
            static_files: StaticFilesConfig::default(),
        }
    }
}

impl Default for OverlayServiceConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321/functions/v1/generate-overlay".to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(60),
            retry_max_attempts: 1,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl OverlayServiceConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_max_attempts, self.retry_backoff)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(30 * 60), // 30 minutes
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        // Server config
        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT")
            && let Ok(p) = port.parse()
        {
            config.port = p;
        }

        // Overlay service config
        if let Some(url) = lookup("OVERLAY_SERVICE_URL")
            && !url.is_empty()
        {
            config.overlay_service.url = url;
        }
        if let Some(key) = lookup("OVERLAY_SERVICE_API_KEY")
            && !key.is_empty()
        {
            config.overlay_service.api_key = Some(key);
        }
        if let Some(val) = lookup("OVERLAY_REQUEST_TIMEOUT_SECS")
            && let Ok(secs) = val.parse::<u64>()
        {
            config.overlay_service.request_timeout = Duration::from_secs(secs);
        }
        if let Some(val) = lookup("OVERLAY_RETRY_MAX_ATTEMPTS")
            && let Ok(attempts) = val.parse::<u32>()
        {
            config.overlay_service.retry_max_attempts = attempts.max(1);
        }
        if let Some(val) = lookup("OVERLAY_RETRY_BACKOFF_MS")
            && let Ok(ms) = val.parse::<u64>()
        {
            config.overlay_service.retry_backoff = Duration::from_millis(ms);
        }

        // Session config
        if let Some(val) = lookup("SESSION_IDLE_TTL_MINS")
            && let Ok(mins) = val.parse::<u64>()
        {
            config.session.idle_ttl = Duration::from_secs(mins * 60);
        }
        if let Some(val) = lookup("SESSION_CLEANUP_INTERVAL_SECS")
            && let Ok(secs) = val.parse::<u64>()
            && secs > 0
        {
            config.session.cleanup_interval = Duration::from_secs(secs);
        }

        // Static files
        if let Some(dir) = lookup("STATIC_FILES_DIR")
            && !dir.is_empty()
        {
            config.static_files.dir = Some(PathBuf::from(dir));
        }

        config
    }
}
