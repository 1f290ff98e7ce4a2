//! Application configuration loaded from environment variables.

use std::time::Duration;

/// Runtime configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `RESERVATION_TIMEOUT_MS` — reservation round-trip timeout (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub reservation_timeout_ms: u64,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self {
            reservation_timeout_ms: std::env::var("RESERVATION_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Returns the reservation timeout as a [`Duration`].
    pub fn reservation_timeout(&self) -> Duration {
        Duration::from_millis(self.reservation_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reservation_timeout_ms: 3000,
            log_level: "info".to_string(),
        }
    }
}
