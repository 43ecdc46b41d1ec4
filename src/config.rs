//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

pub const ENV_ACCEPT_INVALID_CERTS: &str = "SQLEXT_HTTP_ACCEPT_INVALID_CERTS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "SQLEXT_HTTP_TIMEOUT_SECS";

/// HTTP client settings for the stage query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpConfig {
    /// Skip TLS certificate validation. Off unless explicitly requested.
    pub accept_invalid_certs: bool,
    /// Whole-request timeout. `None` waits for the server indefinitely.
    pub timeout: Option<Duration>,
}

impl HttpConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let accept_invalid_certs = lookup(ENV_ACCEPT_INVALID_CERTS)
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        let timeout = lookup(ENV_HTTP_TIMEOUT_SECS)
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs);

        Self {
            accept_invalid_certs,
            timeout,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout == Some(Duration::ZERO) {
            return Err(ConfigError::InvalidValue {
                key: ENV_HTTP_TIMEOUT_SECS.to_string(),
                message: "timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Interpret an environment flag. `1`, `true`, `yes` and `on` are truthy.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
