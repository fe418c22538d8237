//! Cache backend configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::retry::RetryPolicy;

pub const DEFAULT_REDIS_HOST: &str = "localhost";
pub const DEFAULT_REDIS_PORT: u16 = 6379;
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 5;
pub const DEFAULT_CONNECT_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub redis_host: String,
    pub redis_port: u16,
    /// Connection attempts at startup before settling for the local store.
    pub connect_attempts: u32,
    /// Delay after the first failed attempt; doubles each time.
    pub connect_initial_delay: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_host: DEFAULT_REDIS_HOST.to_string(),
            redis_port: DEFAULT_REDIS_PORT,
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
            connect_initial_delay: Duration::from_millis(DEFAULT_CONNECT_DELAY_MS),
        }
    }
}

impl CacheConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `REDIS_HOST`: Redis host (default: "localhost")
    /// - `REDIS_PORT`: Redis port (default: 6379)
    /// - `REDIS_MAX_RETRIES`: connection attempts (default: 5)
    /// - `REDIS_RETRY_DELAY_MS`: initial backoff in ms (default: 1000)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let redis_host = lookup("REDIS_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or(defaults.redis_host);

        let redis_port = lookup("REDIS_PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.redis_port);

        let connect_attempts = lookup("REDIS_MAX_RETRIES")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.connect_attempts);

        let connect_initial_delay = lookup("REDIS_RETRY_DELAY_MS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.connect_initial_delay);

        Self {
            redis_host,
            redis_port,
            connect_attempts,
            connect_initial_delay,
        }
    }

    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/", self.redis_host, self.redis_port)
    }

    pub fn connect_policy(&self) -> RetryPolicy {
        RetryPolicy::exponential(self.connect_attempts, self.connect_initial_delay)
    }
}
