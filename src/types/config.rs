//! Configuration types
//!
//! Runtime configuration handed to the gateway and the conversation controller.

use rand::Rng;
use std::time::Duration;

/// Default backend location when nothing else is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001";

/// Environment variable that overrides the backend base URL at startup
pub const API_URL_ENV: &str = "NEWSBOT_API_URL";

/// Backend gateway configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Base URL without trailing slash, e.g. `http://localhost:3001`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Cosmetic pause before an assistant reply is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyDelay {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl ReplyDelay {
    /// No pause at all
    pub const NONE: ReplyDelay = ReplyDelay { min_ms: 0, max_ms: 0 };

    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: max_ms.max(min_ms),
        }
    }

    /// Pick a random duration within the configured window
    pub fn sample(&self) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::rng().random_range(self.min_ms..=self.max_ms))
    }
}

impl Default for ReplyDelay {
    fn default() -> Self {
        Self {
            min_ms: 1000,
            max_ms: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = GatewayConfig::new("http://news.example/");
        assert_eq!(config.base_url, "http://news.example");
    }

    #[test]
    fn test_reply_delay_window() {
        let delay = ReplyDelay::default();
        for _ in 0..50 {
            let d = delay.sample();
            assert!(d >= Duration::from_millis(1000));
            assert!(d <= Duration::from_millis(3000));
        }
        assert_eq!(ReplyDelay::NONE.sample(), Duration::ZERO);
    }

    #[test]
    fn test_reply_delay_swapped_bounds() {
        let delay = ReplyDelay::new(500, 100);
        assert_eq!(delay.min_ms, 100);
        assert_eq!(delay.max_ms, 500);
    }
}
