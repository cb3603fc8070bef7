//! Environment-driven settings for the publishing API client.

use crate::error::ConfigError;
use std::time::Duration;

/// Default Google Play Developer API host
pub const DEFAULT_API_URL: &str = "https://androidpublisher.googleapis.com";

const DEFAULT_TIMEOUT_SECS: u64 = 3 * 60;
const MAX_TIMEOUT_SECS: u64 = 60 * 60;

/// Connection settings for the publishing API
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Scheme and host of the API, without a trailing path
    pub base_url: String,
    /// TCP/TLS connect timeout
    pub connect_timeout: Duration,
    /// Per-read timeout while waiting on the server
    pub read_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ApiSettings {
    /// Parse a timeout in seconds, clamped to [1, MAX_TIMEOUT_SECS]
    fn parse_timeout(value: Option<String>) -> Duration {
        let secs = value
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(|v| v.clamp(1, MAX_TIMEOUT_SECS))
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Build settings from explicit variable values (`None` = unset)
    pub fn from_values(
        base_url: Option<String>,
        connect_timeout: Option<String>,
        read_timeout: Option<String>,
    ) -> Self {
        Self {
            base_url: base_url
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            connect_timeout: Self::parse_timeout(connect_timeout),
            read_timeout: Self::parse_timeout(read_timeout),
        }
    }

    /// Create settings from environment variables with fallback to defaults
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var("KODEGEN_PLAY_API_URL").ok(),
            std::env::var("KODEGEN_PLAY_CONNECT_TIMEOUT").ok(),
            std::env::var("KODEGEN_PLAY_READ_TIMEOUT").ok(),
        )
    }

    /// Validate the base URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        match url::Url::parse(&self.base_url) {
            Ok(url) if url.cannot_be_a_base() => Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: "not a hierarchical URL".to_string(),
            }),
            Ok(_) => Ok(()),
            Err(e) => Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        let settings = ApiSettings::from_values(None, None, None);
        assert_eq!(settings.base_url, DEFAULT_API_URL);
        assert_eq!(settings.connect_timeout, Duration::from_secs(180));
        assert_eq!(settings.read_timeout, Duration::from_secs(180));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn timeouts_are_clamped() {
        let settings =
            ApiSettings::from_values(None, Some("0".to_string()), Some("999999".to_string()));
        assert_eq!(settings.connect_timeout, Duration::from_secs(1));
        assert_eq!(settings.read_timeout, Duration::from_secs(MAX_TIMEOUT_SECS));

        let settings = ApiSettings::from_values(None, Some("soon".to_string()), None);
        assert_eq!(settings.connect_timeout, Duration::from_secs(180));
    }

    #[test]
    fn trailing_slash_is_trimmed_and_bad_urls_rejected() {
        let settings = ApiSettings::from_values(Some("http://127.0.0.1:8080/".to_string()), None, None);
        assert_eq!(settings.base_url, "http://127.0.0.1:8080");
        assert!(settings.validate().is_ok());

        let settings = ApiSettings::from_values(Some("not a url".to_string()), None, None);
        assert!(settings.validate().is_err());
    }
}
