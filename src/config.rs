//! Client configuration.

use std::time::Duration;

/// E-utilities base URL
pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/";

/// Tool name reported to NCBI
pub const TOOL_NAME: &str = "rustpubmed";

/// Interval between requests without an API key (NCBI allows 3/s; we stay polite)
pub const DEFAULT_REQUEST_INTERVAL: Duration = Duration::from_millis(1000);

/// Interval between requests with an API key
pub const API_KEY_REQUEST_INTERVAL: Duration = Duration::from_millis(100);

/// Settings for [`crate::pubmed::PubMedClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// E-utilities base URL, with trailing slash
    pub base_url: String,
    /// Contact email sent as `email` and in the user agent
    pub email: Option<String>,
    /// NCBI API key
    pub api_key: Option<String>,
    /// Minimum time between two requests
    pub request_interval: Duration,
    /// Per-request timeout
    pub timeout: Duration,
    /// Attempts per request when rate limited or failing
    pub max_retries: u32,
    /// First retry delay; doubles on each further attempt
    pub retry_backoff: Duration,
}

impl ClientConfig {
    /// Default settings for an optional API key, with the matching interval.
    pub fn with_api_key(api_key: Option<String>) -> Self {
        let request_interval = if api_key.is_some() {
            API_KEY_REQUEST_INTERVAL
        } else {
            DEFAULT_REQUEST_INTERVAL
        };
        Self {
            api_key,
            request_interval,
            ..Self::default()
        }
    }

    /// User agent string
    pub fn user_agent(&self) -> String {
        match &self.email {
            Some(email) => format!("{}/{} (mailto:{})", TOOL_NAME, env!("CARGO_PKG_VERSION"), email),
            None => format!("{}/{}", TOOL_NAME, env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            email: None,
            api_key: None,
            request_interval: DEFAULT_REQUEST_INTERVAL,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_follows_api_key() {
        assert_eq!(
            ClientConfig::with_api_key(None).request_interval,
            DEFAULT_REQUEST_INTERVAL
        );
        let config = ClientConfig::with_api_key(Some("key".to_string()));
        assert_eq!(config.request_interval, API_KEY_REQUEST_INTERVAL);
        assert_eq!(config.api_key.as_deref(), Some("key"));
    }

    #[test]
    fn test_user_agent() {
        let mut config = ClientConfig::default();
        assert!(config.user_agent().starts_with("rustpubmed/"));
        config.email = Some("me@example.org".to_string());
        assert!(config.user_agent().ends_with("(mailto:me@example.org)"));
    }
}
