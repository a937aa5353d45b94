//! Client configuration sourced from the process environment.

use tracing::debug;

/// Environment variable holding the backend's base URL.
pub const BASE_URL_ENV: &str = "UMS_API_BASE_URL";

/// Base URL used when the environment does not provide one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Read `UMS_API_BASE_URL`, falling back to the local development
    /// endpoint when it is unset or blank.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            Some(url) => Self::new(url.trim()),
            None => {
                debug!("{BASE_URL_ENV} not set, using {DEFAULT_BASE_URL}");
                Self::new(DEFAULT_BASE_URL)
            }
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
