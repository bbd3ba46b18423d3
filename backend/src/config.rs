//! Configuration for the remote collaborators.

use crate::error::{AppError, AppResult};
use std::env;

/// Environment variable holding the remote project base URL
pub const ENV_BASE_URL: &str = "HABIT_TRACKER_SUPABASE_URL";
/// Environment variable holding the anonymous API key
pub const ENV_API_KEY: &str = "HABIT_TRACKER_SUPABASE_ANON_KEY";

/// Connection settings for the hosted record store and identity provider
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Project base URL, no trailing slash
    pub base_url: String,
    /// Anonymous API key sent with every request
    pub api_key: String,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Read the remote configuration from the environment
    pub fn from_env() -> AppResult<Self> {
        let base_url = env::var(ENV_BASE_URL)
            .map_err(|_| AppError::validation(format!("{} is not set", ENV_BASE_URL)))?;
        let api_key = env::var(ENV_API_KEY)
            .map_err(|_| AppError::validation(format!("{} is not set", ENV_API_KEY)))?;
        Ok(Self::new(base_url, api_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = RemoteConfig::new("https://example.test/", "anon");
        assert_eq!(config.base_url, "https://example.test");
        assert_eq!(config.api_key, "anon");
    }
}
