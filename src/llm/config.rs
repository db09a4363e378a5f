use std::time::Duration;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_SHORT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_LONG_MODEL: &str = "gpt-3.5-turbo-16k";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Which failed completion calls get their single retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// Retry every failure once, whatever its cause.
    #[default]
    Always,
    /// Retry only timeouts, network errors, rate limits and 5xx responses.
    TransientOnly,
}

#[derive(Debug, Clone)]
pub struct LLMConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub short_model: String,
    pub long_model: String,
    pub timeout: Duration,
    pub retry_policy: RetryPolicy,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            short_model: DEFAULT_SHORT_MODEL.to_string(),
            long_model: DEFAULT_LONG_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry_policy: RetryPolicy::Always,
        }
    }
}

impl LLMConfig {
    pub fn new(api_url: String, api_key: Option<String>) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            ..Self::default()
        }
    }

    pub fn with_models(mut self, short_model: String, long_model: String) -> Self {
        self.short_model = short_model;
        self.long_model = long_model;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_targets_openai_with_both_model_variants() {
        let config = LLMConfig::default();

        assert_eq!(config.api_url, "https://api.openai.com/v1");
        assert_eq!(config.short_model, "gpt-3.5-turbo");
        assert_eq!(config.long_model, "gpt-3.5-turbo-16k");
        assert_eq!(config.retry_policy, RetryPolicy::Always);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn new_strips_trailing_slash_and_blank_key() {
        let config = LLMConfig::new("http://localhost:1234/v1/".to_string(), Some("  ".to_string()));

        assert_eq!(config.api_url, "http://localhost:1234/v1");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn builders_override_defaults() {
        let config = LLMConfig::new("http://localhost".to_string(), Some("sk-test".to_string()))
            .with_models("small".to_string(), "large".to_string())
            .with_timeout(Duration::from_secs(5))
            .with_retry_policy(RetryPolicy::TransientOnly);

        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.short_model, "small");
        assert_eq!(config.long_model, "large");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retry_policy, RetryPolicy::TransientOnly);
    }
}
