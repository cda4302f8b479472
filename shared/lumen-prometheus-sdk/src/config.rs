//! Prometheus client configuration

use std::time::Duration;

use crate::{PrometheusError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:9090";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client-wide settings, usually read once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct PrometheusConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Sent with every request
    pub headers: Vec<(String, String)>,
    pub bearer_token: Option<String>,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            headers: Vec::new(),
            bearer_token: None,
        }
    }
}

impl PrometheusConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let request_timeout_secs = match lookup("PROMETHEUS_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(PrometheusError::Config(format!(
                        "Invalid PROMETHEUS_TIMEOUT_SECS: {:?}",
                        raw
                    )))
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url: lookup("PROMETHEUS_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout_secs,
            headers: Vec::new(),
            bearer_token: lookup("PROMETHEUS_BEARER_TOKEN").filter(|t| !t.is_empty()),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_bearer_token(mut self, token: &str) -> Self {
        self.bearer_token = Some(token.to_string());
        self
    }
}

/// Per-request overrides. Only the base URL is mandatory.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub base_url: String,
    pub headers: Vec<(String, String)>,
    pub bearer_token: Option<String>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            headers: Vec::new(),
            bearer_token: None,
            timeout: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_bearer_token(mut self, token: &str) -> Self {
        self.bearer_token = Some(token.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl From<&PrometheusConfig> for RequestOptions {
    fn from(config: &PrometheusConfig) -> Self {
        Self::new(&config.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| env.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = PrometheusConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, PrometheusConfig::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_reads_overrides() {
        let config = PrometheusConfig::from_lookup(lookup(&[
            ("PROMETHEUS_BASE_URL", "https://prom.internal"),
            ("PROMETHEUS_TIMEOUT_SECS", "5"),
            ("PROMETHEUS_BEARER_TOKEN", "s3cret"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://prom.internal");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.bearer_token.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_rejects_bad_timeout() {
        for raw in ["0", "-1", "soon"] {
            let err = PrometheusConfig::from_lookup(lookup(&[("PROMETHEUS_TIMEOUT_SECS", raw)])).unwrap_err();
            assert!(matches!(err, PrometheusError::Config(_)));
        }
    }

    #[test]
    fn test_request_options_builder() {
        let options = RequestOptions::new("http://prom:9090")
            .with_header("X-Scope-OrgID", "tenant-a")
            .with_timeout(Duration::from_secs(2));

        assert_eq!(options.headers, vec![("X-Scope-OrgID".to_string(), "tenant-a".to_string())]);
        assert_eq!(options.timeout, Some(Duration::from_secs(2)));
        assert!(options.bearer_token.is_none());
    }
}
