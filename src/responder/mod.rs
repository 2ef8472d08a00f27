mod canned;
mod remote;

use async_trait::async_trait;
use std::time::Duration;

pub use canned::{compose_reply, CannedProvider};
pub use remote::RemoteVlmProvider;

use crate::types::ChallengeId;

/// Result type for reply generation
pub type ResponderResult<T> = Result<T, ResponderError>;

#[derive(Debug, thiserror::Error)]
pub enum ResponderError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Response parsing failed: {0}")]
    ParseError(String),
}

/// Request to generate a VLM reply for one user question
#[derive(Debug, Clone)]
pub struct ReplyRequest {
    /// The user's question, verbatim
    pub question: String,
    pub challenge_id: ChallengeId,
    /// Scene text standing in for the image (description or question)
    pub scene: String,
}

#[derive(Debug, Clone)]
pub struct ReplyResponse {
    pub text: String,
    pub metadata: ReplyMetadata,
}

#[derive(Debug, Clone)]
pub struct ReplyMetadata {
    /// Name of the provider (e.g., "canned", "remote-vlm")
    pub provider: String,
    /// Latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all reply providers must implement
#[async_trait]
pub trait ReplyProvider: Send + Sync {
    /// Generate a reply for the given question
    async fn reply(&self, request: ReplyRequest) -> ResponderResult<ReplyResponse>;

    /// Get the name of this provider
    fn name(&self) -> &str;
}

/// Ordered failover over the configured providers: first success wins.
pub struct ResponderManager {
    pub providers: Vec<Box<dyn ReplyProvider>>,
}

impl ResponderManager {
    pub fn new(providers: Vec<Box<dyn ReplyProvider>>) -> Self {
        Self { providers }
    }

    /// Try each provider in order and return the first successful reply.
    pub async fn generate(&self, request: ReplyRequest) -> ResponderResult<ReplyResponse> {
        let mut last_err = ResponderError::ConfigError("No reply providers configured".to_string());

        for provider in &self.providers {
            match provider.reply(request.clone()).await {
                Ok(response) => {
                    tracing::debug!(
                        "Provider {} replied in {}ms",
                        response.metadata.provider,
                        response.metadata.latency_ms
                    );
                    return Ok(response);
                }
                Err(e) => {
                    tracing::warn!("Provider {} failed: {}", provider.name(), e);
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }
}

/// Configuration for reply providers
#[derive(Debug, Clone)]
pub struct ResponderConfig {
    /// Base URL of a backend VLM endpoint; canned replies only when unset
    pub vlm_base_url: Option<String>,
    /// Timeout for remote VLM requests
    pub request_timeout: Duration,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            vlm_base_url: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ResponderConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let vlm_base_url = std::env::var("VLM_API_BASE_URL").ok().and_then(|url| {
            let trimmed = url.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        });

        Self {
            vlm_base_url,
            request_timeout: std::env::var("VLM_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(30)),
        }
    }

    /// Build a manager with all configured providers. The canned provider is
    /// always appended last, so the manager can never come up empty.
    pub fn build_manager(&self) -> ResponderManager {
        let mut providers: Vec<Box<dyn ReplyProvider>> = Vec::new();

        if let Some(base_url) = &self.vlm_base_url {
            providers.push(Box::new(RemoteVlmProvider::new(
                base_url.clone(),
                self.request_timeout,
            )));
        }

        providers.push(Box::new(CannedProvider::new()));

        ResponderManager::new(providers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    struct FailingProvider;

    #[async_trait]
    impl ReplyProvider for FailingProvider {
        async fn reply(&self, _request: ReplyRequest) -> ResponderResult<ReplyResponse> {
            Err(ResponderError::ApiError("connection refused".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn request() -> ReplyRequest {
        ReplyRequest {
            question: "what color is it?".to_string(),
            challenge_id: "1".to_string(),
            scene: "a red ball on green grass".to_string(),
        }
    }

    #[test]
    fn test_default_config() {
        let config = ResponderConfig::default();
        assert!(config.vlm_base_url.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    #[serial]
    fn from_env_ignores_blank_url() {
        std::env::set_var("VLM_API_BASE_URL", "   ");
        let config = ResponderConfig::from_env();
        assert!(config.vlm_base_url.is_none());
        std::env::remove_var("VLM_API_BASE_URL");
    }

    #[test]
    #[serial]
    fn from_env_reads_url_and_timeout() {
        std::env::set_var("VLM_API_BASE_URL", "http://localhost:5000");
        std::env::set_var("VLM_TIMEOUT", "5");

        let config = ResponderConfig::from_env();
        assert_eq!(config.vlm_base_url.as_deref(), Some("http://localhost:5000"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));

        std::env::remove_var("VLM_API_BASE_URL");
        std::env::remove_var("VLM_TIMEOUT");
    }

    #[test]
    fn build_manager_always_includes_canned() {
        let manager = ResponderConfig::default().build_manager();
        assert_eq!(manager.providers.len(), 1);
        assert_eq!(manager.providers[0].name(), "canned");

        let manager = ResponderConfig {
            vlm_base_url: Some("http://localhost:5000".to_string()),
            ..Default::default()
        }
        .build_manager();
        assert_eq!(manager.providers.len(), 2);
        assert_eq!(manager.providers[0].name(), "remote-vlm");
        assert_eq!(manager.providers[1].name(), "canned");
    }

    #[tokio::test]
    async fn manager_falls_through_to_next_provider() {
        let manager = ResponderManager::new(vec![
            Box::new(FailingProvider),
            Box::new(CannedProvider::new()),
        ]);

        let response = manager.generate(request()).await.unwrap();
        assert_eq!(response.metadata.provider, "canned");
        assert!(!response.text.is_empty());
    }

    #[tokio::test]
    async fn manager_reports_last_error_when_all_fail() {
        let manager = ResponderManager::new(vec![Box::new(FailingProvider)]);
        assert!(manager.generate(request()).await.is_err());
    }
}
