use super::*;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Provider that defers reply text to a backend VLM endpoint.
pub struct RemoteVlmProvider {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl RemoteVlmProvider {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap();

        Self {
            base_url,
            timeout,
            client,
        }
    }
}

#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    question: &'a str,
    challenge_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct AskResponse {
    response: String,
    #[serde(default)]
    #[allow(dead_code)] // Part of the backend's response format
    timestamp: Option<String>,
}

#[async_trait]
impl ReplyProvider for RemoteVlmProvider {
    async fn reply(&self, request: ReplyRequest) -> ResponderResult<ReplyResponse> {
        let start = Instant::now();

        let url = format!("{}/api/ask", self.base_url);
        let body = AskRequest {
            question: &request.question,
            challenge_id: &request.challenge_id,
        };

        // Execute with timeout
        let response =
            tokio::time::timeout(self.timeout, self.client.post(&url).json(&body).send())
                .await
                .map_err(|_| ResponderError::Timeout(self.timeout))?
                .map_err(|e| ResponderError::ApiError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ResponderError::ApiError(format!(
                "VLM endpoint returned status: {}",
                response.status()
            )));
        }

        let ask: AskResponse = response
            .json()
            .await
            .map_err(|e| ResponderError::ParseError(e.to_string()))?;

        let latency_ms = start.elapsed().as_millis() as u64;

        Ok(ReplyResponse {
            text: ask.response.trim().to_string(),
            metadata: ReplyMetadata {
                provider: "remote-vlm".to_string(),
                latency_ms,
            },
        })
    }

    fn name(&self) -> &str {
        "remote-vlm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_response_parses_with_and_without_timestamp() {
        let full: AskResponse =
            serde_json::from_str(r#"{"response":"A red ball.","timestamp":"2026-01-01T00:00:00"}"#)
                .unwrap();
        assert_eq!(full.response, "A red ball.");

        let bare: AskResponse = serde_json::from_str(r#"{"response":"A red ball."}"#).unwrap();
        assert_eq!(bare.response, "A red ball.");
    }

    #[tokio::test]
    #[ignore] // Only run with the quiz backend running locally
    async fn test_remote_reply() {
        let provider = RemoteVlmProvider::new(
            "http://localhost:5000".to_string(),
            Duration::from_secs(30),
        );

        let response = provider
            .reply(ReplyRequest {
                question: "What color is it?".to_string(),
                challenge_id: "1".to_string(),
                scene: String::new(),
            })
            .await
            .unwrap();

        assert!(!response.text.is_empty());
        assert_eq!(response.metadata.provider, "remote-vlm");
        println!("Generated text: {}", response.text);
    }
}
