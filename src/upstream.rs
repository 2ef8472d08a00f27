//! Clients for the external quiz backend: the challenge provider and the
//! trace sink. Both are best-effort collaborators; neither failure mode is
//! allowed to take the session engine down.

use crate::types::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result type for upstream calls
pub type UpstreamResult<T> = Result<T, UpstreamError>;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Response parsing failed: {0}")]
    ParseError(String),
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the quiz backend serving challenges and storing traces
    pub base_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
        }
    }
}

impl UpstreamConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let base_url = std::env::var("QUIZ_API_BASE_URL")
            .ok()
            .and_then(|url| {
                let trimmed = url.trim();
                (!trimmed.is_empty()).then(|| trimmed.trim_end_matches('/').to_string())
            })
            .unwrap_or_else(|| "http://localhost:5000".to_string());

        Self { base_url }
    }
}

/// Wire format of one record from `GET /api/challenges`. Description and
/// hints are extensions the distilled feed may omit.
#[derive(Debug, Clone, Deserialize)]
struct ChallengeRecord {
    id: String,
    question: String,
    correct_answer: String,
    image_static_url: String,
    #[serde(default)]
    image_description: Option<String>,
    #[serde(default)]
    hints: Vec<String>,
}

impl From<ChallengeRecord> for Challenge {
    fn from(r: ChallengeRecord) -> Self {
        Self {
            id: r.id,
            question: r.question,
            correct_answer: r.correct_answer,
            image_url: r.image_static_url,
            image_description: r.image_description,
            hints: r.hints,
        }
    }
}

/// One-shot challenge fetch, consumed at startup.
pub struct ChallengeClient {
    base_url: String,
    client: reqwest::Client,
}

impl ChallengeClient {
    pub fn new(config: &UpstreamConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();

        Self {
            base_url: config.base_url.clone(),
            client,
        }
    }

    pub async fn fetch_challenges(&self) -> UpstreamResult<Vec<Challenge>> {
        let url = format!("{}/api/challenges", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| UpstreamError::ApiError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(UpstreamError::ApiError(format!(
                "Challenge provider returned status: {}",
                response.status()
            )));
        }

        let records: Vec<ChallengeRecord> = response
            .json()
            .await
            .map_err(|e| UpstreamError::ParseError(e.to_string()))?;

        Ok(records.into_iter().map(Challenge::from).collect())
    }
}

#[derive(Debug, Serialize)]
struct SaveTraceBody<'a> {
    challenge_id: &'a str,
    trace: &'a [TraceEntry],
    user: &'a str,
}

/// Fire-and-forget trace persistence. No retry, no timeout beyond the
/// client's, no user-visible error: failures are logged at debug and
/// swallowed.
pub struct TraceClient {
    base_url: String,
    client: reqwest::Client,
}

impl TraceClient {
    pub fn new(config: &UpstreamConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();

        Self {
            base_url: config.base_url.clone(),
            client,
        }
    }

    /// Post the session's trace in the background and move on.
    pub fn save_detached(&self, challenge_id: ChallengeId, trace: Vec<TraceEntry>) {
        if trace.is_empty() {
            // The backend rejects an empty trace; nothing worth a request
            return;
        }

        let client = self.client.clone();
        let url = format!("{}/api/save-trace", self.base_url);

        tokio::spawn(async move {
            let body = SaveTraceBody {
                challenge_id: &challenge_id,
                trace: &trace,
                user: "anonymous",
            };

            match client.post(&url).json(&body).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!("Trace saved for challenge {}", challenge_id);
                }
                Ok(response) => {
                    tracing::debug!("Trace save rejected with status {}", response.status());
                }
                Err(e) => {
                    tracing::debug!("Trace save failed: {}", e);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn challenge_record_parses_the_distilled_feed() {
        let json = r#"[{"id":"1","question":"What color?","correct_answer":"A","image_static_url":"/static/img/1.png"}]"#;
        let records: Vec<ChallengeRecord> = serde_json::from_str(json).unwrap();

        let challenge = Challenge::from(records[0].clone());
        assert_eq!(challenge.id, "1");
        assert_eq!(challenge.image_url, "/static/img/1.png");
        assert!(challenge.image_description.is_none());
        assert!(challenge.hints.is_empty());
    }

    #[test]
    fn challenge_record_parses_extended_fields() {
        let json = r#"{"id":"2","question":"How many?","correct_answer":"3","image_static_url":"/static/img/2.png","image_description":"three birds on a wire","hints":["count the wings"]}"#;
        let record: ChallengeRecord = serde_json::from_str(json).unwrap();

        let challenge = Challenge::from(record);
        assert_eq!(challenge.scene_text(), "three birds on a wire");
        assert_eq!(challenge.hints.len(), 1);
    }

    #[test]
    fn save_trace_body_matches_backend_contract() {
        let trace = vec![TraceEntry {
            question: "what color?".to_string(),
            vlm_answer: "red".to_string(),
        }];
        let body = SaveTraceBody {
            challenge_id: "1",
            trace: &trace,
            user: "anonymous",
        };

        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"challenge_id\":\"1\""));
        assert!(json.contains("\"vlm_answer\":\"red\""));
        assert!(json.contains("\"user\":\"anonymous\""));
    }

    #[test]
    #[serial]
    fn from_env_strips_trailing_slash() {
        std::env::set_var("QUIZ_API_BASE_URL", "http://quiz.example:9000/");
        let config = UpstreamConfig::from_env();
        assert_eq!(config.base_url, "http://quiz.example:9000");
        std::env::remove_var("QUIZ_API_BASE_URL");
    }

    #[test]
    #[serial]
    fn from_env_falls_back_to_default() {
        std::env::remove_var("QUIZ_API_BASE_URL");
        let config = UpstreamConfig::from_env();
        assert_eq!(config.base_url, "http://localhost:5000");
    }
}
