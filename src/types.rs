use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type ChallengeId = String;
pub type MessageId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Vlm,
}

/// One entry in the chat transcript. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: MessageRole,
    pub text: String,
    pub created_at: String,
}

impl Message {
    pub fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            role,
            text: text.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// A visual-reasoning quiz item as served by the challenge provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub id: ChallengeId,
    pub question: String,
    pub correct_answer: String,
    pub image_url: String,
    /// Textual stand-in for the image, mined by the canned responder
    #[serde(default)]
    pub image_description: Option<String>,
    /// Ordered hint ladder, consumed front to back
    #[serde(default)]
    pub hints: Vec<String>,
}

impl Challenge {
    /// Text the canned responder searches for keywords: the image
    /// description when the provider supplies one, otherwise the question.
    pub fn scene_text(&self) -> &str {
        self.image_description.as_deref().unwrap_or(&self.question)
    }
}

/// One question/reply pair, persisted as a batch when the user answers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceEntry {
    pub question: String,
    pub vlm_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Lower bound of the simulated "thinking" delay before a reply lands
    pub reply_delay_min_ms: u64,
    /// Upper bound of the delay window
    pub reply_delay_max_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reply_delay_min_ms: 1000,
            reply_delay_max_ms: 2000,
        }
    }
}
