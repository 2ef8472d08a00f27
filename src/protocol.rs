use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ask the VLM a question about the hidden image
    SendMessage { text: String },
    /// Submit the final answer for the active challenge
    SubmitAnswer { answer: String },
    /// Request the next unused hint
    UseHint,
    /// Switch the session to another challenge (full reset)
    SelectChallenge { challenge_id: ChallengeId },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        challenges: Vec<ChallengeInfo>,
        active: Option<ChallengeInfo>,
        transcript: Vec<Message>,
        server_now: String,
    },
    /// A message (user, VLM reply, or hint) was appended to the transcript
    MessageAppended {
        message: Message,
    },
    /// Terminal verdict for the session; `message` is the trailing
    /// transcript entry revealing the correct answer
    AnswerResult {
        correct: bool,
        correct_answer: String,
        questions_asked: u32,
        message: Message,
    },
    ChallengeSelected {
        challenge: ChallengeInfo,
        transcript: Vec<Message>,
    },
    Error {
        code: String,
        msg: String,
    },
}

/// Challenge as shown to the client: never includes the correct answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeInfo {
    pub id: ChallengeId,
    pub question: String,
    pub image_url: String,
    pub hints_available: usize,
}

impl From<&Challenge> for ChallengeInfo {
    fn from(c: &Challenge) -> Self {
        Self {
            id: c.id.clone(),
            question: c.question.clone(),
            image_url: c.image_url.clone(),
            hints_available: c.hints.len(),
        }
    }
}
