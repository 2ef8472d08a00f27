mod answer;
mod challenge;
mod hint;
mod message;

pub use answer::AnswerOutcome;
pub use message::{ReplyTicket, SendReceipt};

use crate::responder::ResponderManager;
use crate::types::*;
use crate::upstream::TraceClient;

/// Shared application state: everything that outlives a single connection.
pub struct AppState {
    /// Challenge list fetched once at startup; empty in the degraded case
    pub challenges: Vec<Challenge>,
    pub responder: ResponderManager,
    pub trace: TraceClient,
    pub session_config: SessionConfig,
}

impl AppState {
    pub fn new(
        challenges: Vec<Challenge>,
        responder: ResponderManager,
        trace: TraceClient,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            challenges,
            responder,
            trace,
            session_config,
        }
    }

    pub fn challenge_by_id(&self, id: &str) -> Option<&Challenge> {
        self.challenges.iter().find(|c| c.id == id)
    }

    /// Start a fresh session on the first available challenge, if any.
    pub fn new_session(&self) -> Session {
        Session::new(self.challenges.first().cloned())
    }
}

/// Per-connection conversation state. All transitions live in the sibling
/// modules; each one validates before mutating, so a rejected call leaves
/// the session untouched.
pub struct Session {
    challenge: Option<Challenge>,
    messages: Vec<Message>,
    questions_asked: u32,
    hints_used: usize,
    answered: bool,
    trace: Vec<TraceEntry>,
    /// Bumped on challenge switch; in-flight replies from an older epoch
    /// are dropped on arrival
    epoch: u64,
}

impl Session {
    pub fn new(challenge: Option<Challenge>) -> Self {
        Self {
            challenge,
            messages: vec![challenge::greeting_message()],
            questions_asked: 0,
            hints_used: 0,
            answered: false,
            trace: Vec::new(),
            epoch: 0,
        }
    }

    pub fn active_challenge(&self) -> Option<&Challenge> {
        self.challenge.as_ref()
    }

    pub fn transcript(&self) -> &[Message] {
        &self.messages
    }

    pub fn questions_asked(&self) -> u32 {
        self.questions_asked
    }

    pub fn hints_used(&self) -> usize {
        self.hints_used
    }

    pub fn is_answered(&self) -> bool {
        self.answered
    }
}

#[cfg(test)]
pub(crate) fn test_challenge() -> Challenge {
    Challenge {
        id: "1".to_string(),
        question: "What color is the ball?".to_string(),
        correct_answer: "Red".to_string(),
        image_url: "/static/img/1.png".to_string(),
        image_description: Some("A red ball on green grass".to_string()),
        hints: vec![
            "It is a primary color".to_string(),
            "Think of a fire truck".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_with_greeting_only() {
        let session = Session::new(Some(test_challenge()));

        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0].role, MessageRole::Vlm);
        assert_eq!(session.questions_asked(), 0);
        assert_eq!(session.hints_used(), 0);
        assert!(!session.is_answered());
    }

    #[test]
    fn session_without_challenge_is_degraded_but_valid() {
        let session = Session::new(None);

        assert!(session.active_challenge().is_none());
        assert_eq!(session.transcript().len(), 1);
    }
}
