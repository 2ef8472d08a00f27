use super::Session;
use crate::types::*;

/// Normalize text for answer comparison (trim whitespace, lowercase)
fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Outcome of a successful submission; `trace` is the batch handed to the
/// persistence client.
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_answer: String,
    pub challenge_id: ChallengeId,
    pub message: Message,
    pub trace: Vec<TraceEntry>,
}

impl Session {
    /// Score the draft against the active challenge and lock the session.
    ///
    /// Exact equality after normalization, nothing fuzzier. The transition
    /// to answered is terminal; the result message appended here is the
    /// last transcript mutation this session will accept.
    pub fn submit_answer(&mut self, draft: &str) -> Result<AnswerOutcome, String> {
        let trimmed = draft.trim();
        if trimmed.is_empty() {
            return Err("Answer cannot be empty".to_string());
        }
        if self.answered {
            return Err("Session is already answered".to_string());
        }
        let challenge = self
            .challenge
            .as_ref()
            .ok_or_else(|| "No active challenge".to_string())?;

        let correct = normalize(trimmed) == normalize(&challenge.correct_answer);
        let correct_answer = challenge.correct_answer.clone();
        let challenge_id = challenge.id.clone();

        self.answered = true;

        let text = if correct {
            format!("Correct! The answer is \"{}\". Well done!", correct_answer)
        } else {
            format!("Incorrect. The correct answer was \"{}\".", correct_answer)
        };
        let message = Message::new(MessageRole::Vlm, text);
        self.messages.push(message.clone());

        Ok(AnswerOutcome {
            correct,
            correct_answer,
            challenge_id,
            message,
            trace: self.trace.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::{test_challenge, Session};
    use super::normalize;

    #[test]
    fn normalization_is_case_insensitive_and_trims() {
        assert_eq!(normalize("  a "), normalize("A"));
        assert_eq!(normalize("Red"), "red");
    }

    #[test]
    fn correct_answer_matches_after_normalization() {
        let mut session = Session::new(Some(test_challenge()));
        let outcome = session.submit_answer("  RED ").unwrap();

        assert!(outcome.correct);
        assert_eq!(outcome.correct_answer, "Red");
        assert!(session.is_answered());
    }

    #[test]
    fn wrong_answer_still_locks_the_session() {
        let mut session = Session::new(Some(test_challenge()));
        let outcome = session.submit_answer("blue").unwrap();

        assert!(!outcome.correct);
        assert!(session.is_answered());
        assert!(outcome.message.text.contains("Red"));
    }

    #[test]
    fn result_message_is_appended_to_transcript() {
        let mut session = Session::new(Some(test_challenge()));
        session.submit_answer("red").unwrap();

        let last = session.transcript().last().unwrap();
        assert!(last.text.contains("Correct"));
    }

    #[test]
    fn second_submission_is_rejected_without_state_change() {
        let mut session = Session::new(Some(test_challenge()));
        session.submit_answer("red").unwrap();

        let before = session.transcript().len();
        assert!(session.submit_answer("blue").is_err());
        assert_eq!(session.transcript().len(), before);
        assert!(session.is_answered());
    }

    #[test]
    fn blank_draft_is_rejected() {
        let mut session = Session::new(Some(test_challenge()));
        assert!(session.submit_answer("   ").is_err());
        assert!(!session.is_answered());
    }

    #[test]
    fn submission_without_challenge_is_rejected() {
        let mut session = Session::new(None);
        assert!(session.submit_answer("red").is_err());
    }
}
