use super::Session;
use crate::types::*;

const GREETING: &str = "Hello! I can see an image that you cannot. \
Ask me questions about what I see to help you answer the challenge question.";

pub(super) fn greeting_message() -> Message {
    Message::new(MessageRole::Vlm, GREETING)
}

impl Session {
    /// Replace the active challenge and reset the whole session: greeting
    /// transcript, zeroed counters, cleared trace, unanswered. Bumping the
    /// epoch drops any reply still in flight for the old challenge.
    pub fn select_challenge(&mut self, challenge: Challenge) -> Vec<Message> {
        self.challenge = Some(challenge);
        self.messages = vec![greeting_message()];
        self.questions_asked = 0;
        self.hints_used = 0;
        self.answered = false;
        self.trace.clear();
        self.epoch += 1;

        self.messages.clone()
    }
}
