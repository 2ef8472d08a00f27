use super::Session;
use crate::types::*;

impl Session {
    /// Emit the next unused hint as a VLM message.
    ///
    /// Hints are consumed strictly in order, never repeated, never skipped.
    /// Rejected once the ladder is exhausted or the session is answered.
    pub fn use_hint(&mut self) -> Result<Message, String> {
        if self.answered {
            return Err("Session is already answered".to_string());
        }
        let challenge = self
            .challenge
            .as_ref()
            .ok_or_else(|| "No active challenge".to_string())?;
        let hint = challenge
            .hints
            .get(self.hints_used)
            .ok_or_else(|| "No hints remaining".to_string())?;

        let message = Message::new(MessageRole::Vlm, format!("Hint: {}", hint));
        self.messages.push(message.clone());
        self.hints_used += 1;

        Ok(message)
    }
}
