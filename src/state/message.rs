use super::Session;
use crate::types::*;

/// Handed out by [`Session::send_message`]; a scheduled reply must present
/// it back so stale replies (older epoch, or landing after the answer) can
/// be dropped instead of appended.
#[derive(Debug, Clone)]
pub struct ReplyTicket {
    pub(super) epoch: u64,
    pub question: String,
}

/// Result of accepting a user message.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    pub message: Message,
    pub ticket: ReplyTicket,
}

impl Session {
    /// Append a user message and hand out a reply ticket.
    ///
    /// Rejects blank text, a missing challenge, and any call after the
    /// session is answered. Callers treat a rejection as a silent no-op.
    pub fn send_message(&mut self, text: &str) -> Result<SendReceipt, String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err("Message text cannot be empty".to_string());
        }
        if self.answered {
            return Err("Session is already answered".to_string());
        }
        if self.challenge.is_none() {
            return Err("No active challenge".to_string());
        }

        let message = Message::new(MessageRole::User, trimmed);
        self.messages.push(message.clone());
        self.questions_asked += 1;

        Ok(SendReceipt {
            message,
            ticket: ReplyTicket {
                epoch: self.epoch,
                question: trimmed.to_string(),
            },
        })
    }

    /// Land a generated reply. Returns the appended message, or `None` when
    /// the ticket went stale: the challenge changed underneath it or the
    /// session was answered while the reply was in flight.
    pub fn accept_reply(&mut self, ticket: &ReplyTicket, text: String) -> Option<Message> {
        if ticket.epoch != self.epoch || self.answered {
            return None;
        }

        let message = Message::new(MessageRole::Vlm, text.clone());
        self.messages.push(message.clone());
        self.trace.push(TraceEntry {
            question: ticket.question.clone(),
            vlm_answer: text,
        });

        Some(message)
    }
}
