//! WebSocket message dispatch
//!
//! Handlers take the per-connection session plus the shared state and return
//! an optional direct response. Replies that arrive later (the delayed VLM
//! answer) go through the connection's outbound channel instead.

use crate::protocol::{ChallengeInfo, ClientMessage, ServerMessage};
use crate::responder::ReplyRequest;
use crate::state::{AppState, ReplyTicket, Session};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;

/// Shown when every reply provider fails; the session still gets an answer
const ANALYZING_PLACEHOLDER: &str = "I am analyzing the image and question...";

/// Handle a client message and return the optional direct response
pub async fn handle_message(
    msg: ClientMessage,
    session: &Arc<Mutex<Session>>,
    state: &Arc<AppState>,
    outbound: &UnboundedSender<ServerMessage>,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::SendMessage { text } => {
            handle_send_message(session, state, outbound, text).await
        }
        ClientMessage::SubmitAnswer { answer } => {
            handle_submit_answer(session, state, answer).await
        }
        ClientMessage::UseHint => handle_use_hint(session).await,
        ClientMessage::SelectChallenge { challenge_id } => {
            handle_select_challenge(session, state, challenge_id).await
        }
    }
}

async fn handle_send_message(
    session: &Arc<Mutex<Session>>,
    state: &Arc<AppState>,
    outbound: &UnboundedSender<ServerMessage>,
    text: String,
) -> Option<ServerMessage> {
    let (receipt, request) = {
        let mut session = session.lock().await;
        let receipt = match session.send_message(&text) {
            Ok(receipt) => receipt,
            Err(reason) => {
                // Invalid input is ignored, not surfaced (blank text,
                // answered session, missing challenge)
                tracing::debug!("Ignoring message: {}", reason);
                return None;
            }
        };

        // send_message only succeeds with an active challenge
        let challenge = session.active_challenge()?;
        let request = ReplyRequest {
            question: receipt.ticket.question.clone(),
            challenge_id: challenge.id.clone(),
            scene: challenge.scene_text().to_string(),
        };

        (receipt, request)
    };

    schedule_reply(
        state.clone(),
        session.clone(),
        outbound.clone(),
        receipt.ticket,
        request,
    );

    Some(ServerMessage::MessageAppended {
        message: receipt.message,
    })
}

/// Spawn the simulated "thinking" delay, then generate and land the reply.
/// The ticket lets the session drop the reply if the challenge changed or
/// the answer came in while we slept.
fn schedule_reply(
    state: Arc<AppState>,
    session: Arc<Mutex<Session>>,
    outbound: UnboundedSender<ServerMessage>,
    ticket: ReplyTicket,
    request: ReplyRequest,
) {
    let min = state.session_config.reply_delay_min_ms;
    let max = state.session_config.reply_delay_max_ms;

    tokio::spawn(async move {
        let delay_ms = rand::rng().random_range(min..=max);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;

        let text = match state.responder.generate(request).await {
            Ok(response) => response.text,
            Err(e) => {
                tracing::warn!("All reply providers failed: {}", e);
                ANALYZING_PLACEHOLDER.to_string()
            }
        };

        match session.lock().await.accept_reply(&ticket, text) {
            Some(message) => {
                // Send error means the connection is gone; nothing to do
                let _ = outbound.send(ServerMessage::MessageAppended { message });
            }
            None => tracing::debug!("Dropping stale reply"),
        }
    });
}

async fn handle_use_hint(session: &Arc<Mutex<Session>>) -> Option<ServerMessage> {
    let mut session = session.lock().await;
    match session.use_hint() {
        Ok(message) => Some(ServerMessage::MessageAppended { message }),
        Err(reason) => {
            tracing::debug!("Ignoring hint request: {}", reason);
            None
        }
    }
}

async fn handle_submit_answer(
    session: &Arc<Mutex<Session>>,
    state: &Arc<AppState>,
    answer: String,
) -> Option<ServerMessage> {
    let (outcome, questions_asked) = {
        let mut session = session.lock().await;
        match session.submit_answer(&answer) {
            Ok(outcome) => {
                let questions_asked = session.questions_asked();
                (outcome, questions_asked)
            }
            Err(reason) => {
                tracing::debug!("Ignoring submission: {}", reason);
                return None;
            }
        }
    };

    tracing::info!(
        "Challenge {} answered ({}) after {} questions",
        outcome.challenge_id,
        if outcome.correct { "correct" } else { "incorrect" },
        questions_asked
    );

    state
        .trace
        .save_detached(outcome.challenge_id.clone(), outcome.trace.clone());

    Some(ServerMessage::AnswerResult {
        correct: outcome.correct,
        correct_answer: outcome.correct_answer,
        questions_asked,
        message: outcome.message,
    })
}

async fn handle_select_challenge(
    session: &Arc<Mutex<Session>>,
    state: &Arc<AppState>,
    challenge_id: String,
) -> Option<ServerMessage> {
    let challenge = match state.challenge_by_id(&challenge_id) {
        Some(challenge) => challenge.clone(),
        None => {
            return Some(ServerMessage::Error {
                code: "CHALLENGE_NOT_FOUND".to_string(),
                msg: format!("No challenge with id {}", challenge_id),
            });
        }
    };

    tracing::info!("Switching session to challenge {}", challenge_id);

    let info = ChallengeInfo::from(&challenge);
    let transcript = session.lock().await.select_challenge(challenge);

    Some(ServerMessage::ChallengeSelected {
        challenge: info,
        transcript,
    })
}
