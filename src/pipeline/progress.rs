//! Typed progress events.
//!
//! The original transport for progress was log lines collected into the
//! response. Here the pipeline and the remote client emit typed events on
//! an mpsc channel; the CLI layer decides how to display them and renders
//! the response's human-readable progress log from the same stream.

use serde::Serialize;
use tokio::sync::mpsc;

pub type ProgressSender = mpsc::UnboundedSender<ProgressEvent>;
pub type ProgressReceiver = mpsc::UnboundedReceiver<ProgressEvent>;

pub fn channel() -> (ProgressSender, ProgressReceiver) {
    mpsc::unbounded_channel()
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    RunStarted {
        request_id: String,
        total_sentences: usize,
    },
    RoundStarted {
        round: usize,
        sentences: usize,
        persona: String,
    },
    SessionCreated {
        index: usize,
        round: usize,
        session_id: String,
    },
    RequestSubmitted {
        index: usize,
        session_id: String,
    },
    PollTick {
        session_id: String,
        checks: u32,
        status: String,
    },
    SentenceRevised {
        index: usize,
        round: usize,
    },
    SentenceUnchanged {
        index: usize,
        round: usize,
    },
    SentenceFailed {
        index: usize,
        round: usize,
        error: String,
    },
    Truncated {
        kept: usize,
        dropped: usize,
    },
    RoundCompleted {
        round: usize,
        successes: usize,
        failures: usize,
    },
}

impl std::fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressEvent::RunStarted {
                request_id,
                total_sentences,
            } => write!(
                f,
                "Starting request {} with {} sentences",
                request_id, total_sentences
            ),
            ProgressEvent::RoundStarted {
                round,
                sentences,
                persona,
            } => write!(
                f,
                "Round {}: processing {} sentences as {}",
                round, sentences, persona
            ),
            ProgressEvent::SessionCreated {
                index,
                round,
                session_id,
            } => write!(
                f,
                "Sentence {} (round {}): created session {}",
                index + 1,
                round,
                session_id
            ),
            ProgressEvent::RequestSubmitted { index, session_id } => write!(
                f,
                "Sentence {}: request submitted to session {}",
                index + 1,
                session_id
            ),
            ProgressEvent::PollTick {
                session_id,
                checks,
                status,
            } => write!(
                f,
                "Still waiting on session {} (status {}, {} checks)",
                session_id, status, checks
            ),
            ProgressEvent::SentenceRevised { index, round } => {
                write!(f, "Sentence {} (round {}): revised", index + 1, round)
            }
            ProgressEvent::SentenceUnchanged { index, round } => write!(
                f,
                "Sentence {} (round {}): no improvement, keeping original",
                index + 1,
                round
            ),
            ProgressEvent::SentenceFailed {
                index,
                round,
                error,
            } => write!(
                f,
                "Sentence {} (round {}): failed: {}",
                index + 1,
                round,
                error
            ),
            ProgressEvent::Truncated { kept, dropped } => write!(
                f,
                "Budget ceiling reached: processing first {} sentences, dropping {}",
                kept, dropped
            ),
            ProgressEvent::RoundCompleted {
                round,
                successes,
                failures,
            } => write!(
                f,
                "Round {} completed: {} succeeded, {} failed",
                round, successes, failures
            ),
        }
    }
}

/// Send an event, ignoring a dropped receiver. Progress is best-effort;
/// a consumer that went away must not fail the pipeline.
pub fn emit(tx: &ProgressSender, event: ProgressEvent) {
    let _ = tx.send(event);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_render_one_line_summaries() {
        let event = ProgressEvent::SentenceRevised { index: 0, round: 0 };
        assert_eq!(event.to_string(), "Sentence 1 (round 0): revised");

        let event = ProgressEvent::Truncated { kept: 3, dropped: 2 };
        assert!(event.to_string().contains("first 3 sentences"));
    }

    #[test]
    fn emit_ignores_closed_receiver() {
        let (tx, rx) = channel();
        drop(rx);
        emit(&tx, ProgressEvent::SentenceUnchanged { index: 1, round: 0 });
    }

    #[test]
    fn events_serialize_with_tag() {
        let event = ProgressEvent::PollTick {
            session_id: "s1".into(),
            checks: 5,
            status: "active".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "poll_tick");
        assert_eq!(json["checks"], 5);
    }
}
