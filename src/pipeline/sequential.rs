//! Strictly sequential revision with progressive context carrying.
//!
//! Each sentence is revised against the *current* paragraph, which already
//! reflects every earlier revision in the round. Later sentences are
//! therefore judged against already-improved text, which is valuable for
//! style consistency but forces one-at-a-time execution within a round.

use crate::config::PersonaConfig;
use crate::pipeline::progress::{emit, ProgressEvent, ProgressSender};
use crate::pipeline::{Direction, RoundReport};
use crate::remote::Revisor;
use crate::segment::segment;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info};

pub struct SequentialRevisionPipeline {
    revisor: Arc<dyn Revisor>,
    events: ProgressSender,
}

impl SequentialRevisionPipeline {
    pub fn new(revisor: Arc<dyn Revisor>, events: ProgressSender) -> Self {
        Self { revisor, events }
    }

    /// One initial pass plus `rounds` reprocessing passes. Round 0 uses the
    /// initial persona, every later round the reprocessing persona. The
    /// paragraph is re-segmented at the start of each round, so sentence
    /// indices are only meaningful within their round.
    pub async fn run(
        &self,
        paragraph: &str,
        direction: Direction,
        rounds: usize,
        personas: &PersonaConfig,
        deadline: Instant,
    ) -> Vec<RoundReport> {
        let mut current_paragraph = paragraph.to_string();
        let mut reports = Vec::with_capacity(rounds + 1);

        for round in 0..=rounds {
            let persona = if round == 0 {
                &personas.initial
            } else {
                &personas.reprocessing
            };

            let mut sentences = segment(&current_paragraph);
            info!(
                "Round {}: {} sentences, visiting {}",
                round,
                sentences.len(),
                direction
            );
            emit(
                &self.events,
                ProgressEvent::RoundStarted {
                    round,
                    sentences: sentences.len(),
                    persona: persona.clone(),
                },
            );

            let order: Vec<usize> = match direction {
                Direction::FirstToLast => (0..sentences.len()).collect(),
                Direction::LastToFirst => (0..sentences.len()).rev().collect(),
            };

            let mut outcomes = Vec::with_capacity(sentences.len());
            for i in order {
                let target = sentences[i].clone();
                let outcome = self
                    .revisor
                    .revise_sentence(i, round, &target, &current_paragraph, persona, deadline)
                    .await;

                if !outcome.success {
                    emit(
                        &self.events,
                        ProgressEvent::SentenceFailed {
                            index: i,
                            round,
                            error: outcome.error.clone().unwrap_or_default(),
                        },
                    );
                } else if let Some(improved) = outcome
                    .improved_sentence
                    .as_deref()
                    .filter(|s| !s.is_empty())
                {
                    // First textual occurrence. If the sentence's exact text
                    // recurs earlier in the paragraph, the earlier occurrence
                    // is the one rewritten; known ambiguity, kept as-is.
                    current_paragraph = current_paragraph.replacen(&target, improved, 1);
                    sentences[i] = improved.to_string();
                    debug!("Sentence {} revised; context updated for the rest of the round", i + 1);
                    emit(&self.events, ProgressEvent::SentenceRevised { index: i, round });
                } else {
                    debug!("No improvement for sentence {}; original kept as context", i + 1);
                    emit(
                        &self.events,
                        ProgressEvent::SentenceUnchanged { index: i, round },
                    );
                }

                outcomes.push(outcome);
            }

            outcomes.sort_by_key(|o| o.index);

            let report = RoundReport {
                round,
                outcomes,
                paragraph: current_paragraph.clone(),
            };
            emit(
                &self.events,
                ProgressEvent::RoundCompleted {
                    round,
                    successes: report.successes(),
                    failures: report.failures(),
                },
            );
            reports.push(report);
        }

        reports
    }
}
