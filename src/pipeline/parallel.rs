//! Concurrency-bounded parallel fan-out.
//!
//! Every sentence is dispatched against the fixed original paragraph:
//! concurrent workers cannot observe each other's in-flight revisions, so
//! context propagation is traded for throughput. A semaphore bounds the
//! number of in-flight revisions and a small launch delay smooths
//! submission to avoid bursting the remote service.

use crate::error::PipelineError;
use crate::pipeline::progress::{emit, ProgressEvent, ProgressSender};
use crate::pipeline::SentenceOutcome;
use crate::remote::Revisor;
use crate::segment::segment;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

pub struct ParallelDispatchPipeline {
    revisor: Arc<dyn Revisor>,
    events: ProgressSender,
    worker_cap: usize,
    service_limit: usize,
    launch_delay: Duration,
}

impl ParallelDispatchPipeline {
    pub fn new(
        revisor: Arc<dyn Revisor>,
        events: ProgressSender,
        worker_cap: usize,
        service_limit: usize,
        launch_delay: Duration,
    ) -> Self {
        Self {
            revisor,
            events,
            worker_cap,
            service_limit,
            launch_delay,
        }
    }

    /// Effective concurrency: `[1, min(sentence_count, service_limit)]`.
    fn clamped_workers(&self, sentence_count: usize) -> usize {
        let upper = self.service_limit.min(sentence_count).max(1);
        self.worker_cap.clamp(1, upper)
    }

    /// Segment once, fan out, re-sort to ascending sentence index.
    /// Completion order is unconstrained and irrelevant to the caller.
    pub async fn run(
        &self,
        paragraph: &str,
        persona: &str,
        deadline: Instant,
    ) -> Result<Vec<SentenceOutcome>, PipelineError> {
        let sentences = segment(paragraph);
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let workers = self.clamped_workers(sentences.len());
        info!(
            "Dispatching {} sentences with {} workers",
            sentences.len(),
            workers
        );
        emit(
            &self.events,
            ProgressEvent::RoundStarted {
                round: 0,
                sentences: sentences.len(),
                persona: persona.to_string(),
            },
        );

        let semaphore = Arc::new(Semaphore::new(workers));
        let context: Arc<str> = Arc::from(paragraph);
        let persona: Arc<str> = Arc::from(persona);

        let mut futures = FuturesUnordered::new();
        for (index, sentence) in sentences.into_iter().enumerate() {
            // Submission smoothing between launches.
            if index > 0 && self.launch_delay > Duration::ZERO {
                sleep(self.launch_delay).await;
            }

            let permit = semaphore.clone().acquire_owned().await?;
            let revisor = self.revisor.clone();
            let context = context.clone();
            let persona = persona.clone();
            let task_sentence = sentence.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit; // hold until done
                revisor
                    .revise_sentence(index, 0, &task_sentence, &context, &persona, deadline)
                    .await
            });

            futures.push(async move { (index, sentence, handle.await) });
        }

        let mut outcomes = Vec::new();
        while let Some((index, sentence, joined)) = futures.next().await {
            match joined {
                Ok(outcome) => {
                    if outcome.success {
                        if outcome.has_revision() {
                            emit(&self.events, ProgressEvent::SentenceRevised { index, round: 0 });
                        } else {
                            emit(
                                &self.events,
                                ProgressEvent::SentenceUnchanged { index, round: 0 },
                            );
                        }
                    } else {
                        emit(
                            &self.events,
                            ProgressEvent::SentenceFailed {
                                index,
                                round: 0,
                                error: outcome.error.clone().unwrap_or_default(),
                            },
                        );
                    }
                    outcomes.push(outcome);
                }
                Err(e) => {
                    // One outcome per sentence, even when the worker dies.
                    warn!("Worker for sentence {} panicked: {}", index + 1, e);
                    emit(
                        &self.events,
                        ProgressEvent::SentenceFailed {
                            index,
                            round: 0,
                            error: e.to_string(),
                        },
                    );
                    outcomes.push(SentenceOutcome::failed(
                        index,
                        0,
                        &sentence,
                        e.to_string(),
                        Duration::ZERO,
                    ));
                }
            }
        }

        outcomes.sort_by_key(|o| o.index);

        emit(
            &self.events,
            ProgressEvent::RoundCompleted {
                round: 0,
                successes: outcomes.iter().filter(|o| o.success).count(),
                failures: outcomes.iter().filter(|o| !o.success).count(),
            },
        );

        Ok(outcomes)
    }
}
