pub mod budget;
mod parallel;
pub mod progress;
mod sequential;

pub use parallel::ParallelDispatchPipeline;
pub use sequential::SequentialRevisionPipeline;

use crate::pipeline::budget::TruncationNotice;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Visitation order within a sequential round. Determines which sentence's
/// revision becomes visible context for the sentences processed after it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    FirstToLast,
    LastToFirst,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::FirstToLast => write!(f, "first-to-last"),
            Direction::LastToFirst => write!(f, "last-to-first"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first-to-last" => Ok(Direction::FirstToLast),
            "last-to-first" => Ok(Direction::LastToFirst),
            _ => Err(format!("Unknown direction: {}", s)),
        }
    }
}

/// Per-(sentence, round) record. Produced exactly once, immutable after.
#[derive(Debug, Clone, Serialize)]
pub struct SentenceOutcome {
    pub index: usize,

    pub sentence: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub improved_sentence: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_url: Option<String>,

    pub round: usize,

    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub duration_sec: f64,
}

impl SentenceOutcome {
    /// A failed outcome carrying the failure detail. One bad sentence never
    /// aborts the paragraph; it is reported and the run continues.
    pub fn failed(
        index: usize,
        round: usize,
        sentence: &str,
        error: String,
        duration: Duration,
    ) -> Self {
        Self {
            index,
            sentence: sentence.to_string(),
            improved_sentence: None,
            session_id: None,
            session_url: None,
            round,
            success: false,
            error: Some(error),
            duration_sec: duration.as_secs_f64(),
        }
    }

    /// Whether a usable replacement sentence was produced.
    pub fn has_revision(&self) -> bool {
        self.success
            && self
                .improved_sentence
                .as_deref()
                .is_some_and(|s| !s.is_empty())
    }
}

/// One full pass over the paragraph: outcomes in ascending index order plus
/// the paragraph state after the round's mutations.
#[derive(Debug, Clone, Serialize)]
pub struct RoundReport {
    pub round: usize,
    pub outcomes: Vec<SentenceOutcome>,
    pub paragraph: String,
}

impl RoundReport {
    pub fn successes(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }
}

/// Aggregate report for a whole request.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub request_id: String,
    pub original_paragraph: String,
    pub final_paragraph: String,
    pub rounds: Vec<RoundReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncation: Option<TruncationNotice>,
    pub duration_sec: f64,
}

impl RunReport {
    /// Outcomes of the last round; the caller-facing sentence results.
    pub fn final_outcomes(&self) -> &[SentenceOutcome] {
        self.rounds.last().map(|r| r.outcomes.as_slice()).unwrap_or(&[])
    }

    pub fn paragraph_updated(&self) -> bool {
        self.final_paragraph != self.original_paragraph
    }

    /// Session URLs of successful outcomes across all rounds, in order.
    pub fn session_urls(&self) -> Vec<String> {
        self.rounds
            .iter()
            .flat_map(|r| r.outcomes.iter())
            .filter(|o| o.success)
            .filter_map(|o| o.session_url.clone())
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::SentenceOutcome;
    use crate::remote::Revisor;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    /// Scripted stand-in for the remote client. Each call consumes the next
    /// step; the script wraps around when exhausted.
    pub struct ScriptedRevisor {
        pub script: Vec<Step>,
        next: AtomicUsize,
        /// Per-call artificial latency, for exercising completion order.
        pub delays_ms: Vec<u64>,
        /// (index, round, paragraph, persona) per call, in call order.
        pub seen: std::sync::Mutex<Vec<(usize, usize, String, String)>>,
    }

    #[derive(Clone)]
    pub enum Step {
        Revise(String),
        NoImprovement,
        Fail(String),
    }

    impl ScriptedRevisor {
        pub fn new(script: Vec<Step>) -> Self {
            Self {
                script,
                next: AtomicUsize::new(0),
                delays_ms: Vec::new(),
                seen: std::sync::Mutex::new(Vec::new()),
            }
        }

        pub fn always(step: Step) -> Self {
            Self::new(vec![step])
        }

        pub fn with_delays(mut self, delays_ms: Vec<u64>) -> Self {
            self.delays_ms = delays_ms;
            self
        }

        pub fn calls(&self) -> usize {
            self.next.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Revisor for ScriptedRevisor {
        async fn revise_sentence(
            &self,
            index: usize,
            round: usize,
            sentence: &str,
            paragraph: &str,
            persona: &str,
            _deadline: Instant,
        ) -> SentenceOutcome {
            let n = self.next.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push((
                index,
                round,
                paragraph.to_string(),
                persona.to_string(),
            ));
            if !self.delays_ms.is_empty() {
                let delay = self.delays_ms[index % self.delays_ms.len()];
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            let step = self.script[n % self.script.len()].clone();
            match step {
                Step::Revise(improved) => SentenceOutcome {
                    index,
                    sentence: sentence.to_string(),
                    improved_sentence: Some(improved),
                    session_id: Some(format!("session-{}", n)),
                    session_url: Some(format!("https://example.test/?session_id=session-{}", n)),
                    round,
                    success: true,
                    error: None,
                    duration_sec: 0.0,
                },
                Step::NoImprovement => SentenceOutcome {
                    index,
                    sentence: sentence.to_string(),
                    improved_sentence: None,
                    session_id: Some(format!("session-{}", n)),
                    session_url: Some(format!("https://example.test/?session_id=session-{}", n)),
                    round,
                    success: true,
                    error: None,
                    duration_sec: 0.0,
                },
                Step::Fail(error) => {
                    SentenceOutcome::failed(index, round, sentence, error, Duration::ZERO)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_round_trips_through_strings() {
        assert_eq!(
            "first-to-last".parse::<Direction>().unwrap(),
            Direction::FirstToLast
        );
        assert_eq!(
            "last-to-first".parse::<Direction>().unwrap(),
            Direction::LastToFirst
        );
        assert!("backwards".parse::<Direction>().is_err());
        assert_eq!(Direction::LastToFirst.to_string(), "last-to-first");
    }

    #[test]
    fn has_revision_requires_success_and_non_empty_text() {
        let mut outcome = SentenceOutcome::failed(
            0,
            0,
            "original.",
            "boom".to_string(),
            Duration::ZERO,
        );
        assert!(!outcome.has_revision());

        outcome.success = true;
        assert!(!outcome.has_revision());

        outcome.improved_sentence = Some(String::new());
        assert!(!outcome.has_revision());

        outcome.improved_sentence = Some("better.".to_string());
        assert!(outcome.has_revision());
    }
}
