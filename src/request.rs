//! Caller-facing revision request and pre-flight validation.
//!
//! Validation failures are rejected with the offending field named before
//! any remote call is made.

use crate::config::PersonaConfig;
use crate::error::ValidationError;
use crate::pipeline::Direction;
use serde::Deserialize;

/// How sentences are routed through the remote client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Dispatch {
    /// One sentence at a time, each revision feeding the next one's context.
    #[default]
    Sequential,
    /// All sentences concurrently against the fixed original paragraph.
    Parallel,
}

impl std::fmt::Display for Dispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dispatch::Sequential => write!(f, "sequential"),
            Dispatch::Parallel => write!(f, "parallel"),
        }
    }
}

/// Raw request as supplied by the caller (CLI flags or a JSON document).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevisionRequest {
    #[serde(default)]
    pub paragraph: String,

    #[serde(default)]
    pub direction: Option<String>,

    #[serde(default)]
    pub rounds: Option<u32>,

    #[serde(default)]
    pub initial_persona: Option<String>,

    #[serde(default)]
    pub reprocessing_persona: Option<String>,

    #[serde(default)]
    pub worker_cap: Option<usize>,
}

/// A request that passed pre-flight validation.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub paragraph: String,
    pub direction: Direction,
    pub rounds: usize,
    pub initial_persona: Option<String>,
    pub reprocessing_persona: Option<String>,
    pub worker_cap: Option<usize>,
}

impl RevisionRequest {
    pub fn validate(&self, dispatch: Dispatch) -> Result<ValidatedRequest, ValidationError> {
        let paragraph = self.paragraph.trim();
        if paragraph.is_empty() {
            return Err(ValidationError::MissingField("paragraph"));
        }

        let direction = match self.direction.as_deref() {
            None => Direction::default(),
            Some(s) => s
                .parse::<Direction>()
                .map_err(|_| ValidationError::InvalidDirection(s.to_string()))?,
        };

        let rounds = self.rounds.unwrap_or(0);
        if rounds > 1 {
            return Err(ValidationError::RoundsOutOfRange(rounds));
        }
        if dispatch == Dispatch::Parallel && rounds > 0 {
            return Err(ValidationError::RoundsWithParallelDispatch);
        }

        if self.worker_cap == Some(0) {
            return Err(ValidationError::ZeroWorkerCap);
        }

        Ok(ValidatedRequest {
            paragraph: paragraph.to_string(),
            direction,
            rounds: rounds as usize,
            initial_persona: self.initial_persona.clone(),
            reprocessing_persona: self.reprocessing_persona.clone(),
            worker_cap: self.worker_cap,
        })
    }
}

impl ValidatedRequest {
    /// Request-level persona overrides merged over the configured defaults.
    pub fn personas(&self, defaults: &PersonaConfig) -> PersonaConfig {
        PersonaConfig {
            initial: self
                .initial_persona
                .clone()
                .unwrap_or_else(|| defaults.initial.clone()),
            reprocessing: self
                .reprocessing_persona
                .clone()
                .unwrap_or_else(|| defaults.reprocessing.clone()),
        }
    }
}
