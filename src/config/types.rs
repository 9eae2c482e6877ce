use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::*;

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub poll: PollConfig,

    /// Bounded retries while waiting for a chat message to expose a result
    /// handle (stage A of result retrieval).
    #[serde(default = "default_handle_retry")]
    pub handle_retry: RetryConfig,

    /// Bounded retries on transport failure while fetching the full result
    /// payload (stage B).
    #[serde(default = "default_result_retry")]
    pub result_retry: RetryConfig,

    /// Max concurrent in-flight revisions in parallel dispatch.
    #[serde(default = "default_worker_cap")]
    pub worker_cap: usize,

    /// Delay between worker launches to avoid bursting the remote service.
    #[serde(default = "default_launch_delay_ms")]
    pub launch_delay_ms: u64,

    /// Hard per-request deadline threaded through every blocking remote call.
    #[serde(default = "default_deadline_sec")]
    pub deadline_sec: u64,

    #[serde(default)]
    pub personas: PersonaConfig,

    #[serde(default)]
    pub budget: BudgetConfig,

    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Template for the human-facing session URL; `{id}` is replaced with
    /// the remote session id.
    #[serde(default = "default_session_url_template")]
    pub session_url_template: String,

    #[serde(default = "default_client_id")]
    pub client_id: String,

    #[serde(default = "default_data_source")]
    pub data_source: String,

    /// Directive prefix of the fixed message grammar sent with each request.
    #[serde(default = "default_directive")]
    pub directive: String,

    /// Per-HTTP-call timeout on the underlying client.
    #[serde(default = "default_request_timeout_sec")]
    pub request_timeout_sec: u64,

    /// Remote-side cap on concurrent sessions; worker_cap is clamped to it.
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct PollConfig {
    /// Wait before poll attempt k (1-indexed) is `backoff_ms[min(k-1, last)]`.
    /// Long first, shortening toward a floor held indefinitely.
    #[serde(default = "default_poll_backoff_ms")]
    pub backoff_ms: Vec<u64>,

    /// Emit a still-waiting progress line every N status checks.
    #[serde(default = "default_poll_log_every")]
    pub log_every: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct RetryConfig {
    pub max_attempts: u32,

    /// Shortening wait schedule, clamped to its final value once exhausted.
    pub backoff_ms: Vec<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct PersonaConfig {
    /// Persona for the first pass over the paragraph.
    #[serde(default = "default_persona")]
    pub initial: String,

    /// Persona for every pass after the first.
    #[serde(default = "default_persona")]
    pub reprocessing: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct BudgetConfig {
    /// Wall-clock ceiling for the whole request. None disables the guard.
    #[serde(default)]
    pub ceiling_sec: Option<u64>,

    /// Empirically observed cost of one sequential sentence round-trip.
    #[serde(default = "default_sentence_cost_sec")]
    pub sentence_cost_sec: u64,

    /// What to do when the sentence set cannot fit the ceiling sequentially.
    #[serde(default)]
    pub overflow: OverflowMode,
}

/// Caller-chosen response to a budget overflow: shrink the work or trade
/// context fidelity for throughput.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OverflowMode {
    #[default]
    Truncate,
    Parallel,
}

impl std::fmt::Display for OverflowMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverflowMode::Truncate => write!(f, "truncate"),
            OverflowMode::Parallel => write!(f, "parallel"),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            session_url_template: default_session_url_template(),
            client_id: default_client_id(),
            data_source: default_data_source(),
            directive: default_directive(),
            request_timeout_sec: default_request_timeout_sec(),
            concurrency_limit: default_concurrency_limit(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            backoff_ms: default_poll_backoff_ms(),
            log_every: default_poll_log_every(),
        }
    }
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            initial: default_persona(),
            reprocessing: default_persona(),
        }
    }
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            ceiling_sec: None,
            sentence_cost_sec: default_sentence_cost_sec(),
            overflow: OverflowMode::default(),
        }
    }
}
