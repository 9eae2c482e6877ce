pub mod backoff;
mod client;
pub mod protocol;

pub use client::RemoteTaskClient;

use crate::pipeline::SentenceOutcome;
use async_trait::async_trait;
use tokio::time::Instant;

/// One unit of remote asynchronous work. Created remotely, polled until
/// idle, never explicitly destroyed (the service garbage-collects it).
#[derive(Debug, Clone)]
pub struct RemoteSession {
    pub id: String,
}

/// Seam between the pipelines and the remote protocol, so dispatch logic
/// can be exercised against scripted stand-ins.
#[async_trait]
pub trait Revisor: Send + Sync {
    /// Drive one sentence through the remote service: create a session,
    /// submit the request, poll to idle, fetch and extract the revision.
    ///
    /// Never fails outright; every failure mode is folded into the
    /// returned outcome's `success`/`error` fields.
    async fn revise_sentence(
        &self,
        index: usize,
        round: usize,
        sentence: &str,
        paragraph: &str,
        persona: &str,
        deadline: Instant,
    ) -> SentenceOutcome;
}
