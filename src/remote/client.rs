//! HTTP client for the remote analysis service.
//!
//! Owns the full protocol for one sentence revision: session creation,
//! request submission, poll-to-idle with the shortening backoff schedule,
//! and the two-stage result retrieval. Every blocking call is raced
//! against the request deadline so an unresponsive service produces a
//! `Timeout`-style outcome instead of an indefinite hang.

use crate::config::Config;
use crate::error::{ConfigError, RemoteError};
use crate::pipeline::progress::{emit, ProgressEvent, ProgressSender};
use crate::pipeline::SentenceOutcome;
use crate::remote::{backoff, protocol, RemoteSession, Revisor};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::{debug, info, warn};

pub struct RemoteTaskClient {
    http: reqwest::Client,
    config: Config,
    events: ProgressSender,
}

impl RemoteTaskClient {
    pub fn new(config: &Config, events: ProgressSender) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.service.request_timeout_sec))
            .build()?;

        Ok(Self {
            http,
            config: config.clone(),
            events,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.service.base_url, path)
    }

    /// Issue a session creation call. A non-success status or a body
    /// missing `id` is fatal for the sentence; there is no retry here.
    pub async fn create_session(&self, deadline: Instant) -> Result<RemoteSession, RemoteError> {
        let url = self.url("/api/v1/sessions/");
        let body = protocol::CreateSessionRequest {
            client_id: &self.config.service.client_id,
            data_source: &self.config.service.data_source,
        };

        let value = self.post_json(&url, &body, deadline).await?;
        let id = value
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| RemoteError::MalformedBody {
                url: url.clone(),
                detail: "missing 'id' field".to_string(),
            })?
            .to_string();

        debug!("Created session {}", id);
        Ok(RemoteSession { id })
    }

    /// Send one message encoding the sentence, the context paragraph and
    /// the persona, using the fixed message grammar. Not retried.
    pub async fn submit_request(
        &self,
        session: &RemoteSession,
        sentence: &str,
        paragraph: &str,
        persona: &str,
        deadline: Instant,
    ) -> Result<(), RemoteError> {
        let message = protocol::build_message(
            &self.config.service.directive,
            sentence,
            paragraph,
            persona,
        );
        let body = protocol::ChatRequest {
            session: &session.id,
            message: &message,
            use_live_cot: false,
        };

        self.post_json(&self.url("/api/v1/chats/"), &body, deadline)
            .await?;
        debug!("Submitted revision request to session {}", session.id);
        Ok(())
    }

    /// Poll session status until `idle`. The wait before poll attempt k
    /// (1-indexed) is `schedule[min(k - 1, last)]`; no attempt ceiling.
    /// A transport error or the deadline ends the wait.
    pub async fn await_idle(
        &self,
        session: &RemoteSession,
        deadline: Instant,
    ) -> Result<(), RemoteError> {
        let url = self.url(&format!("/api/v1/sessions/{}/", session.id));
        let mut checks: u32 = 0;

        loop {
            let delay = backoff::delay_for_attempt(&self.config.poll.backoff_ms, checks + 1);
            self.sleep_within(delay, deadline, &format!("polling session {}", session.id))
                .await?;

            let value = self.get_json(&url, deadline).await?;
            checks += 1;

            // Only "idle" and "active" are modeled; anything else counts
            // as still active.
            let status = value
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or("active");

            if status == "idle" {
                debug!("Session {} idle after {} checks", session.id, checks);
                return Ok(());
            }

            if checks % self.config.poll.log_every == 0 {
                info!(
                    "Still waiting on session {} (status {}, {} checks)",
                    session.id, status, checks
                );
                emit(
                    &self.events,
                    ProgressEvent::PollTick {
                        session_id: session.id.clone(),
                        checks,
                        status: status.to_string(),
                    },
                );
            }
        }
    }

    /// Two-stage result retrieval. Stage A polls recent messages for a
    /// result handle under a bounded retry budget; stage B fetches the
    /// payload, retrying transport failures only. Either budget running
    /// out degrades to `None`, never an error.
    pub async fn fetch_result(
        &self,
        session: &RemoteSession,
        deadline: Instant,
    ) -> Result<Option<Value>, RemoteError> {
        let chats_url = self.url(&format!("/api/v1/chats/?session_id={}", session.id));

        let mut result_id = None;
        for attempt in 1..=self.config.handle_retry.max_attempts {
            let value = self.get_json(&chats_url, deadline).await?;
            let list: protocol::ChatList =
                serde_json::from_value(value).unwrap_or_default();

            result_id = list.latest_result_id();
            if result_id.is_some() {
                break;
            }
            if attempt == self.config.handle_retry.max_attempts {
                break;
            }

            warn!(
                "No result handle yet for session {} ({}/{})",
                session.id, attempt, self.config.handle_retry.max_attempts
            );
            let delay = backoff::delay_for_attempt(&self.config.handle_retry.backoff_ms, attempt);
            self.sleep_within(
                delay,
                deadline,
                &format!("waiting for result handle of session {}", session.id),
            )
            .await?;
        }

        let Some(result_id) = result_id else {
            warn!(
                "Handle retry budget exhausted for session {}; no revision available",
                session.id
            );
            return Ok(None);
        };

        let result_url = self.url(&format!("/api/v1/results/{}/", result_id));
        for attempt in 1..=self.config.result_retry.max_attempts {
            match self.get_json(&result_url, deadline).await {
                Ok(value) => return Ok(Some(value)),
                Err(e @ RemoteError::DeadlineExceeded { .. }) => return Err(e),
                Err(e) => {
                    warn!(
                        "Result fetch attempt {}/{} failed: {}",
                        attempt, self.config.result_retry.max_attempts, e
                    );
                    if attempt == self.config.result_retry.max_attempts {
                        break;
                    }
                    let delay =
                        backoff::delay_for_attempt(&self.config.result_retry.backoff_ms, attempt);
                    self.sleep_within(
                        delay,
                        deadline,
                        &format!("retrying result fetch for {}", result_id),
                    )
                    .await?;
                }
            }
        }

        warn!("Result retry budget exhausted for {}", result_id);
        Ok(None)
    }

    async fn revise_inner(
        &self,
        index: usize,
        round: usize,
        sentence: &str,
        paragraph: &str,
        persona: &str,
        deadline: Instant,
    ) -> Result<(RemoteSession, Option<String>), RemoteError> {
        let session = self.create_session(deadline).await?;
        emit(
            &self.events,
            ProgressEvent::SessionCreated {
                index,
                round,
                session_id: session.id.clone(),
            },
        );

        self.submit_request(&session, sentence, paragraph, persona, deadline)
            .await?;
        emit(
            &self.events,
            ProgressEvent::RequestSubmitted {
                index,
                session_id: session.id.clone(),
            },
        );

        self.await_idle(&session, deadline).await?;

        let result = self.fetch_result(&session, deadline).await?;
        let improved = result.as_ref().and_then(protocol::extract_revision);
        Ok((session, improved))
    }

    async fn get_json(&self, url: &str, deadline: Instant) -> Result<Value, RemoteError> {
        let response = timeout_at(deadline, self.http.get(url).send())
            .await
            .map_err(|_| RemoteError::DeadlineExceeded {
                operation: format!("GET {}", url),
            })?
            .map_err(|e| RemoteError::Transport {
                url: url.to_string(),
                source: e,
            })?;

        Self::decode("GET", url, response, deadline).await
    }

    async fn post_json<B: Serialize>(
        &self,
        url: &str,
        body: &B,
        deadline: Instant,
    ) -> Result<Value, RemoteError> {
        let response = timeout_at(deadline, self.http.post(url).json(body).send())
            .await
            .map_err(|_| RemoteError::DeadlineExceeded {
                operation: format!("POST {}", url),
            })?
            .map_err(|e| RemoteError::Transport {
                url: url.to_string(),
                source: e,
            })?;

        Self::decode("POST", url, response, deadline).await
    }

    async fn decode(
        method: &'static str,
        url: &str,
        response: reqwest::Response,
        deadline: Instant,
    ) -> Result<Value, RemoteError> {
        let status = response.status();
        let body = timeout_at(deadline, response.text())
            .await
            .map_err(|_| RemoteError::DeadlineExceeded {
                operation: format!("reading body of {} {}", method, url),
            })?
            .map_err(|e| RemoteError::Transport {
                url: url.to_string(),
                source: e,
            })?;

        if !status.is_success() {
            return Err(RemoteError::Status {
                method,
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| RemoteError::MalformedBody {
            url: url.to_string(),
            detail: e.to_string(),
        })
    }

    async fn sleep_within(
        &self,
        delay: Duration,
        deadline: Instant,
        operation: &str,
    ) -> Result<(), RemoteError> {
        if Instant::now() + delay >= deadline {
            return Err(RemoteError::DeadlineExceeded {
                operation: operation.to_string(),
            });
        }
        sleep(delay).await;
        Ok(())
    }
}

#[async_trait]
impl Revisor for RemoteTaskClient {
    async fn revise_sentence(
        &self,
        index: usize,
        round: usize,
        sentence: &str,
        paragraph: &str,
        persona: &str,
        deadline: Instant,
    ) -> SentenceOutcome {
        let start = std::time::Instant::now();

        match self
            .revise_inner(index, round, sentence, paragraph, persona, deadline)
            .await
        {
            Ok((session, improved)) => SentenceOutcome {
                index,
                sentence: sentence.to_string(),
                improved_sentence: improved,
                session_id: Some(session.id.clone()),
                session_url: Some(self.config.session_url(&session.id)),
                round,
                success: true,
                error: None,
                duration_sec: start.elapsed().as_secs_f64(),
            },
            Err(e) => {
                warn!("Sentence {} failed: {}", index + 1, e);
                SentenceOutcome::failed(index, round, sentence, e.to_string(), start.elapsed())
            }
        }
    }
}
