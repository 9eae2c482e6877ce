use std::path::PathBuf;
use thiserror::Error;

#[allow(dead_code)]
#[derive(Error, Debug)]
pub enum WriteaidError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Remote service error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Backoff schedule '{0}' must not be empty")]
    EmptyBackoffSchedule(&'static str),

    #[error("worker_cap must be at least 1")]
    ZeroWorkerCap,

    #[error("service.concurrency_limit must be at least 1")]
    ZeroConcurrencyLimit,

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Bad caller input, rejected before any remote call is made.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing or empty field '{0}' in request")]
    MissingField(&'static str),

    #[error("Field 'rounds' out of range: {0} (expected 0 or 1)")]
    RoundsOutOfRange(u32),

    #[error("Field 'direction' invalid: '{0}' (expected 'first-to-last' or 'last-to-first')")]
    InvalidDirection(String),

    #[error("Field 'worker_cap' must be at least 1")]
    ZeroWorkerCap,

    #[error("Field 'rounds' must be 0 when dispatch is parallel")]
    RoundsWithParallelDispatch,

    #[error("Field 'rounds' must be 0 when the budget guard switches to parallel dispatch")]
    RoundsWithParallelOverflow,

    #[error("Request document is not valid JSON: {0}")]
    MalformedRequest(String),
}

/// Non-success status or malformed body from the remote analysis service.
///
/// "Result not yet available" is NOT an error; it is modeled as `None` at
/// the call sites that allow it.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("{method} {url} returned status {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    #[error("Malformed body from {url}: {detail}")]
    MalformedBody { url: String, detail: String },

    #[error("Transport error calling {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Deadline exceeded while {operation}")]
    DeadlineExceeded { operation: String },
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to acquire semaphore: {0}")]
    Semaphore(#[from] tokio::sync::AcquireError),

    #[error("Worker task panicked: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create report directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Failed to write report: {0}")]
    WriteReport(std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
