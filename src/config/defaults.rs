use std::path::PathBuf;

use super::types::RetryConfig;

pub fn default_version() -> u32 {
    1
}

pub fn default_base_url() -> String {
    "https://finchat-api.adgo.dev".to_string()
}

pub fn default_session_url_template() -> String {
    "https://finchat.adgo.dev/?session_id={id}".to_string()
}

pub fn default_client_id() -> String {
    "parsec-backtesting".to_string()
}

pub fn default_data_source() -> String {
    "alpha_vantage".to_string()
}

pub fn default_directive() -> String {
    "cot write-aid-1".to_string()
}

pub fn default_request_timeout_sec() -> u64 {
    60
}

pub fn default_concurrency_limit() -> usize {
    8
}

pub fn default_poll_backoff_ms() -> Vec<u64> {
    // Remote jobs rarely finish inside the first few seconds; start long,
    // shorten toward a floor held until idle.
    vec![8000, 5000, 3000, 2000, 1000]
}

pub fn default_poll_log_every() -> u32 {
    5
}

pub fn default_handle_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 5,
        backoff_ms: vec![15000, 10000, 5000],
    }
}

pub fn default_result_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        backoff_ms: vec![5000, 3000],
    }
}

pub fn default_worker_cap() -> usize {
    3
}

pub fn default_launch_delay_ms() -> u64 {
    500
}

pub fn default_deadline_sec() -> u64 {
    600
}

pub fn default_persona() -> String {
    "EB White".to_string()
}

pub fn default_sentence_cost_sec() -> u64 {
    25
}

pub fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}
