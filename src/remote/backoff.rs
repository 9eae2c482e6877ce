//! Schedule-indexed backoff.
//!
//! Remote job completion time is highly variable. A predetermined ordered
//! sequence of waits, long first and shortening toward a floor, minimizes
//! latency without hammering the service while it is known to be far from
//! done. Once the schedule is exhausted, every further attempt uses the
//! final (shortest) value indefinitely.

use std::time::Duration;

/// Wait before attempt `k` (1-indexed): `schedule_ms[min(k - 1, last)]`.
///
/// An empty schedule yields zero; config validation rejects it up front.
pub fn delay_for_attempt(schedule_ms: &[u64], attempt: u32) -> Duration {
    let Some(last) = schedule_ms.last() else {
        return Duration::ZERO;
    };
    let idx = (attempt.saturating_sub(1)) as usize;
    let ms = schedule_ms.get(idx).copied().unwrap_or(*last);
    Duration::from_millis(ms)
}
