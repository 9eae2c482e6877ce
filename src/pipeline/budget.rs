//! Wall-clock budget planning.
//!
//! Some execution environments impose a hard ceiling on request duration.
//! Given that ceiling and an empirically observed per-sentence cost, the
//! guard decides before any remote call whether sequential processing can
//! finish in time, and if not, applies the caller-chosen overflow mode:
//! shrink the sentence set to the prefix that fits, or switch to parallel
//! dispatch and trade context fidelity for throughput.

use crate::config::OverflowMode;
use crate::pipeline::RoundReport;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetPlan {
    /// Sequential dispatch; `truncate_to` caps the sentence set when set.
    Sequential { truncate_to: Option<usize> },
    /// Parallel dispatch over the full sentence set.
    Parallel,
}

/// Surfaced to the caller whenever sentences were dropped to fit the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TruncationNotice {
    pub kept: usize,
    pub dropped: usize,
}

/// Decide the dispatch plan for `sentence_count` sentences. No ceiling
/// means no constraint; the choice between truncating and going parallel
/// is the caller's, not a heuristic.
pub fn plan(
    sentence_count: usize,
    ceiling: Option<Duration>,
    sentence_cost: Duration,
    overflow: OverflowMode,
) -> BudgetPlan {
    let Some(ceiling) = ceiling else {
        return BudgetPlan::Sequential { truncate_to: None };
    };

    let projected = sentence_cost.saturating_mul(sentence_count as u32);
    if projected <= ceiling {
        return BudgetPlan::Sequential { truncate_to: None };
    }

    match overflow {
        OverflowMode::Truncate => {
            let fits = if sentence_cost.is_zero() {
                sentence_count
            } else {
                (ceiling.as_millis() / sentence_cost.as_millis()) as usize
            };
            BudgetPlan::Sequential {
                truncate_to: Some(fits.min(sentence_count)),
            }
        }
        OverflowMode::Parallel => BudgetPlan::Parallel,
    }
}

/// After a truncated run, append the unprocessed tail sentences to every
/// round's paragraph snapshot so the final paragraph stays complete. The
/// snapshot may be empty when the budget kept zero sentences.
pub fn reattach_tail(reports: &mut [RoundReport], tail: &str) {
    if tail.is_empty() {
        return;
    }
    for report in reports {
        report.paragraph = if report.paragraph.is_empty() {
            tail.to_string()
        } else {
            format!("{} {}", report.paragraph, tail)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COST: Duration = Duration::from_secs(25);

    #[test]
    fn no_ceiling_means_unconstrained_sequential() {
        assert_eq!(
            plan(100, None, COST, OverflowMode::Truncate),
            BudgetPlan::Sequential { truncate_to: None }
        );
    }

    #[test]
    fn fitting_workload_runs_sequential_untruncated() {
        // 4 * 25s = 100s within a 120s ceiling.
        assert_eq!(
            plan(4, Some(Duration::from_secs(120)), COST, OverflowMode::Truncate),
            BudgetPlan::Sequential { truncate_to: None }
        );
    }

    #[test]
    fn overflow_truncates_to_the_fitting_prefix() {
        // 10 * 25s = 250s against a 120s ceiling: 4 sentences fit.
        assert_eq!(
            plan(10, Some(Duration::from_secs(120)), COST, OverflowMode::Truncate),
            BudgetPlan::Sequential {
                truncate_to: Some(4)
            }
        );
    }

    #[test]
    fn overflow_can_switch_to_parallel_instead() {
        assert_eq!(
            plan(10, Some(Duration::from_secs(120)), COST, OverflowMode::Parallel),
            BudgetPlan::Parallel
        );
    }

    #[test]
    fn ceiling_below_one_sentence_truncates_to_zero() {
        assert_eq!(
            plan(3, Some(Duration::from_secs(10)), COST, OverflowMode::Truncate),
            BudgetPlan::Sequential {
                truncate_to: Some(0)
            }
        );
    }

    #[test]
    fn exact_fit_is_not_an_overflow() {
        // 4 * 25s = 100s exactly.
        assert_eq!(
            plan(4, Some(Duration::from_secs(100)), COST, OverflowMode::Parallel),
            BudgetPlan::Sequential { truncate_to: None }
        );
    }

    fn snapshot(paragraph: &str) -> RoundReport {
        RoundReport {
            round: 0,
            outcomes: Vec::new(),
            paragraph: paragraph.to_string(),
        }
    }

    #[test]
    fn reattach_appends_tail_to_every_snapshot() {
        let mut reports = vec![snapshot("First revised."), snapshot("First again.")];
        reattach_tail(&mut reports, "Second one. Third one.");
        assert_eq!(reports[0].paragraph, "First revised. Second one. Third one.");
        assert_eq!(reports[1].paragraph, "First again. Second one. Third one.");
    }

    #[test]
    fn reattach_to_empty_snapshot_yields_tail_alone() {
        // Nothing fit the budget; the whole paragraph became tail.
        let mut reports = vec![snapshot("")];
        reattach_tail(&mut reports, "First one. Second one.");
        assert_eq!(reports[0].paragraph, "First one. Second one.");
    }

    #[test]
    fn empty_tail_leaves_snapshots_untouched() {
        let mut reports = vec![snapshot("Whole paragraph fit.")];
        reattach_tail(&mut reports, "");
        assert_eq!(reports[0].paragraph, "Whole paragraph fit.");
    }
}
