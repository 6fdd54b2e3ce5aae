//! Progress evaluator: decide what happens after an attempt.
//!
//! Compares the failing set before and after an attempt and produces the
//! next decision. Rule order matters:
//!
//! 1. Post set empty -> done.
//! 2. Attempt number at the retry budget -> stopped (retry limit).
//! 3. Post set identical to prior set -> bump the no-progress counter;
//!    at the threshold -> stopped (no progress), otherwise continue.
//! 4. Anything else (some ids fixed, possibly some regressions) -> reset
//!    the counter and continue.
//!
//! Regressions never trigger an early stop; they are recorded on the
//! attempt and feed the next classification pass as ordinary failures.

use tracing::{debug, info};

use crate::domain::models::{Decision, FailingSet, StopReason};

/// Evaluates attempt-over-attempt progress.
#[derive(Debug, Clone, Copy)]
pub struct ProgressEvaluator {
    retry_budget: u32,
    no_progress_threshold: u32,
}

impl ProgressEvaluator {
    /// Create an evaluator with the configured retry budget and no-progress
    /// threshold (both >= 1).
    pub fn new(retry_budget: u32, no_progress_threshold: u32) -> Self {
        Self {
            retry_budget,
            no_progress_threshold: no_progress_threshold.max(1),
        }
    }

    /// Evaluate one completed attempt.
    ///
    /// `no_progress_count` is the session's counter before this attempt;
    /// the returned counter replaces it. The counter is pure input/output
    /// here so the session stays the orchestrator's to mutate.
    pub fn evaluate(
        &self,
        prior: &FailingSet,
        post: &FailingSet,
        attempt_number: u32,
        no_progress_count: u32,
    ) -> (Decision, u32) {
        if post.is_empty() {
            info!(attempt = attempt_number, "suite passes");
            return (Decision::Done, 0);
        }

        if attempt_number >= self.retry_budget {
            info!(
                attempt = attempt_number,
                budget = self.retry_budget,
                "retry budget exhausted"
            );
            return (Decision::Stopped(StopReason::RetryLimit), no_progress_count);
        }

        if post.set_eq(prior) {
            let count = no_progress_count + 1;
            if count >= self.no_progress_threshold {
                info!(
                    attempt = attempt_number,
                    consecutive = count,
                    "no measurable progress"
                );
                return (Decision::Stopped(StopReason::NoProgress), count);
            }
            debug!(
                attempt = attempt_number,
                consecutive = count,
                "no progress this attempt; grace remaining"
            );
            return (Decision::Continue, count);
        }

        // Some ids fixed (or at least the set changed). Regressions ride
        // along into the next classification pass.
        debug!(
            attempt = attempt_number,
            fixed = post.fixed_since(prior).len(),
            regressions = post.broken_since(prior).len(),
            "progress made"
        );
        (Decision::Continue, 0)
    }
}
