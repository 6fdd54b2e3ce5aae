//! Dispatch plans, work assignments, and fix reports.
//!
//! The classifier's groups are partitioned into a [`DispatchPlan`]: a
//! parallel pool of independent groups and a strictly sequential lane of
//! coupled groups. A dry run returns the plan without executing it. Each
//! dispatched group becomes a [`WorkAssignment`], the opaque context bundle
//! handed to a worker, which answers with a [`FixReport`].

use serde::{Deserialize, Serialize};

use super::failure::{FailureGroup, GroupKind};

/// The dispatch plan for one attempt.
///
/// Independent groups run under the bounded parallel pool; coupled groups
/// run one at a time after all pool work completes. The cap is recorded at
/// planning time so a persisted attempt documents exactly how it ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchPlan {
    /// Maximum number of pool workers running at once.
    pub concurrency_cap: usize,

    /// Independent groups, in first-seen order (FIFO pool admission).
    pub pool: Vec<FailureGroup>,

    /// Coupled groups, executed strictly in this order.
    pub lane: Vec<FailureGroup>,
}

impl DispatchPlan {
    /// Partition classified groups into the pool and the sequential lane,
    /// preserving the classifier's ordering within each.
    pub fn new(groups: Vec<FailureGroup>, concurrency_cap: usize) -> Self {
        let (lane, pool): (Vec<_>, Vec<_>) =
            groups.into_iter().partition(|g| g.kind == GroupKind::Coupled);
        Self {
            concurrency_cap,
            pool,
            lane,
        }
    }

    /// Total number of groups in the plan.
    pub fn group_count(&self) -> usize {
        self.pool.len() + self.lane.len()
    }

    /// Total number of failing tests covered by the plan.
    pub fn test_count(&self) -> usize {
        self.pool
            .iter()
            .chain(self.lane.iter())
            .map(|g| g.units.len())
            .sum()
    }

    /// True when there is nothing to dispatch.
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty() && self.lane.is_empty()
    }
}

/// The context bundle handed to one worker invocation.
///
/// Workers are stateless: every invocation gets a fresh assignment and
/// nothing else. Context never crosses group boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkAssignment {
    /// Attempt this assignment belongs to.
    pub attempt: u32,

    /// The group to repair.
    pub group: FailureGroup,
}

/// What a worker reports back after a repair attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixReport {
    /// Whether the worker applied any change.
    pub changed: bool,

    /// Worker's confidence in the fix, 0.0..=1.0.
    pub confidence: f64,

    /// Set when the failure cannot be automated (e.g. depends on an
    /// external side channel the worker cannot control).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<String>,

    /// Short description of what was changed.
    pub summary: String,
}

/// Outcome of dispatching one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum GroupOutcome {
    /// The worker returned a fix report.
    Report(FixReport),
    /// The worker could not produce any usable change. The unit stays
    /// failing and is reclassified next attempt.
    Failed {
        /// Why the worker failed.
        reason: String,
    },
}

/// Per-group dispatch record for one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupResult {
    /// Test ids the group covered.
    pub test_ids: Vec<String>,

    /// Independent or coupled.
    pub kind: GroupKind,

    /// What happened.
    pub outcome: GroupOutcome,
}

impl GroupResult {
    /// Summary line for prior-attempt context bundles.
    pub fn summary(&self) -> String {
        match &self.outcome {
            GroupOutcome::Report(report) => report.summary.clone(),
            GroupOutcome::Failed { reason } => format!("worker failed: {reason}"),
        }
    }

    /// Whether the worker applied any change.
    pub fn changed(&self) -> bool {
        matches!(&self.outcome, GroupOutcome::Report(r) if r.changed)
    }
}
