//! Attempt records.
//!
//! One attempt is a full discover -> classify -> dispatch -> verify cycle.
//! Attempts are append-only history on the session: never rewritten, only
//! appended once complete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::outcome::FailingSet;
use super::plan::{DispatchPlan, GroupResult};

/// Record of one completed (or, transiently, in-progress) attempt.
///
/// `completed_at` is `None` only while the attempt is mid-flight; a resume
/// discards such records and re-derives the failing set from a fresh
/// discovery rather than trusting persisted state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    /// 1-based attempt number, contiguous within a session.
    pub number: u32,

    /// When the attempt started.
    pub started_at: DateTime<Utc>,

    /// Failing set observed at attempt start.
    pub before: FailingSet,

    /// The dispatch plan that was executed.
    pub plan: DispatchPlan,

    /// Per-group dispatch results.
    pub results: Vec<GroupResult>,

    /// Failing set observed after post-dispatch verification.
    pub after: FailingSet,

    /// Ids fixed by this attempt.
    pub fixed: Vec<String>,

    /// Ids newly broken by this attempt (regressions).
    pub broken: Vec<String>,

    /// Ids failing both before and after.
    pub unchanged: Vec<String>,

    /// When verification and the decision completed; `None` while in flight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Attempt {
    /// Start a new attempt record from the observed failing set and plan.
    pub fn begin(number: u32, before: FailingSet, plan: DispatchPlan) -> Self {
        Self {
            number,
            started_at: Utc::now(),
            before,
            plan,
            results: Vec::new(),
            after: FailingSet::default(),
            fixed: Vec::new(),
            broken: Vec::new(),
            unchanged: Vec::new(),
            completed_at: None,
        }
    }

    /// Complete the attempt with dispatch results and the verified set,
    /// deriving the deltas.
    pub fn complete(mut self, results: Vec<GroupResult>, after: FailingSet) -> Self {
        self.fixed = after.fixed_since(&self.before);
        self.broken = after.broken_since(&self.before);
        self.unchanged = after.unchanged_since(&self.before);
        self.results = results;
        self.after = after;
        self.completed_at = Some(Utc::now());
        self
    }

    /// True once verification and the decision have run.
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }
}
