//! Failure units and groups produced by classification.
//!
//! A [`FailureUnit`] carries the minimal context a worker needs to attempt a
//! fix for one test: its diagnostics plus summaries of prior attempts on the
//! same id. Units are partitioned into [`FailureGroup`]s: independent groups
//! hold exactly one unit and may be repaired in parallel; coupled groups hold
//! an ordered set of units that must be repaired together.

use serde::{Deserialize, Serialize};

use super::outcome::Diagnostic;

/// Summary of one prior repair attempt on a test id.
///
/// Deliberately a summary, not a transcript: prior attempts feed the next
/// worker's context bundle, which must stay bounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorAttempt {
    /// Attempt number in which the repair was tried.
    pub attempt: u32,
    /// What the worker reported it did.
    pub summary: String,
    /// Whether the worker produced any change.
    pub changed: bool,
}

/// One failing test plus the minimal context needed to attempt a fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureUnit {
    /// Stable test identity.
    pub test_id: String,

    /// Diagnostic payload from the most recent discovery.
    pub diagnostic: Diagnostic,

    /// Summaries of prior repair attempts on this id, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prior_attempts: Vec<PriorAttempt>,
}

/// Whether a group may be repaired in parallel with others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// Single failure, safe to repair in isolation.
    Independent,
    /// Failures that must be repaired together, serialized against all
    /// other coupled groups.
    Coupled,
}

/// Positive evidence that coupled two failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "signal", content = "value")]
pub enum CouplingSignal {
    /// Both failures reference the same fixture/resource identifier.
    SharedFixture(String),
    /// Both failures carry the same error signature kind.
    MatchingSignature(String),
    /// Neither failure had a finer signal; both sit in the same feature area.
    SharedFeatureArea(String),
}

/// A scheduling unit: one independent failure or an ordered coupled set.
///
/// Coupling is a relation, not ownership. Grouping only changes how repairs
/// are scheduled; the underlying tests are unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureGroup {
    /// Independent or coupled.
    pub kind: GroupKind,

    /// Units in first-seen order. Exactly one for independent groups.
    pub units: Vec<FailureUnit>,

    /// The signals that coupled these units; empty for independent groups.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coupling: Vec<CouplingSignal>,
}

impl FailureGroup {
    /// Create an independent group from a single unit.
    pub fn independent(unit: FailureUnit) -> Self {
        Self {
            kind: GroupKind::Independent,
            units: vec![unit],
            coupling: Vec::new(),
        }
    }

    /// Create a coupled group from an ordered set of units.
    pub fn coupled(units: Vec<FailureUnit>, coupling: Vec<CouplingSignal>) -> Self {
        Self {
            kind: GroupKind::Coupled,
            units,
            coupling,
        }
    }

    /// Test ids in this group, in order.
    pub fn test_ids(&self) -> Vec<&str> {
        self.units.iter().map(|u| u.test_id.as_str()).collect()
    }

    /// True for coupled groups.
    pub fn is_coupled(&self) -> bool {
        self.kind == GroupKind::Coupled
    }
}
