//! Test outcome models.
//!
//! A suite run produces one [`TestOutcome`] per test. Outcomes are produced
//! fresh on every discovery pass and never mutated, only superseded by the
//! next run. The [`FailingSet`] is an immutable snapshot of the failing
//! outcomes at one point in time, compared across attempts by test identity
//! rather than report order.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Status of a single test in a suite run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Test passed.
    Pass,
    /// Test failed.
    Fail,
    /// Test was skipped by the runner.
    Skipped,
}

/// Error signature extracted from a failure's diagnostics.
///
/// Two failures with the same exception kind and the same top stack frame are
/// suspected to share a root cause and are coupled by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSignature {
    /// Exception or panic kind (e.g. `AssertionError`, `panicked at`).
    pub kind: String,
    /// Topmost application stack frame of the failure.
    pub top_frame: String,
}

/// Diagnostic payload attached to a failing test outcome.
///
/// Everything here is optional besides the message: the runner reports what
/// it can, and the classifier works with whichever signals are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Human-readable failure message.
    pub message: String,

    /// Source location of the failure (`file:line`), if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Error signature for root-cause matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<ErrorSignature>,

    /// Shared fixture or resource identifiers this test touches.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixtures: Vec<String>,

    /// Logical feature area the test belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_area: Option<String>,
}

/// Outcome of a single test in one suite run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    /// Stable test identity, unique within the suite.
    pub id: String,

    /// Pass/fail/skipped status.
    pub status: TestStatus,

    /// Diagnostic payload; present for failures, usually absent otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
}

impl TestOutcome {
    /// Create a passing outcome.
    pub fn pass(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: TestStatus::Pass,
            diagnostic: None,
        }
    }

    /// Create a failing outcome with a diagnostic payload.
    pub fn fail(id: impl Into<String>, diagnostic: Diagnostic) -> Self {
        Self {
            id: id.into(),
            status: TestStatus::Fail,
            diagnostic: Some(diagnostic),
        }
    }

    /// Create a skipped outcome.
    pub fn skipped(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: TestStatus::Skipped,
            diagnostic: None,
        }
    }

    /// True if this outcome is a failure.
    pub fn is_failure(&self) -> bool {
        self.status == TestStatus::Fail
    }
}

/// Immutable snapshot of the failing outcomes at one point in time.
///
/// Preserves first-seen report order (the classifier uses it for
/// deterministic group ordering) but compares across attempts by identity
/// only. Duplicate ids in a report keep the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailingSet {
    outcomes: Vec<TestOutcome>,
}

impl FailingSet {
    /// Build a failing set from a full outcome list, keeping only failures.
    ///
    /// Report order is preserved; a duplicated id keeps its first occurrence,
    /// so two discovery passes over the same report are identical.
    pub fn from_outcomes(outcomes: &[TestOutcome]) -> Self {
        let mut seen = BTreeSet::new();
        let failing = outcomes
            .iter()
            .filter(|o| o.is_failure() && seen.insert(o.id.as_str()))
            .cloned()
            .collect();
        Self { outcomes: failing }
    }

    /// Build a failing set directly from failing outcomes. Non-failures and
    /// duplicate ids are dropped.
    pub fn from_failures(outcomes: Vec<TestOutcome>) -> Self {
        Self::from_outcomes(&outcomes)
    }

    /// Number of failing tests.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// True when no tests are failing.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Iterate over failing outcomes in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &TestOutcome> {
        self.outcomes.iter()
    }

    /// Failing test ids in first-seen order.
    pub fn ids(&self) -> Vec<&str> {
        self.outcomes.iter().map(|o| o.id.as_str()).collect()
    }

    /// Failing test ids as an identity set.
    pub fn id_set(&self) -> BTreeSet<&str> {
        self.outcomes.iter().map(|o| o.id.as_str()).collect()
    }

    /// Look up a failing outcome by id.
    pub fn get(&self, id: &str) -> Option<&TestOutcome> {
        self.outcomes.iter().find(|o| o.id == id)
    }

    /// True if the given test id is failing.
    pub fn contains(&self, id: &str) -> bool {
        self.outcomes.iter().any(|o| o.id == id)
    }

    /// Identity equality: same failing ids, regardless of order.
    pub fn set_eq(&self, other: &Self) -> bool {
        self.id_set() == other.id_set()
    }

    /// Ids failing in `prior` but no longer failing here.
    pub fn fixed_since(&self, prior: &Self) -> Vec<String> {
        prior
            .outcomes
            .iter()
            .filter(|o| !self.contains(&o.id))
            .map(|o| o.id.clone())
            .collect()
    }

    /// Ids failing here that were not failing in `prior` (regressions).
    pub fn broken_since(&self, prior: &Self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| !prior.contains(&o.id))
            .map(|o| o.id.clone())
            .collect()
    }

    /// Ids failing both here and in `prior`.
    pub fn unchanged_since(&self, prior: &Self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| prior.contains(&o.id))
            .map(|o| o.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(msg: &str) -> Diagnostic {
        Diagnostic {
            message: msg.to_string(),
            ..Diagnostic::default()
        }
    }

    #[test]
    fn from_outcomes_keeps_failures_only() {
        let outcomes = vec![
            TestOutcome::pass("a"),
            TestOutcome::fail("b", diag("boom")),
            TestOutcome::skipped("c"),
            TestOutcome::fail("d", diag("bang")),
        ];

        let failing = FailingSet::from_outcomes(&outcomes);
        assert_eq!(failing.ids(), vec!["b", "d"]);
        assert_eq!(failing.len(), 2);
        assert!(!failing.is_empty());
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let outcomes = vec![
            TestOutcome::fail("x", diag("first")),
            TestOutcome::fail("x", diag("second")),
        ];

        let failing = FailingSet::from_outcomes(&outcomes);
        assert_eq!(failing.len(), 1);
        assert_eq!(
            failing.get("x").unwrap().diagnostic.as_ref().unwrap().message,
            "first"
        );
    }

    #[test]
    fn set_eq_ignores_order() {
        let a = FailingSet::from_failures(vec![
            TestOutcome::fail("one", diag("m")),
            TestOutcome::fail("two", diag("m")),
        ]);
        let b = FailingSet::from_failures(vec![
            TestOutcome::fail("two", diag("other")),
            TestOutcome::fail("one", diag("other")),
        ]);

        assert!(a.set_eq(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn deltas_between_snapshots() {
        let prior = FailingSet::from_failures(vec![
            TestOutcome::fail("a", diag("m")),
            TestOutcome::fail("b", diag("m")),
        ]);
        let post = FailingSet::from_failures(vec![
            TestOutcome::fail("b", diag("m")),
            TestOutcome::fail("c", diag("m")),
        ]);

        assert_eq!(post.fixed_since(&prior), vec!["a"]);
        assert_eq!(post.broken_since(&prior), vec!["c"]);
        assert_eq!(post.unchanged_since(&prior), vec!["b"]);
    }

    #[test]
    fn empty_set_deltas() {
        let prior = FailingSet::from_failures(vec![TestOutcome::fail("a", diag("m"))]);
        let post = FailingSet::default();

        assert_eq!(post.fixed_since(&prior), vec!["a"]);
        assert!(post.broken_since(&prior).is_empty());
        assert!(post.is_empty());
    }

    #[test]
    fn outcome_serialization_roundtrip() {
        let outcome = TestOutcome::fail(
            "suite::case",
            Diagnostic {
                message: "assertion failed".to_string(),
                location: Some("src/lib.rs:42".to_string()),
                signature: Some(ErrorSignature {
                    kind: "AssertionError".to_string(),
                    top_frame: "suite::helper".to_string(),
                }),
                fixtures: vec!["team-seed".to_string()],
                feature_area: Some("teams".to_string()),
            },
        );

        let json = serde_json::to_string(&outcome).unwrap();
        let back: TestOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(outcome, back);
    }
}
