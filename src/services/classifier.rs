//! Failure classifier: partition the failing set into repair groups.
//!
//! Builds a relation graph over failing ids and takes connected components.
//! An edge exists between two failures when there is positive evidence they
//! are entangled:
//!
//! 1. They reference the same shared fixture/resource identifier.
//! 2. They carry matching error signatures (same kind, same top frame),
//!    suggesting one root cause.
//! 3. Neither carries a finer signal and both sit in the same logical
//!    feature area (a conservative fallback to avoid false independence).
//!
//! Absent positive evidence, failures are NOT coupled: false independence
//! costs one wasted parallel attempt, false coupling costs serialization
//! latency on every attempt.
//!
//! Output is deterministic for a fixed failing set: components are ordered
//! by the first-seen position of their earliest member, units within a
//! coupled group by first-seen position.

use tracing::debug;

use crate::domain::models::{
    Attempt, CouplingSignal, FailingSet, FailureGroup, FailureUnit, PriorAttempt, TestOutcome,
};

// ---------------------------------------------------------------------------
// Union-find over failing-set indices
// ---------------------------------------------------------------------------

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Attach the later-seen root under the earlier one so component
            // roots stay stable across input of the same order.
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

// ---------------------------------------------------------------------------
// FailureClassifier
// ---------------------------------------------------------------------------

/// Partitions a failing set into independent and coupled groups.
#[derive(Debug, Default)]
pub struct FailureClassifier;

impl FailureClassifier {
    /// Create a classifier.
    pub fn new() -> Self {
        Self
    }

    /// Classify the failing set into an ordered list of failure groups.
    ///
    /// `history` supplies prior-attempt summaries folded into each unit's
    /// context bundle.
    pub fn classify(&self, failing: &FailingSet, history: &[Attempt]) -> Vec<FailureGroup> {
        let outcomes: Vec<&TestOutcome> = failing.iter().collect();
        let n = outcomes.len();

        let mut uf = UnionFind::new(n);
        let mut signals: Vec<Vec<CouplingSignal>> = vec![Vec::new(); n];

        for i in 0..n {
            for j in (i + 1)..n {
                if let Some(signal) = Self::relate(outcomes[i], outcomes[j]) {
                    uf.union(i, j);
                    // Record the evidence on the earlier member; merged when
                    // the component is assembled.
                    if !signals[i].contains(&signal) {
                        signals[i].push(signal);
                    }
                }
            }
        }

        // Assemble components keyed by root, in first-seen order.
        let mut component_order: Vec<usize> = Vec::new();
        let mut components: Vec<Vec<usize>> = Vec::new();
        for index in 0..n {
            let root = uf.find(index);
            match component_order.iter().position(|&r| r == root) {
                Some(pos) => components[pos].push(index),
                None => {
                    component_order.push(root);
                    components.push(vec![index]);
                }
            }
        }

        let groups: Vec<FailureGroup> = components
            .into_iter()
            .map(|members| {
                let units: Vec<FailureUnit> = members
                    .iter()
                    .map(|&index| Self::build_unit(outcomes[index], history))
                    .collect();

                if units.len() == 1 {
                    FailureGroup::independent(units.into_iter().next().expect("one unit"))
                } else {
                    let mut coupling: Vec<CouplingSignal> = Vec::new();
                    for &index in &members {
                        for signal in &signals[index] {
                            if !coupling.contains(signal) {
                                coupling.push(signal.clone());
                            }
                        }
                    }
                    FailureGroup::coupled(units, coupling)
                }
            })
            .collect();

        debug!(
            failing = n,
            groups = groups.len(),
            coupled = groups.iter().filter(|g| g.is_coupled()).count(),
            "classification complete"
        );

        groups
    }

    /// Positive evidence that two failures are entangled, if any.
    ///
    /// The feature-area fallback only applies when neither failure carries
    /// a finer signal (fixtures or a signature); once finer signals exist,
    /// their absence of a match means independence.
    fn relate(a: &TestOutcome, b: &TestOutcome) -> Option<CouplingSignal> {
        let da = a.diagnostic.as_ref()?;
        let db = b.diagnostic.as_ref()?;

        if let Some(shared) = da.fixtures.iter().find(|f| db.fixtures.contains(f)) {
            return Some(CouplingSignal::SharedFixture(shared.clone()));
        }

        match (&da.signature, &db.signature) {
            (Some(sa), Some(sb)) if sa == sb => {
                return Some(CouplingSignal::MatchingSignature(sa.kind.clone()));
            }
            _ => {}
        }

        let a_has_finer = !da.fixtures.is_empty() || da.signature.is_some();
        let b_has_finer = !db.fixtures.is_empty() || db.signature.is_some();
        if !a_has_finer && !b_has_finer {
            match (&da.feature_area, &db.feature_area) {
                (Some(fa), Some(fb)) if fa == fb => {
                    return Some(CouplingSignal::SharedFeatureArea(fa.clone()));
                }
                _ => {}
            }
        }

        None
    }

    /// Build a unit with its minimal context: diagnostics plus prior-attempt
    /// summaries for the same id.
    fn build_unit(outcome: &TestOutcome, history: &[Attempt]) -> FailureUnit {
        let prior_attempts: Vec<PriorAttempt> = history
            .iter()
            .flat_map(|attempt| {
                attempt
                    .results
                    .iter()
                    .filter(|r| r.test_ids.iter().any(|id| id == &outcome.id))
                    .map(|r| PriorAttempt {
                        attempt: attempt.number,
                        summary: r.summary(),
                        changed: r.changed(),
                    })
            })
            .collect();

        FailureUnit {
            test_id: outcome.id.clone(),
            diagnostic: outcome.diagnostic.clone().unwrap_or_default(),
            prior_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::plan::{DispatchPlan, FixReport, GroupOutcome, GroupResult};
    use crate::domain::models::{Diagnostic, ErrorSignature, GroupKind};

    fn fail_with(id: &str, diag: Diagnostic) -> TestOutcome {
        TestOutcome::fail(id, diag)
    }

    fn with_fixture(id: &str, fixture: &str) -> TestOutcome {
        fail_with(
            id,
            Diagnostic {
                message: "failed".to_string(),
                fixtures: vec![fixture.to_string()],
                ..Diagnostic::default()
            },
        )
    }

    fn with_signature(id: &str, kind: &str, frame: &str) -> TestOutcome {
        fail_with(
            id,
            Diagnostic {
                message: "failed".to_string(),
                signature: Some(ErrorSignature {
                    kind: kind.to_string(),
                    top_frame: frame.to_string(),
                }),
                ..Diagnostic::default()
            },
        )
    }

    fn with_area(id: &str, area: &str) -> TestOutcome {
        fail_with(
            id,
            Diagnostic {
                message: "failed".to_string(),
                feature_area: Some(area.to_string()),
                ..Diagnostic::default()
            },
        )
    }

    fn plain(id: &str) -> TestOutcome {
        fail_with(
            id,
            Diagnostic {
                message: "failed".to_string(),
                ..Diagnostic::default()
            },
        )
    }

    #[test]
    fn shared_fixture_couples() {
        let failing = FailingSet::from_failures(vec![
            with_fixture("a", "team-seed"),
            with_fixture("b", "team-seed"),
            plain("c"),
        ]);

        let groups = FailureClassifier::new().classify(&failing, &[]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].kind, GroupKind::Coupled);
        assert_eq!(groups[0].test_ids(), vec!["a", "b"]);
        assert_eq!(
            groups[0].coupling,
            vec![CouplingSignal::SharedFixture("team-seed".to_string())]
        );
        assert_eq!(groups[1].kind, GroupKind::Independent);
        assert_eq!(groups[1].test_ids(), vec!["c"]);
    }

    #[test]
    fn matching_signature_couples() {
        let failing = FailingSet::from_failures(vec![
            with_signature("a", "Panic", "core::index"),
            with_signature("b", "Panic", "core::index"),
        ]);

        let groups = FailureClassifier::new().classify(&failing, &[]);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].is_coupled());
        assert_eq!(
            groups[0].coupling,
            vec![CouplingSignal::MatchingSignature("Panic".to_string())]
        );
    }

    #[test]
    fn signature_kind_alone_does_not_couple() {
        // Same kind, different top frame: no shared root cause evidence.
        let failing = FailingSet::from_failures(vec![
            with_signature("a", "Panic", "core::index"),
            with_signature("b", "Panic", "io::read"),
        ]);

        let groups = FailureClassifier::new().classify(&failing, &[]);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| !g.is_coupled()));
    }

    #[test]
    fn feature_area_is_a_fallback_only() {
        // Both carry the same area, but one has a fixture: the finer signal
        // governs and they stay independent.
        let a = fail_with(
            "a",
            Diagnostic {
                message: "failed".to_string(),
                fixtures: vec!["db".to_string()],
                feature_area: Some("billing".to_string()),
                ..Diagnostic::default()
            },
        );
        let b = with_area("b", "billing");

        let failing = FailingSet::from_failures(vec![a, b]);
        let groups = FailureClassifier::new().classify(&failing, &[]);
        assert_eq!(groups.len(), 2);

        // Without finer signals on either side the fallback couples.
        let failing = FailingSet::from_failures(vec![
            with_area("x", "billing"),
            with_area("y", "billing"),
        ]);
        let groups = FailureClassifier::new().classify(&failing, &[]);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].is_coupled());
        assert_eq!(
            groups[0].coupling,
            vec![CouplingSignal::SharedFeatureArea("billing".to_string())]
        );
    }

    #[test]
    fn no_evidence_means_independent() {
        let failing =
            FailingSet::from_failures(vec![plain("a"), plain("b"), plain("c")]);

        let groups = FailureClassifier::new().classify(&failing, &[]);
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| !g.is_coupled()));
    }

    #[test]
    fn transitive_coupling_merges_components() {
        // a-b share a fixture, b-c share a signature: one coupled group.
        let a = fail_with(
            "a",
            Diagnostic {
                message: "failed".to_string(),
                fixtures: vec!["cache".to_string()],
                ..Diagnostic::default()
            },
        );
        let b = fail_with(
            "b",
            Diagnostic {
                message: "failed".to_string(),
                fixtures: vec!["cache".to_string()],
                signature: Some(ErrorSignature {
                    kind: "Timeout".to_string(),
                    top_frame: "net::poll".to_string(),
                }),
                ..Diagnostic::default()
            },
        );
        let c = with_signature("c", "Timeout", "net::poll");

        let failing = FailingSet::from_failures(vec![a, b, c]);
        let groups = FailureClassifier::new().classify(&failing, &[]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].test_ids(), vec!["a", "b", "c"]);
        assert_eq!(groups[0].coupling.len(), 2);
    }

    #[test]
    fn classification_is_deterministic() {
        let failing = FailingSet::from_failures(vec![
            with_fixture("a", "s1"),
            plain("b"),
            with_fixture("c", "s1"),
            with_area("d", "auth"),
            with_area("e", "auth"),
        ]);

        let classifier = FailureClassifier::new();
        let first = classifier.classify(&failing, &[]);
        let second = classifier.classify(&failing, &[]);
        assert_eq!(first, second);

        // Coupled components keep first-seen ordering of members.
        assert_eq!(first[0].test_ids(), vec!["a", "c"]);
        assert_eq!(first[1].test_ids(), vec!["b"]);
        assert_eq!(first[2].test_ids(), vec!["d", "e"]);
    }

    #[test]
    fn prior_attempt_summaries_are_folded_in() {
        let failing = FailingSet::from_failures(vec![plain("a")]);

        let mut attempt = Attempt::begin(
            1,
            failing.clone(),
            DispatchPlan::new(vec![], 4),
        );
        attempt = attempt.complete(
            vec![GroupResult {
                test_ids: vec!["a".to_string()],
                kind: GroupKind::Independent,
                outcome: GroupOutcome::Report(FixReport {
                    changed: true,
                    confidence: 0.4,
                    blocked: None,
                    summary: "renamed fixture".to_string(),
                }),
            }],
            failing.clone(),
        );

        let groups = FailureClassifier::new().classify(&failing, &[attempt]);
        let unit = &groups[0].units[0];
        assert_eq!(unit.prior_attempts.len(), 1);
        assert_eq!(unit.prior_attempts[0].attempt, 1);
        assert_eq!(unit.prior_attempts[0].summary, "renamed fixture");
        assert!(unit.prior_attempts[0].changed);
    }
}
